//! Check command - probe every port once.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use portwatch_core::{Config, PortStatus, ProbePort, TcpProbe};
use serde::Serialize;
use tokio::task::JoinSet;

#[derive(Debug, Serialize)]
struct CheckResult {
    port: u16,
    status: PortStatus,
    detail: String,
}

pub async fn run(config: Config, json: bool) -> Result<ExitCode> {
    let probe = Arc::new(TcpProbe::new(config.watch_settings().connect_timeout));
    let host: Arc<str> = Arc::from(config.host.as_str());

    let mut set = JoinSet::new();
    for (index, &port) in config.ports.iter().enumerate() {
        let probe = Arc::clone(&probe);
        let host = Arc::clone(&host);
        set.spawn(async move { (index, port, probe.attempt(&host, port).await) });
    }

    let mut results = Vec::with_capacity(config.ports.len());
    while let Some(joined) = set.join_next().await {
        let (index, port, outcome) = joined?;
        results.push((
            index,
            CheckResult {
                port,
                status: outcome.status(),
                detail: outcome.to_string(),
            },
        ));
    }
    results.sort_by_key(|(index, _)| *index);
    let results: Vec<CheckResult> = results.into_iter().map(|(_, r)| r).collect();

    let all_reachable = results.iter().all(|r| r.status == PortStatus::Reachable);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!("{:<6} {:<12} DETAIL", "PORT", "STATUS");
        println!("{}", "-".repeat(40));
        for r in &results {
            println!("{:<6} {:<12} {}", r.port, r.status.display_name(), r.detail);
        }
        let up = results
            .iter()
            .filter(|r| r.status == PortStatus::Reachable)
            .count();
        println!("\n{}/{} ports reachable on {}", up, results.len(), config.host);
    }

    Ok(if all_reachable {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
