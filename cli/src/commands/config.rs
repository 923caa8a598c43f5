//! Config command - inspect and edit the watch list.

use anyhow::Result;
use portwatch_core::ConfigStore;

pub async fn show(store: &ConfigStore, json: bool) -> Result<()> {
    let config = store.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("Config file:     {}", store.path().display());
    println!("Host:            {}", config.host);
    if config.ports.is_empty() {
        println!("Ports:           (none)");
    } else {
        let ports: Vec<String> = config.ports.iter().map(u16::to_string).collect();
        println!("Ports:           {}", ports.join(", "));
    }
    println!("Connect timeout: {} ms", config.connect_timeout_ms);
    println!("Retry interval:  {} ms", config.retry_interval_ms);
    println!("Cooldown:        {} ms", config.cooldown_ms);
    println!("Settle delay:    {} ms", config.settle_ms);
    println!("Exit delay:      {} ms", config.exit_delay_ms);
    Ok(())
}

pub async fn add(store: &ConfigStore, port: u16) -> Result<()> {
    store.add_port(port).await?;
    println!("Watching port {}", port);
    Ok(())
}

pub async fn remove(store: &ConfigStore, port: u16) -> Result<()> {
    store.remove_port(port).await?;
    println!("Stopped watching port {}", port);
    Ok(())
}
