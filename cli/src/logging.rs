//! Logging setup.

use std::io;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `level`. Without either, plain mode logs
/// at `info` and the TUI logs nothing, since the terminal belongs to the grid.
pub fn init(level: Option<&str>, interactive: bool) -> anyhow::Result<()> {
    let fallback = level.unwrap_or(if interactive { "off" } else { "info" });
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;

    let console_layer = fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_target(false);

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .try_init()?;
    Ok(())
}
