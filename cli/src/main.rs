//! `timeable` - walks through every timeable operation and prints the outcomes.
//!
//! ```text
//! timeable [CONCURRENCY]
//! ```
//!
//! `CONCURRENCY` is read loosely (`2`, `"3.7"`, `0x4`); anything below 1
//! leaves the batch runners unchunked. Without it the `[batch]` section of
//! the config file decides. Logs go to stderr, filtered by `RUST_LOG`.

mod walkthrough;

use std::env;
use std::io::{self, Write};

use anyhow::Result;
use timeable_config::TimeableConfig;
use timeable_utils::concurrency_from;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::walkthrough::Settings;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // Stdout carries the walkthrough output.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = match TimeableConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %err.path().display(), "Ignoring unusable config");
            None
        }
    };
    let mut settings = Settings::from_config(config.as_ref());
    if let Some(arg) = env::args().nth(1) {
        settings.concurrency = concurrency_from(arg.as_str());
    }
    tracing::debug!(concurrency = settings.concurrency, "Starting walkthrough");

    let mut stdout = io::stdout().lock();
    walkthrough::run(&mut stdout, &settings).await?;
    stdout.flush()?;
    Ok(())
}
