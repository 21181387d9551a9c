//! Warmind command-line tool
//!
//! Loads the Destiny 2 manifest and resolves definitions against it.
//!
//! Usage:
//!   warmind --api-key KEY lookup stat 1480404414
//!   warmind search item "ace of spades"
//!   warmind analyze item.json
//!
//! The API key may also come from `BUNGIE_API_KEY`. Log output honors
//! `RUST_LOG` when it is set.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::FmtSubscriber;
use warmind_cli::{Args, log_filter, run};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let directives = std::env::var("RUST_LOG").ok();
    FmtSubscriber::builder()
        .with_env_filter(log_filter(directives.as_deref(), args.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let output = run(&args).await?;
    println!("{output}");
    Ok(())
}
