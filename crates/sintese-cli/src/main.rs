//! Sintese - factual synthesis of Brazilian court case folders.

use clap::Parser;
use sintese_cli::{commands, Cli, Command, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> sintese_cli::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|_| {
        let cfg = Config::default();
        cfg.save().ok();
        cfg
    });

    match cli.command {
        Command::Run(args) => commands::execute_run(args, &config).await?,
        Command::Config(args) => commands::execute_config(args, &mut config)?,
    }

    Ok(())
}
