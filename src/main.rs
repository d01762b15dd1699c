use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vexa_transcripts::{
    cli::{handle_config_command, handle_reconcile_command, Cli, CliCommand},
    config::Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let log_level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        CliCommand::Version => {
            println!("vexa-transcripts {}", env!("CARGO_PKG_VERSION"));
        }
        CliCommand::Config(args) => handle_config_command(args, &config)?,
        CliCommand::Reconcile(args) => handle_reconcile_command(args, &config).await?,
    }

    Ok(())
}
