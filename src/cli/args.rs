use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vexa-transcripts")]
#[command(about = "Reconcile meeting transcript segments", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Merge a snapshot and live messages into one ordered transcript
    Reconcile(ReconcileCliArgs),
    /// Inspect the configuration
    Config(ConfigCliArgs),
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct ReconcileCliArgs {
    /// Snapshot JSON file, or a directory of <platform>/<meeting id>.json files
    #[arg(short, long)]
    pub snapshot: PathBuf,
    /// Live messages, one JSON message per line
    #[arg(short, long)]
    pub live: Option<PathBuf>,
    /// Meeting platform (e.g. google_meet, teams)
    #[arg(long)]
    pub platform: Option<String>,
    /// Native meeting id on the platform
    #[arg(long)]
    pub meeting_id: Option<String>,
    /// Write resolved segments here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct ConfigCliArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reconcile() {
        let cli = Cli::parse_from([
            "vexa-transcripts",
            "reconcile",
            "--snapshot",
            "snap.json",
            "--live",
            "live.jsonl",
            "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            CliCommand::Reconcile(args) => {
                assert_eq!(args.snapshot, PathBuf::from("snap.json"));
                assert_eq!(args.live, Some(PathBuf::from("live.jsonl")));
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::parse_from(["vexa-transcripts", "--config", "/tmp/c.toml", "config", "show"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(
            cli.command,
            CliCommand::Config(ConfigCliArgs {
                command: ConfigCommand::Show
            })
        ));
    }
}
