pub mod args;
pub mod reconcile;

pub use args::{Cli, CliCommand, ConfigCliArgs, ConfigCommand, ReconcileCliArgs};
pub use reconcile::handle_reconcile_command;

use crate::config::Config;
use anyhow::Result;

pub fn handle_config_command(args: ConfigCliArgs, config: &Config) -> Result<()> {
    match args.command {
        ConfigCommand::Show => print!("{}", config.to_toml()?),
        ConfigCommand::Path => println!("{}", Config::config_path()?.display()),
    }
    Ok(())
}
