use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::eyre;
use commands::{config, sync};
use labelarr_config::{PathManager, SyncDirection};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "labelarr")]
#[command(about = "Labelarr - Keep Plex labels and Radarr/Sonarr tags in sync")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Path to config.toml (defaults to the platform config directory, or /config in Docker)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to a daily rotating file instead of stderr.
    /// Without a value the default log directory is used.
    #[arg(long, global = true, value_name = "PATH", num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DirectionArg {
    /// Radarr/Sonarr tags become Plex labels
    ToMediaServer,
    /// Plex labels become Radarr/Sonarr tags
    FromMediaServer,
}

impl From<DirectionArg> for SyncDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::ToMediaServer => SyncDirection::ToMediaServer,
            DirectionArg::FromMediaServer => SyncDirection::FromMediaServer,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run one label sync pass
    #[command(long_about = "Synchronize the configured labels between Plex and every Radarr/Sonarr instance selected under [sync]. Command-line flags override the config file for this run only.")]
    Sync {
        /// Preview decisions without changing labels or tags
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,

        /// Sync direction (overrides sync.direction)
        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,

        /// Label to sync; repeat for several (replaces sync.labels)
        #[arg(long = "label", value_name = "LABEL")]
        labels: Vec<String>,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    #[command(long_about = "Display the current configuration. Plex tokens and API keys are masked. Use --full to show them.")]
    Show {
        /// Show secrets unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a template config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .map(|path| path.unwrap_or_else(|| PathManager::default().log_file()));
    logging::init_logging(cli.verbose, cli.quiet, log_file.as_deref()).map_err(|e| eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Sync {
            dry_run,
            direction,
            labels,
        } => {
            let overrides = sync::SyncOverrides {
                dry_run,
                direction: direction.map(SyncDirection::from),
                labels,
            };
            sync::run_sync(overrides, config_path, &output).await
        }
        Commands::Config { cmd } => config::run_config(cmd, config_path, &output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_flags_parse() {
        let cli = Cli::try_parse_from([
            "labelarr",
            "sync",
            "--dry-run",
            "--direction",
            "from-media-server",
            "--label",
            "kids",
            "--label",
            "4K",
        ])
        .unwrap();
        match cli.command {
            Commands::Sync {
                dry_run,
                direction,
                labels,
            } => {
                assert!(dry_run);
                assert!(matches!(direction, Some(DirectionArg::FromMediaServer)));
                assert_eq!(labels, vec!["kids".to_string(), "4K".to_string()]);
            }
            _ => panic!("expected sync command"),
        }
    }

    #[test]
    fn test_log_file_without_value() {
        let cli = Cli::try_parse_from(["labelarr", "config", "show", "--log-file"]).unwrap();
        assert_eq!(cli.log_file, Some(None));

        let cli = Cli::try_parse_from(["labelarr", "--log-file", "/tmp/l.log", "config", "init"]).unwrap();
        assert_eq!(cli.log_file, Some(Some(PathBuf::from("/tmp/l.log"))));
    }
}
