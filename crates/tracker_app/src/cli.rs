use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;
use crate::logging::LogDestination;

/// Watches web pages and reports content and metadata changes.
#[derive(Parser, Debug, Clone)]
#[command(name = "site_tracker", version, about)]
pub struct Cli {
    /// Configuration file; a default one is written if missing
    #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    pub log: LogDestination,

    /// Log at debug level
    #[arg(long, short)]
    pub verbose: bool,

    /// Overrides the webhook from the configuration file
    #[arg(long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    pub discord_webhook_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Check every tracked site once
    Check {
        /// Send a heartbeat when nothing changed
        #[arg(long)]
        heartbeat: bool,
    },
    /// Check repeatedly until Ctrl-C
    Monitor {
        /// Send a heartbeat after every quiet run
        #[arg(long)]
        heartbeat: bool,
    },
    /// Start tracking one or more URLs
    Add {
        /// Group to add to; created if missing
        #[arg(long, short)]
        group: Option<String>,
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Stop tracking URLs and forget their baselines
    Remove {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Show tracked URLs by group
    List,
    /// Show per-site check history
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_group() {
        let cli = Cli::try_parse_from([
            "site_tracker",
            "add",
            "--group",
            "Casinos",
            "https://a.example",
            "https://b.example",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(
            cli.command,
            Command::Add {
                group: Some("Casinos".to_string()),
                urls: vec![
                    "https://a.example".to_string(),
                    "https://b.example".to_string()
                ],
            }
        );
    }

    #[test]
    fn parses_global_flags_before_subcommand() {
        let cli = Cli::try_parse_from([
            "site_tracker",
            "--config",
            "other.ron",
            "--log",
            "both",
            "-v",
            "check",
            "--heartbeat",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("other.ron"));
        assert_eq!(cli.log, LogDestination::Both);
        assert!(cli.verbose);
        assert_eq!(cli.command, Command::Check { heartbeat: true });
    }

    #[test]
    fn remove_requires_a_url() {
        assert!(Cli::try_parse_from(["site_tracker", "remove"]).is_err());
    }
}
