// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Propdesk - Telegram lead qualification for real-estate CRMs.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod company;
mod config_cmd;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use propdesk_config::PropdeskConfig;

/// Propdesk - Telegram lead qualification for real-estate CRMs.
#[derive(Parser, Debug)]
#[command(name = "propdesk", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server.
    Serve,
    /// Inspect the effective configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage tenant companies.
    Company {
        #[command(subcommand)]
        action: CompanyAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the merged configuration with secrets masked.
    Show,
    /// Load and validate the configuration, then exit.
    Validate,
}

#[derive(Subcommand, Debug)]
enum CompanyAction {
    /// Create an active company.
    Add {
        /// Display name of the company.
        name: String,
    },
    /// List companies, oldest first.
    List,
}

fn load_config(path: Option<&std::path::Path>) -> PropdeskConfig {
    let loaded = match path {
        Some(path) => propdesk_config::load_and_validate_path(path),
        None => propdesk_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            propdesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Config {
            action: ConfigAction::Show,
        }) => config_cmd::run_show(&config),
        Some(Commands::Config {
            action: ConfigAction::Validate,
        }) => {
            config_cmd::run_validate(&config);
            Ok(())
        }
        Some(Commands::Company {
            action: CompanyAction::Add { name },
        }) => company::run_add(&config.storage, &name).await.map(|_| ()),
        Some(Commands::Company {
            action: CompanyAction::List,
        }) => company::run_list(&config.storage).await.map(|_| ()),
        None => {
            println!("propdesk: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["propdesk", "serve"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));

        let cli =
            Cli::try_parse_from(["propdesk", "company", "add", "Acme Realty"]).unwrap();
        match cli.command {
            Some(Commands::Company {
                action: CompanyAction::Add { name },
            }) => assert_eq!(name, "Acme Realty"),
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from([
            "propdesk",
            "config",
            "validate",
            "--config",
            "/tmp/propdesk.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/propdesk.toml")));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["propdesk", "shell"]).is_err());
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = propdesk_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.agent.name, "propdesk");
    }
}
