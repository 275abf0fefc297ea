// src/cli/mod.rs — CLI definition (clap derive)

pub mod ask;
pub mod migrate;
pub mod providers;
pub mod serve;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "booomerangs",
    about = "AI chat and image gateway that always answers",
    version
)]
pub struct Cli {
    /// Config file path (default: $BOOOMERANGS_HOME/booomerangs.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log filter when BOOOMERANGS_LOG / RUST_LOG are unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the HTTP service (default)
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Ask one question through the provider cascade
    Ask {
        /// The message to send
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,
        /// Try this provider first
        #[arg(long)]
        provider: Option<String>,
        /// With --provider: skip the rest of the cascade if it fails
        #[arg(long, requires = "provider")]
        strict: bool,
    },
    /// List configured chat and image providers
    Providers,
    /// Show or manage the session database schema
    Migrate {
        /// Show migration status only
        #[arg(long)]
        status: bool,
        /// Roll back the most recent migration
        #[arg(long, conflicts_with = "status")]
        rollback: bool,
    },
}
