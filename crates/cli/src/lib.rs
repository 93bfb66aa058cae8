//! Licenser CLI library — exposed for integration tests

pub mod commands;
pub mod license;
pub mod logging;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "licenser")]
#[command(about = "Keep a product's license in step with its licensing server", long_about = None)]
#[command(version = licenser_core::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to licenser.toml (default: search from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, global = true, default_value = "terminal")]
    pub format: OutputFormat,

    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create licenser.toml
    Init {
        /// Directory to initialize (default: current directory)
        path: Option<PathBuf>,
    },

    /// Activate a license key on this site
    Activate {
        /// License key
        key: String,
    },

    /// Deactivate the stored license
    Deactivate {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Refresh the stored license from the server
    Refresh,

    /// Show the stored license
    Status,

    /// Exit non-zero unless the license is valid
    Check {
        /// Attribute the license must carry
        #[arg(long, requires = "value")]
        attr: Option<String>,

        /// Expected attribute value (parsed as JSON when possible)
        #[arg(long, requires = "attr")]
        value: Option<String>,
    },

    /// Schedule the recurring refresh
    Schedule,

    /// Cancel the recurring refresh
    Unschedule,

    /// Run the refresh if it is due
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}
