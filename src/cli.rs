use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::platform::OsFamily;

/// nrphp - desired-state planner for the New Relic PHP agent
#[derive(Parser)]
#[command(name = "nrphp")]
#[command(about = "Resolves agent configuration into an ordered assertion plan")]
#[command(version)]
pub struct Cli {
    /// Distribution family selecting the defaults table
    #[arg(long, global = true, default_value = "debian")]
    pub os: OsFamily,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a configuration into an assertion plan
    Plan {
        /// Path to a JSON config overlay (platform defaults apply underneath)
        #[arg(short, long)]
        config: PathBuf,

        /// Emit the full plan as JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file to validate
        config: PathBuf,
    },
    /// Print a rendered config file without resolving a plan
    Render {
        /// Path to a JSON config overlay
        #[arg(short, long)]
        config: PathBuf,

        /// Which managed file to render
        #[arg(long, value_enum, default_value = "ini")]
        target: RenderTarget,
    },
    /// Evaluate the install idempotency probe against this host
    Check {
        /// Path to a JSON config overlay
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Managed file selectable by `nrphp render`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderTarget {
    /// The agent ini file ({conf_dir}/newrelic.ini)
    Ini,
    /// The daemon cfg file (/etc/newrelic/newrelic.cfg)
    Daemon,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
