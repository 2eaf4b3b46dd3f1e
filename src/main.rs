//! nrphp - main entry point.
//!
//! Thin CLI over the library: load a config overlay onto the platform
//! defaults, then resolve/validate/render/check as requested. The emitted
//! plan is what an external convergence engine applies; nothing here
//! changes host state.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use nrphp::cli::{Cli, Commands, RenderTarget};
use nrphp::config::AgentConfig;
use nrphp::plan::DesiredState;
use nrphp::probe::ProbeOutcome;
use nrphp::render::{render_agent_ini, render_daemon_cfg};
use nrphp::resolver::resolve;

/// Initialize tracing with RUST_LOG override support
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse_args();
    debug!("CLI arguments parsed");

    match cli.command {
        Commands::Plan { config, json } => {
            let config = AgentConfig::load_from_file(&config, cli.os)
                .with_context(|| format!("failed to load configuration {:?}", config))?;
            let plan = resolve(&config).context("failed to resolve assertion plan")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                println!("{}", plan.summary());
            }
            info!(assertions = plan.assertions.len(), "plan resolved");
        }

        Commands::Validate { config } => {
            let path = config;
            let config = AgentConfig::load_from_file(&path, cli.os)
                .with_context(|| format!("failed to load configuration {:?}", path))?;
            config.validate().context("configuration is invalid")?;
            println!("✓ Configuration file is valid: {:?}", path);
        }

        Commands::Render { config, target } => {
            let config = AgentConfig::load_from_file(&config, cli.os)
                .context("failed to load configuration")?;
            let rendered = match target {
                RenderTarget::Ini => render_agent_ini(&config.agent_ini_settings()),
                RenderTarget::Daemon => render_daemon_cfg(&config.daemon_settings),
            };
            print!("{}", rendered);
        }

        Commands::Check { config } => {
            let config = AgentConfig::load_from_file(&config, cli.os)
                .context("failed to load configuration")?;
            let plan = resolve(&config).context("failed to resolve assertion plan")?;
            let install = plan
                .install()
                .context("plan has no install assertion")?;

            let DesiredState::Exec { probe, .. } = &install.state else {
                anyhow::bail!("install assertion is not an exec");
            };
            match probe.evaluate() {
                ProbeOutcome::Satisfied => {
                    println!("✓ agent already installed with this license key");
                }
                ProbeOutcome::NeedsApply => {
                    println!("install required");
                    std::process::exit(1);
                }
                ProbeOutcome::Failed { reason } => {
                    warn!(%reason, "probe failed");
                    eprintln!("probe failed: {}", reason);
                    std::process::exit(2);
                }
            }
        }
    }

    Ok(())
}
