//! nrphp - desired-state planner for the New Relic PHP agent.
//!
//! Resolves a declarative host configuration into an ordered,
//! dependency-annotated plan of resource assertions (package, file, exec,
//! service) for an external convergence engine to apply.

pub mod cli;
pub mod config;
pub mod error;
pub mod plan;
pub mod platform;
pub mod probe;
pub mod render;
pub mod resolver;
pub mod types;

// Re-export main types for convenience
pub use config::{AgentConfig, AgentConfigOverlay};
pub use error::{AgentError, Result};
pub use plan::{AssertionId, DesiredState, Plan, ResourceAssertion};
pub use platform::{defaults_for, BuiltinDefaults, DefaultsProvider, OsFamily, PlatformDefaults};
pub use probe::{Probe, ProbeOutcome};
pub use render::{render_agent_ini, render_daemon_cfg, DAEMON_CFG_PATH};
pub use resolver::resolve;
pub use types::{FileState, PackageEnsure, ServiceState, StartupMode};
