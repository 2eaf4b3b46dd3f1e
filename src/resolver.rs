//! Desired-State Resolver.
//!
//! Translates an `AgentConfig` into an ordered, dependency-annotated
//! `Plan` of resource assertions for the external convergence engine.
//!
//! # Derivation rules
//!
//! | Step | Assertion | Depends on |
//! |------|-----------|------------|
//! | 1 | repository precondition (external id, `manage_repo` only) | — |
//! | 2 | extra packages + primary package | repo (primary only) |
//! | 3 | install exec, probe-guarded | all packages |
//! | 4–5 | agent ini file (merged settings) | install |
//! | 6 | daemon cfg file (mode-dependent) | install |
//! | 7 | one absence assertion per purge file | install |
//! | 8 | daemon service (mode-dependent) | daemon cfg file |
//!
//! # Design
//!
//! - **Pure logic**: no I/O, no side effects — only generates the plan
//! - **Deterministic**: identical config yields an identical plan
//! - **Fail fast**: validation errors abort before any assertion exists
//!
//! # What This Explicitly Refuses To Do
//!
//! - Apply anything: package installs, file writes and service state
//!   changes belong to the convergence engine consuming the plan.
//! - Retry the installer: an exec failure surfaces as-is; re-convergence
//!   on the next run is the recovery path.

use tracing::debug;

use crate::config::AgentConfig;
use crate::error::Result;
use crate::plan::{
    AssertionId, DesiredState, Plan, ResourceAssertion, LICENSE_ENV_VAR,
};
use crate::probe::Probe;
use crate::render::{render_agent_ini, render_daemon_cfg, DAEMON_CFG_PATH};
use crate::types::{FileState, PackageEnsure, ServiceState};

/// Vendor installer binary, expected on the exec search path
const INSTALLER_COMMAND: &str = "newrelic-install";

/// External precondition id for vendor repository provisioning
const REPO_NAME: &str = "newrelic";

/// Resolve a configuration into an assertion plan.
///
/// Pure function: same input, identical plan and dependency graph. The
/// assertion order is a valid topological order of the `requires` edges.
///
/// # Errors
///
/// Returns a validation error (and emits zero assertions) when required
/// fields are missing; see [`AgentConfig::validate`].
pub fn resolve(config: &AgentConfig) -> Result<Plan> {
    config.validate()?;

    let mut assertions = Vec::new();

    // Step 2: packages. Extra packages first, unpinned; the primary
    // package honors package_ensure and, when the repository is managed,
    // waits for the external provisioning precondition.
    let mut package_ids = Vec::new();
    for name in &config.extra_packages {
        let assertion = ResourceAssertion::new(
            AssertionId::package(name),
            DesiredState::Package {
                name: name.clone(),
                ensure: PackageEnsure::Present,
            },
        );
        package_ids.push(assertion.id.clone());
        assertions.push(assertion);
    }

    let mut primary = ResourceAssertion::new(
        AssertionId::package(&config.package_name),
        DesiredState::Package {
            name: config.package_name.clone(),
            ensure: config.package_ensure.clone(),
        },
    );
    if config.manage_repo {
        primary = primary.requires(AssertionId::repo(REPO_NAME));
    }
    package_ids.push(primary.id.clone());
    assertions.push(primary);

    // Step 3: the single install exec, guarded by the license-key probe.
    let agent_ini_path = config.agent_ini_path();
    let mut install = ResourceAssertion::new(
        AssertionId::exec(INSTALLER_COMMAND),
        DesiredState::Exec {
            command: INSTALLER_COMMAND.to_string(),
            args: vec!["install".to_string()],
            env: vec![
                ("NR_INSTALL_SILENT".to_string(), "yes".to_string()),
                (LICENSE_ENV_VAR.to_string(), config.license_key.clone()),
            ],
            search_path: config.exec_search_path.clone(),
            probe: Probe::FileContainsKey {
                path: agent_ini_path.clone(),
                needle: config.license_key.clone(),
            },
        },
    );
    for id in package_ids {
        install = install.requires(id);
    }
    let install_id = install.id.clone();
    assertions.push(install);

    // Steps 4–5: agent ini file from the merged settings layers plus the
    // license key, so the converged file keeps satisfying the install
    // probe instead of re-triggering the installer on every run.
    let merged = config.agent_ini_settings();
    assertions.push(
        ResourceAssertion::new(
            AssertionId::file(&agent_ini_path),
            DesiredState::File {
                path: agent_ini_path,
                state: FileState::Present,
                content: Some(render_agent_ini(&merged)),
            },
        )
        .requires(install_id.clone()),
    );

    // Step 6: daemon cfg file. Present only when this module manages the
    // daemon; a content change then forces a service restart.
    let daemon_cfg_path = std::path::PathBuf::from(DAEMON_CFG_PATH);
    let daemon_cfg_id = AssertionId::file(&daemon_cfg_path);
    let service_id = AssertionId::service(&config.service_name);
    let daemon_cfg = if config.startup_mode.manages_daemon() {
        ResourceAssertion::new(
            daemon_cfg_id.clone(),
            DesiredState::File {
                path: daemon_cfg_path,
                state: FileState::Present,
                content: Some(render_daemon_cfg(&config.daemon_settings)),
            },
        )
        .requires(install_id.clone())
        .notifies(service_id.clone())
    } else {
        ResourceAssertion::new(
            daemon_cfg_id.clone(),
            DesiredState::File {
                path: daemon_cfg_path,
                state: FileState::Absent,
                content: None,
            },
        )
        .requires(install_id.clone())
    };
    assertions.push(daemon_cfg);

    // Step 7: purge the redundant files the installer dropped, one
    // absence assertion per distinct path. A repeated path is the same
    // desired state twice, not a conflict — collapse it. Purging only
    // has to happen after the installer created the files.
    let mut purged = std::collections::HashSet::new();
    for path in &config.purge_files {
        if !purged.insert(path) {
            continue;
        }
        assertions.push(
            ResourceAssertion::new(
                AssertionId::file(path),
                DesiredState::File {
                    path: path.clone(),
                    state: FileState::Absent,
                    content: None,
                },
            )
            .requires(install_id.clone()),
        );
    }

    // Step 8: daemon service state per startup mode.
    let (ensure, enabled) = if config.startup_mode.manages_daemon() {
        (ServiceState::Running, true)
    } else {
        (ServiceState::Stopped, false)
    };
    assertions.push(
        ResourceAssertion::new(
            service_id,
            DesiredState::Service {
                name: config.service_name.clone(),
                ensure,
                enabled,
            },
        )
        .requires(daemon_cfg_id),
    );

    let plan = Plan::new(assertions);
    plan.validate()?;
    debug!(
        assertions = plan.assertions.len(),
        mode = %config.startup_mode,
        "resolved assertion plan"
    );
    Ok(plan)
}
