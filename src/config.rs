//! Agent configuration: platform defaults plus caller-supplied overrides.
//!
//! An `AgentConfig` is built once per run — start from the defaults table for
//! the detected distribution family, then overlay whatever the caller set in
//! a JSON config file. The result is immutable for the duration of the run;
//! the resolver derives the assertion plan from it without touching it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::platform::{defaults_for, DefaultsProvider, OsFamily, PlatformDefaults};
use crate::types::{PackageEnsure, StartupMode};

/// Resolved parameter set for one convergence run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// New Relic license key. Secret — never printed in plan summaries.
    pub license_key: String,
    /// Directory the managed newrelic.ini is rendered into
    pub conf_dir: PathBuf,
    /// Primary agent package
    pub package_name: String,
    /// Background daemon service
    pub service_name: String,
    /// Ensure-state for the primary package (present or pinned version)
    pub package_ensure: PackageEnsure,
    /// Who starts the daemon: the agent itself, or this module
    pub startup_mode: StartupMode,
    /// Packages that must be present before the installer runs
    pub extra_packages: Vec<String>,
    /// Explicit ini settings; win over `extra_ini_settings` on conflict
    pub ini_settings: BTreeMap<String, String>,
    /// Default ini settings layer
    pub extra_ini_settings: BTreeMap<String, String>,
    /// Settings rendered into the daemon cfg file (external mode only)
    pub daemon_settings: BTreeMap<String, String>,
    /// Redundant installer-created files to remove post-install
    pub purge_files: Vec<PathBuf>,
    /// Search path for the install exec assertion
    pub exec_search_path: Vec<PathBuf>,
    /// Whether the vendor package repository is provisioned externally
    pub manage_repo: bool,
}

/// Caller-supplied overrides, loaded from a JSON file.
///
/// Every field is optional; unset fields keep their platform default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfigOverlay {
    pub license_key: Option<String>,
    pub conf_dir: Option<PathBuf>,
    pub package_name: Option<String>,
    pub service_name: Option<String>,
    pub package_ensure: Option<PackageEnsure>,
    pub startup_mode: Option<StartupMode>,
    pub extra_packages: Option<Vec<String>>,
    pub ini_settings: Option<BTreeMap<String, String>>,
    pub extra_ini_settings: Option<BTreeMap<String, String>>,
    pub daemon_settings: Option<BTreeMap<String, String>>,
    pub purge_files: Option<Vec<PathBuf>>,
    pub exec_search_path: Option<Vec<PathBuf>>,
    pub manage_repo: Option<bool>,
}

impl AgentConfig {
    /// Build the default configuration for a distribution family.
    ///
    /// The license key starts empty and must be supplied by the caller;
    /// `validate` rejects the config until it is.
    pub fn for_platform(os: OsFamily) -> Self {
        Self::from_defaults(defaults_for(os))
    }

    /// Build the default configuration from an injected provider
    pub fn from_provider(provider: &dyn DefaultsProvider, os: OsFamily) -> Self {
        Self::from_defaults(provider.defaults(os))
    }

    fn from_defaults(defaults: PlatformDefaults) -> Self {
        Self {
            license_key: String::new(),
            conf_dir: defaults.conf_dir,
            package_name: defaults.package_name,
            service_name: defaults.service_name,
            package_ensure: PackageEnsure::Present,
            startup_mode: StartupMode::default(),
            extra_packages: defaults.extra_packages,
            ini_settings: BTreeMap::new(),
            extra_ini_settings: defaults.extra_ini_settings,
            daemon_settings: BTreeMap::new(),
            purge_files: defaults.purge_files,
            exec_search_path: defaults.exec_search_path,
            manage_repo: defaults.manage_repo,
        }
    }

    /// Apply caller overrides on top of the defaults
    pub fn apply_overlay(&mut self, overlay: AgentConfigOverlay) {
        if let Some(v) = overlay.license_key {
            self.license_key = v;
        }
        if let Some(v) = overlay.conf_dir {
            self.conf_dir = v;
        }
        if let Some(v) = overlay.package_name {
            self.package_name = v;
        }
        if let Some(v) = overlay.service_name {
            self.service_name = v;
        }
        if let Some(v) = overlay.package_ensure {
            self.package_ensure = v;
        }
        if let Some(v) = overlay.startup_mode {
            self.startup_mode = v;
        }
        if let Some(v) = overlay.extra_packages {
            self.extra_packages = v;
        }
        if let Some(v) = overlay.ini_settings {
            self.ini_settings = v;
        }
        if let Some(v) = overlay.extra_ini_settings {
            self.extra_ini_settings = v;
        }
        if let Some(v) = overlay.daemon_settings {
            self.daemon_settings = v;
        }
        if let Some(v) = overlay.purge_files {
            self.purge_files = v;
        }
        if let Some(v) = overlay.exec_search_path {
            self.exec_search_path = v;
        }
        if let Some(v) = overlay.manage_repo {
            self.manage_repo = v;
        }
    }

    /// Load a config: platform defaults overlaid with a JSON override file
    pub fn load_from_file<P: AsRef<Path>>(path: P, os: OsFamily) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let overlay: AgentConfigOverlay = serde_json::from_str(&content)?;

        let mut config = Self::for_platform(os);
        config.apply_overlay(overlay);
        Ok(config)
    }

    /// Save the fully resolved configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Runs before resolution; a failure here means zero assertions are
    /// ever produced.
    pub fn validate(&self) -> Result<()> {
        if self.license_key.trim().is_empty() {
            return Err(AgentError::validation("license_key must be specified"));
        }
        if self.license_key.contains(char::is_whitespace) {
            return Err(AgentError::validation(
                "license_key cannot contain whitespace",
            ));
        }
        if self.package_name.trim().is_empty() {
            return Err(AgentError::validation("package_name must be specified"));
        }
        if self.service_name.trim().is_empty() {
            return Err(AgentError::validation("service_name must be specified"));
        }
        if self.conf_dir.as_os_str().is_empty() {
            return Err(AgentError::validation("conf_dir must be specified"));
        }
        if self.exec_search_path.is_empty() {
            return Err(AgentError::validation(
                "exec_search_path must contain at least one directory",
            ));
        }
        Ok(())
    }

    /// Merge the two ini-settings layers, explicit settings winning.
    ///
    /// Right-biased: `ini_settings` entries replace `extra_ini_settings`
    /// entries with the same key. The result has no duplicate keys.
    pub fn all_ini_settings(&self) -> BTreeMap<String, String> {
        let mut merged = self.extra_ini_settings.clone();
        merged.extend(
            self.ini_settings
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        merged
    }

    /// Settings rendered into the managed agent ini: the merged layers
    /// plus the license key. The install probe greps this file for the
    /// key, so the converged content must always contain it.
    pub fn agent_ini_settings(&self) -> BTreeMap<String, String> {
        let mut settings = self.all_ini_settings();
        settings.insert("license".to_string(), self.license_key.clone());
        settings
    }

    /// Path of the managed agent ini file
    pub fn agent_ini_path(&self) -> PathBuf {
        self.conf_dir.join("newrelic.ini")
    }
}
