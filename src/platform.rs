//! OS-dependent default parameters.
//!
//! The agent package name, config directory, and the redundant ini files the
//! vendor installer drops all differ between distribution families. This
//! module exposes the defaults table behind a small provider trait so callers
//! inject it once at startup instead of reading global state.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Distribution family the host belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    #[default]
    #[strum(serialize = "debian")]
    Debian,
    #[strum(serialize = "redhat")]
    RedHat,
}

/// Default parameter set for one distribution family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDefaults {
    pub conf_dir: PathBuf,
    pub package_name: String,
    pub service_name: String,
    pub extra_packages: Vec<String>,
    pub purge_files: Vec<PathBuf>,
    pub extra_ini_settings: BTreeMap<String, String>,
    pub exec_search_path: Vec<PathBuf>,
    pub manage_repo: bool,
}

/// Source of platform defaults, resolved once at startup
pub trait DefaultsProvider {
    fn defaults(&self, os: OsFamily) -> PlatformDefaults;
}

/// Built-in defaults table covering the supported distribution families
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinDefaults;

impl DefaultsProvider for BuiltinDefaults {
    fn defaults(&self, os: OsFamily) -> PlatformDefaults {
        defaults_for(os)
    }
}

/// Search path handed to the install exec assertion on every family
const EXEC_SEARCH_PATH: &[&str] = &["/bin", "/sbin", "/usr/bin", "/usr/sbin", "/usr/local/bin"];

/// Ini settings applied unless overridden by explicit `ini_settings`
fn base_ini_settings() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("appname".to_string(), "PHP Application".to_string()),
        (
            "logfile".to_string(),
            "/var/log/newrelic/php_agent.log".to_string(),
        ),
    ])
}

/// Look up the default parameter set for a distribution family
pub fn defaults_for(os: OsFamily) -> PlatformDefaults {
    let exec_search_path = EXEC_SEARCH_PATH.iter().map(PathBuf::from).collect();

    match os {
        OsFamily::Debian => PlatformDefaults {
            conf_dir: PathBuf::from("/etc/php5/mods-available"),
            package_name: "newrelic-php5".to_string(),
            service_name: "newrelic-daemon".to_string(),
            extra_packages: vec!["php5-cli".to_string(), "php5-common".to_string()],
            // The installer writes a copy of newrelic.ini into every SAPI
            // conf.d it finds; those duplicates shadow the managed file.
            purge_files: vec![
                PathBuf::from("/etc/php5/cli/conf.d/newrelic.ini"),
                PathBuf::from("/etc/php5/apache2/conf.d/newrelic.ini"),
                PathBuf::from("/etc/php5/fpm/conf.d/newrelic.ini"),
            ],
            extra_ini_settings: base_ini_settings(),
            exec_search_path,
            manage_repo: true,
        },
        OsFamily::RedHat => PlatformDefaults {
            conf_dir: PathBuf::from("/etc/php.d"),
            package_name: "newrelic-php5".to_string(),
            service_name: "newrelic-daemon".to_string(),
            extra_packages: Vec::new(),
            // php.d is the single conf dir on RedHat, nothing to purge
            purge_files: Vec::new(),
            extra_ini_settings: base_ini_settings(),
            exec_search_path,
            manage_repo: true,
        },
    }
}
