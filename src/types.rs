//! Type-safe configuration values for nrphp.
//!
//! Replaces stringly-typed parameters with proper Rust enums that provide
//! compile-time validation and exhaustive matching. Inputs that arrive as
//! strings (config files, CLI flags) are validated at parse time: a bad
//! literal fails before any assertion can be produced.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// How the background daemon is started on the host.
///
/// `agent` leaves daemon startup to the agent's own process management;
/// `external` means this module manages the daemon config file and service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StartupMode {
    #[default]
    #[strum(serialize = "agent")]
    Agent,
    #[strum(serialize = "external")]
    External,
}

impl StartupMode {
    /// True when the daemon lifecycle (cfg file + service) is managed here
    pub fn manages_daemon(&self) -> bool {
        matches!(self, Self::External)
    }
}

/// Desired presence state for a file resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    #[default]
    #[strum(serialize = "present")]
    Present,
    #[strum(serialize = "absent")]
    Absent,
}

/// Desired run state for a service resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    #[strum(serialize = "running")]
    Running,
    #[default]
    #[strum(serialize = "stopped")]
    Stopped,
}

/// Desired ensure-state for a package resource.
///
/// `present` installs whatever version the repository offers; a version
/// string pins the package to that exact version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PackageEnsure {
    Present,
    Version(String),
}

impl Default for PackageEnsure {
    fn default() -> Self {
        Self::Present
    }
}

impl From<String> for PackageEnsure {
    fn from(value: String) -> Self {
        if value == "present" {
            Self::Present
        } else {
            Self::Version(value)
        }
    }
}

impl From<PackageEnsure> for String {
    fn from(value: PackageEnsure) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for PackageEnsure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Version(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_startup_mode_parsing() {
        assert_eq!(StartupMode::from_str("agent").unwrap(), StartupMode::Agent);
        assert_eq!(
            StartupMode::from_str("external").unwrap(),
            StartupMode::External
        );
        assert!(StartupMode::from_str("systemd").is_err());
        assert!(StartupMode::from_str("").is_err());
    }

    #[test]
    fn test_startup_mode_serde_rejects_unknown() {
        let parsed: Result<StartupMode, _> = serde_json::from_str("\"sidecar\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_startup_mode_manages_daemon() {
        assert!(!StartupMode::Agent.manages_daemon());
        assert!(StartupMode::External.manages_daemon());
    }

    #[test]
    fn test_package_ensure_from_string() {
        assert_eq!(
            PackageEnsure::from("present".to_string()),
            PackageEnsure::Present
        );
        assert_eq!(
            PackageEnsure::from("4.23.4.113".to_string()),
            PackageEnsure::Version("4.23.4.113".to_string())
        );
    }

    #[test]
    fn test_package_ensure_display() {
        assert_eq!(PackageEnsure::Present.to_string(), "present");
        assert_eq!(
            PackageEnsure::Version("9.21.0".to_string()).to_string(),
            "9.21.0"
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        for mode in StartupMode::iter() {
            let json = serde_json::to_string(&mode).unwrap();
            let parsed: StartupMode = serde_json::from_str(&json).unwrap();
            assert_eq!(mode, parsed);
        }

        let pinned = PackageEnsure::Version("4.23.4.113".to_string());
        let json = serde_json::to_string(&pinned).unwrap();
        assert_eq!(json, "\"4.23.4.113\"");
        let parsed: PackageEnsure = serde_json::from_str(&json).unwrap();
        assert_eq!(pinned, parsed);
    }

    #[test]
    fn test_all_enums_have_default() {
        assert_eq!(StartupMode::default(), StartupMode::Agent);
        assert_eq!(FileState::default(), FileState::Present);
        assert_eq!(ServiceState::default(), ServiceState::Stopped);
        assert_eq!(PackageEnsure::default(), PackageEnsure::Present);
    }
}
