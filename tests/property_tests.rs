//! Property-based tests for nrphp
//!
//! Uses proptest for invariants the resolver must hold for all inputs:
//! - determinism: same config, identical plan
//! - right-biased ini merge with no duplicate keys
//! - install-exec precedes every file/service assertion
//! - purge assertions are 1:1 with the configured list
//! - enum string round-trips

use std::collections::BTreeMap;
use std::path::PathBuf;

use proptest::prelude::*;

use nrphp::{
    resolve, AgentConfig, DesiredState, FileState, OsFamily, PackageEnsure, StartupMode,
};

/// Strategy for setting keys: short lowercase identifiers
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_.]{0,15}"
}

/// Strategy for setting values: printable, no newlines
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 /_.:-]{0,20}"
}

fn settings_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 0..8)
}

fn startup_mode_strategy() -> impl Strategy<Value = StartupMode> {
    prop_oneof![Just(StartupMode::Agent), Just(StartupMode::External)]
}

fn os_strategy() -> impl Strategy<Value = OsFamily> {
    prop_oneof![Just(OsFamily::Debian), Just(OsFamily::RedHat)]
}

/// Strategy for a valid config with randomized settings layers
fn config_strategy() -> impl Strategy<Value = AgentConfig> {
    (
        os_strategy(),
        startup_mode_strategy(),
        settings_strategy(),
        settings_strategy(),
        prop::collection::vec("[a-z][a-z0-9-]{0,12}", 0..4),
        prop::collection::vec("/[a-z]{1,8}/[a-z]{1,8}\\.ini", 0..5),
    )
        .prop_map(|(os, mode, ini, extra_ini, packages, purge)| {
            let mut config = AgentConfig::for_platform(os);
            config.license_key = "0123456789abcdef0123456789abcdef01234567".to_string();
            config.startup_mode = mode;
            config.ini_settings = ini;
            config.extra_ini_settings = extra_ini;
            // dedupe: package names double as assertion ids
            let mut packages = packages;
            packages.sort();
            packages.dedup();
            packages.retain(|p| p != &config.package_name);
            config.extra_packages = packages;
            let mut purge = purge.into_iter().map(PathBuf::from).collect::<Vec<_>>();
            purge.sort();
            purge.dedup();
            config.purge_files = purge;
            config
        })
}

proptest! {
    /// Same config always yields the identical plan
    #[test]
    fn resolve_is_deterministic(config in config_strategy()) {
        let a = resolve(&config).expect("plan generation failed");
        let b = resolve(&config).expect("plan generation failed");
        prop_assert_eq!(a, b);
    }

    /// Every resolved plan passes its own consistency validation
    #[test]
    fn resolved_plans_are_consistent(config in config_strategy()) {
        let plan = resolve(&config).expect("plan generation failed");
        prop_assert!(plan.validate().is_ok());
    }

    /// The install exec precedes every file and service assertion
    #[test]
    fn install_precedes_dependents(config in config_strategy()) {
        let plan = resolve(&config).expect("plan generation failed");
        let install_idx = plan
            .assertions
            .iter()
            .position(|a| matches!(a.state, DesiredState::Exec { .. }))
            .expect("install assertion missing");

        for (idx, assertion) in plan.assertions.iter().enumerate() {
            if matches!(
                assertion.state,
                DesiredState::File { .. } | DesiredState::Service { .. }
            ) {
                prop_assert!(install_idx < idx);
            }
        }
    }

    /// Ini merge is right-biased and never produces duplicate keys
    #[test]
    fn ini_merge_right_biased(
        extra in settings_strategy(),
        explicit in settings_strategy(),
    ) {
        let mut config = AgentConfig::for_platform(OsFamily::Debian);
        config.extra_ini_settings = extra.clone();
        config.ini_settings = explicit.clone();

        let merged = config.all_ini_settings();
        for (key, value) in &explicit {
            prop_assert_eq!(merged.get(key), Some(value));
        }
        for (key, value) in &extra {
            if !explicit.contains_key(key) {
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }
        prop_assert!(merged.len() <= extra.len() + explicit.len());
    }

    /// Purge absence assertions are produced 1:1 with purge_files
    #[test]
    fn purge_assertions_match_list(config in config_strategy()) {
        let plan = resolve(&config).expect("plan generation failed");
        let daemon_cfg = PathBuf::from(nrphp::DAEMON_CFG_PATH);

        let absences: Vec<&PathBuf> = plan
            .assertions
            .iter()
            .filter_map(|a| match &a.state {
                DesiredState::File { state: FileState::Absent, path, .. }
                    if path != &daemon_cfg => Some(path),
                _ => None,
            })
            .collect();
        prop_assert_eq!(absences.len(), config.purge_files.len());
        for path in &config.purge_files {
            prop_assert!(absences.contains(&path));
        }
    }

    /// Startup mode yields exactly one of the two daemon triples
    #[test]
    fn mode_triples_are_closed(config in config_strategy()) {
        let plan = resolve(&config).expect("plan generation failed");
        let service = plan
            .assertions
            .iter()
            .find_map(|a| match &a.state {
                DesiredState::Service { ensure, enabled, .. } => Some((*ensure, *enabled)),
                _ => None,
            })
            .expect("service assertion missing");
        let daemon_cfg = plan
            .assertions
            .iter()
            .find_map(|a| match &a.state {
                DesiredState::File { state, path, .. }
                    if path == &PathBuf::from(nrphp::DAEMON_CFG_PATH) => Some(*state),
                _ => None,
            })
            .expect("daemon cfg assertion missing");

        use nrphp::ServiceState;
        match config.startup_mode {
            StartupMode::Agent => {
                prop_assert_eq!(daemon_cfg, FileState::Absent);
                prop_assert_eq!(service, (ServiceState::Stopped, false));
            }
            StartupMode::External => {
                prop_assert_eq!(daemon_cfg, FileState::Present);
                prop_assert_eq!(service, (ServiceState::Running, true));
            }
        }
    }

    /// StartupMode: to_string → parse round-trip is identity
    #[test]
    fn startup_mode_roundtrip(mode in startup_mode_strategy()) {
        let s = mode.to_string();
        let parsed: StartupMode = s.parse().expect("should parse");
        prop_assert_eq!(mode, parsed);
    }

    /// PackageEnsure: string → from → to_string round-trip is identity
    #[test]
    fn package_ensure_roundtrip(v in "[a-z0-9.]{1,12}") {
        let ensure = PackageEnsure::from(v.clone());
        prop_assert_eq!(ensure.to_string(), v);
    }
}
