//! Rendering of the two managed config file formats.
//!
//! Plain string formatting over `BTreeMap` settings — iteration order is the
//! sorted key order, so rendered output is deterministic for a given input.

use std::collections::BTreeMap;

/// Section header of the managed agent ini file
pub const INI_SECTION: &str = "newrelic";

/// Namespace token prefixed to every setting key in the agent ini file
pub const INI_KEY_PREFIX: &str = "newrelic.";

/// Fixed location of the daemon cfg file (external mode only)
pub const DAEMON_CFG_PATH: &str = "/etc/newrelic/newrelic.cfg";

/// Render the agent ini file: one `[newrelic]` section, each merged setting
/// written as `newrelic.<key> = <value>`.
pub fn render_agent_ini(settings: &BTreeMap<String, String>) -> String {
    let mut out = format!("[{}]\n", INI_SECTION);
    for (key, value) in settings {
        out.push_str(&format!("{}{} = {}\n", INI_KEY_PREFIX, key, value));
    }
    out
}

/// Render the daemon cfg file: plain `key=value` lines
pub fn render_daemon_cfg(settings: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in settings {
        out.push_str(&format!("{}={}\n", key, value));
    }
    out
}
