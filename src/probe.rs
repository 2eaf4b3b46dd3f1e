//! Current-state probes for idempotency checks.
//!
//! The install exec assertion carries a declarative probe instead of a shell
//! pre-check. Evaluation yields a tri-state outcome so a broken probe is
//! distinguishable from "install needed" — the original shell `grep` check
//! conflated the two.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of evaluating a probe against the live host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Desired state already holds; the guarded assertion can be skipped
    Satisfied,
    /// Desired state does not hold; the guarded assertion must be applied
    NeedsApply,
    /// The probe itself could not run. Surfaced as a hard error rather
    /// than silently treated as needs-apply.
    Failed { reason: String },
}

/// Declarative description of a current-state probe.
///
/// Carried inside the plan so the convergence engine (or `nrphp check`)
/// can evaluate it; the resolver itself never touches the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Probe {
    /// Satisfied when `path` exists and contains `needle` as a substring
    FileContainsKey { path: PathBuf, needle: String },
}

impl Probe {
    /// Evaluate the probe against the live filesystem.
    ///
    /// A missing target file means the guarded step has not run yet and
    /// maps to `NeedsApply`; any other read failure maps to `Failed`.
    pub fn evaluate(&self) -> ProbeOutcome {
        match self {
            Self::FileContainsKey { path, needle } => match fs::read_to_string(path) {
                Ok(content) if content.contains(needle.as_str()) => {
                    debug!(path = %path.display(), "probe target already contains key");
                    ProbeOutcome::Satisfied
                }
                Ok(_) => ProbeOutcome::NeedsApply,
                Err(e) if e.kind() == ErrorKind::NotFound => ProbeOutcome::NeedsApply,
                Err(e) => ProbeOutcome::Failed {
                    reason: format!("cannot read {}: {}", path.display(), e),
                },
            },
        }
    }
}
