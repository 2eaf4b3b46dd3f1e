//! Resource assertion plan types.
//!
//! A `Plan` is the resolver's output: an ordered list of `ResourceAssertion`s
//! with explicit, typed dependency edges. The external convergence engine
//! applies the assertions; this crate only describes them.
//!
//! # Edge semantics
//!
//! - `requires` — ordering: the referenced assertion must converge first.
//!   A `requires` edge may name an id outside the plan; that models an
//!   external precondition (e.g. repository provisioning).
//! - `notifies` — change-notification: when this assertion changes host
//!   state, the referenced assertion must be re-applied (service restart).
//!   Notify edges must resolve inside the plan.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::probe::Probe;
use crate::types::{FileState, PackageEnsure, ServiceState};

/// Installer environment variable carrying the license key.
/// Redacted wherever assertions are displayed.
pub const LICENSE_ENV_VAR: &str = "NR_INSTALL_KEY";

/// Stable identifier of one assertion, e.g. `package:newrelic-php5`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssertionId(String);

impl AssertionId {
    pub fn package(name: &str) -> Self {
        Self(format!("package:{}", name))
    }

    pub fn file(path: &Path) -> Self {
        Self(format!("file:{}", path.display()))
    }

    pub fn exec(name: &str) -> Self {
        Self(format!("exec:{}", name))
    }

    pub fn service(name: &str) -> Self {
        Self(format!("service:{}", name))
    }

    /// External precondition id, satisfied outside this plan
    pub fn repo(name: &str) -> Self {
        Self(format!("repo:{}", name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssertionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Desired state of one system resource — the tagged union at the heart
/// of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DesiredState {
    /// A package present on the host (optionally pinned)
    Package { name: String, ensure: PackageEnsure },

    /// A file present with exact content, or absent
    File {
        path: PathBuf,
        state: FileState,
        /// Rendered content; `None` for absence assertions
        content: Option<String>,
    },

    /// A command to run, guarded by an idempotency probe
    Exec {
        command: String,
        args: Vec<String>,
        env: Vec<(String, String)>,
        search_path: Vec<PathBuf>,
        probe: Probe,
    },

    /// A service's run/boot state
    Service {
        name: String,
        ensure: ServiceState,
        enabled: bool,
    },
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Package { name, ensure } => write!(f, "Package({}, ensure={})", name, ensure),
            Self::File { path, state, .. } => {
                write!(f, "File({}, {})", path.display(), state)
            }
            Self::Exec { command, args, env, .. } => {
                // License key must not leak into logs or summaries
                let env_str: Vec<String> = env
                    .iter()
                    .map(|(k, v)| {
                        if k == LICENSE_ENV_VAR {
                            format!("{}=<redacted>", k)
                        } else {
                            format!("{}={}", k, v)
                        }
                    })
                    .collect();
                write!(
                    f,
                    "Exec({} {} [{}])",
                    command,
                    args.join(" "),
                    env_str.join(", ")
                )
            }
            Self::Service { name, ensure, enabled } => {
                write!(f, "Service({}, ensure={}, enabled={})", name, ensure, enabled)
            }
        }
    }
}

/// One declared desired state plus its dependency edges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAssertion {
    pub id: AssertionId,
    pub state: DesiredState,
    /// Ordering edges: these converge before this assertion is applied
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<AssertionId>,
    /// Notification edges: re-apply these when this assertion changes state
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notifies: Vec<AssertionId>,
}

impl ResourceAssertion {
    pub fn new(id: AssertionId, state: DesiredState) -> Self {
        Self {
            id,
            state,
            requires: Vec::new(),
            notifies: Vec::new(),
        }
    }

    pub fn requires(mut self, id: AssertionId) -> Self {
        self.requires.push(id);
        self
    }

    pub fn notifies(mut self, id: AssertionId) -> Self {
        self.notifies.push(id);
        self
    }
}

impl fmt::Display for ResourceAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} — {}", self.id, self.state)?;
        if !self.requires.is_empty() {
            let deps: Vec<&str> = self.requires.iter().map(AssertionId::as_str).collect();
            write!(f, " requires[{}]", deps.join(", "))?;
        }
        if !self.notifies.is_empty() {
            let deps: Vec<&str> = self.notifies.iter().map(AssertionId::as_str).collect();
            write!(f, " notifies[{}]", deps.join(", "))?;
        }
        Ok(())
    }
}

/// A complete assertion plan: topologically ordered, dependency-annotated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub assertions: Vec<ResourceAssertion>,
}

impl Plan {
    pub fn new(assertions: Vec<ResourceAssertion>) -> Self {
        Self { assertions }
    }

    /// Look up an assertion by id
    pub fn get(&self, id: &AssertionId) -> Option<&ResourceAssertion> {
        self.assertions.iter().find(|a| &a.id == id)
    }

    /// Position of an assertion in the applied order
    pub fn index_of(&self, id: &AssertionId) -> Option<usize> {
        self.assertions.iter().position(|a| &a.id == id)
    }

    /// The single install exec assertion, if the plan is well-formed
    pub fn install(&self) -> Option<&ResourceAssertion> {
        self.assertions
            .iter()
            .find(|a| matches!(a.state, DesiredState::Exec { .. }))
    }

    /// Ids referenced by `requires` edges but not defined in this plan —
    /// preconditions the caller must satisfy externally
    pub fn external_requires(&self) -> Vec<&AssertionId> {
        let defined: HashSet<&AssertionId> = self.assertions.iter().map(|a| &a.id).collect();
        let mut seen = HashSet::new();
        self.assertions
            .iter()
            .flat_map(|a| a.requires.iter())
            .filter(|id| !defined.contains(id) && seen.insert(*id))
            .collect()
    }

    /// Check plan consistency.
    ///
    /// - assertion ids are unique;
    /// - exactly one exec assertion exists;
    /// - every internal `requires` edge points at an earlier assertion
    ///   (the list order is a valid topological order, so the graph is
    ///   acyclic by construction);
    /// - every `notifies` edge resolves inside the plan.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&AssertionId> = HashSet::new();
        for assertion in &self.assertions {
            if !seen.insert(&assertion.id) {
                return Err(AgentError::plan(format!(
                    "duplicate assertion id: {}",
                    assertion.id
                )));
            }
        }

        let exec_count = self
            .assertions
            .iter()
            .filter(|a| matches!(a.state, DesiredState::Exec { .. }))
            .count();
        if exec_count != 1 {
            return Err(AgentError::plan(format!(
                "expected exactly one exec assertion, found {}",
                exec_count
            )));
        }

        for (idx, assertion) in self.assertions.iter().enumerate() {
            for dep in &assertion.requires {
                if let Some(dep_idx) = self.index_of(dep) {
                    if dep_idx >= idx {
                        return Err(AgentError::plan(format!(
                            "{} requires {} which is not ordered before it",
                            assertion.id, dep
                        )));
                    }
                }
                // unresolved ids are external preconditions
            }
            for dep in &assertion.notifies {
                if self.index_of(dep).is_none() {
                    return Err(AgentError::plan(format!(
                        "{} notifies unknown assertion {}",
                        assertion.id, dep
                    )));
                }
            }
        }

        Ok(())
    }

    /// Human-readable summary for logging/display. Secrets are redacted.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Assertion plan ({}):", self.assertions.len())];
        for (i, assertion) in self.assertions.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, assertion));
        }
        let external = self.external_requires();
        if !external.is_empty() {
            let ids: Vec<&str> = external.iter().map(|id| id.as_str()).collect();
            lines.push(format!("  external preconditions: {}", ids.join(", ")));
        }
        lines.join("\n")
    }
}
