//! The decommission checklist: a fixed sequence of destructive phases, each
//! a short list of external commands.
//!
//! The runner is a human-supervised checklist, not an orchestrator: phases
//! are confirmed one by one by the caller, nothing is rolled back on
//! partial failure, and a skipped phase leaves later phases runnable.

use crate::config::Config;
use crate::error::Result;
use crate::exec::{self, CommandSpec};
use crate::paths;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Phase {
    pub name: &'static str,
    pub title: &'static str,
    pub commands: Vec<CommandSpec>,
    /// Tolerant phases keep going past command failures. Kubernetes deletes
    /// are tolerant: a half-removed app must not stop the checklist.
    pub tolerant: bool,
}

#[derive(Debug, Clone)]
pub struct Plan {
    pub app: String,
    pub namespace: String,
    pub phases: Vec<Phase>,
}

pub fn plan(config: &Config, app: &str, namespace: Option<&str>) -> Result<Plan> {
    paths::validate_app_name(app)?;
    let ns = namespace.unwrap_or(app).to_string();
    paths::validate_app_name(&ns)?;

    let vault = config.vault_name(app);
    let phases = vec![
        Phase {
            name: "kubernetes",
            title: "Kubernetes resources",
            commands: vec![
                CommandSpec::new(
                    "kubectl",
                    [
                        "delete",
                        "deployment,service,ingress",
                        app,
                        "-n",
                        ns.as_str(),
                        "--ignore-not-found",
                    ],
                ),
                CommandSpec::new(
                    "kubectl",
                    [
                        "delete",
                        "virtualservice,secretproviderclass",
                        app,
                        "-n",
                        ns.as_str(),
                        "--ignore-not-found",
                    ],
                ),
                CommandSpec::new(
                    "kubectl",
                    ["delete", "namespace", ns.as_str(), "--ignore-not-found"],
                ),
            ],
            tolerant: true,
        },
        Phase {
            name: "key-vault",
            title: "Azure Key Vault",
            commands: vec![CommandSpec::new(
                "az",
                ["keyvault", "delete", "--name", vault.as_str()],
            )],
            tolerant: false,
        },
        Phase {
            name: "dns",
            title: "DNS record",
            commands: vec![CommandSpec::new(
                "az",
                [
                    "network",
                    "dns",
                    "record-set",
                    "cname",
                    "delete",
                    "-g",
                    config.network.dns_resource_group.as_str(),
                    "-z",
                    config.network.dns_zone.as_str(),
                    "-n",
                    app,
                    "--yes",
                ],
            )],
            tolerant: false,
        },
        Phase {
            name: "registry",
            title: "Container registry images",
            commands: vec![CommandSpec::new(
                "az",
                [
                    "acr",
                    "repository",
                    "delete",
                    "--name",
                    config.registry.name.as_str(),
                    "--repository",
                    app,
                    "--yes",
                ],
            )],
            tolerant: false,
        },
    ];

    Ok(Plan {
        app: app.to_string(),
        namespace: ns,
        phases,
    })
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Done,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseOutcome {
    pub name: &'static str,
    pub title: &'static str,
    pub status: PhaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Run every command in a phase. Tolerant phases collect failures as notes
/// and still count as done; others fail on the first error.
pub fn run_phase(phase: &Phase) -> PhaseOutcome {
    let mut notes = Vec::new();
    for cmd in &phase.commands {
        match exec::run(cmd) {
            Ok(()) => {}
            Err(e) if phase.tolerant => notes.push(e.to_string()),
            Err(e) => {
                return PhaseOutcome {
                    name: phase.name,
                    title: phase.title,
                    status: PhaseStatus::Failed,
                    detail: Some(e.to_string()),
                };
            }
        }
    }
    PhaseOutcome {
        name: phase.name,
        title: phase.title,
        status: PhaseStatus::Done,
        detail: if notes.is_empty() {
            None
        } else {
            Some(notes.join("; "))
        },
    }
}

pub fn skipped(phase: &Phase) -> PhaseOutcome {
    PhaseOutcome {
        name: phase.name,
        title: phase.title,
        status: PhaseStatus::Skipped,
        detail: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
