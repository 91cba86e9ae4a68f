//! Access explanations (audit/diagnostics).

use serde::Serialize;

use crate::{Permission, PermissionSet, PermissionSpec};

/// Detailed explanation of an access decision.
///
/// Answers "why is this menu entry hidden?" for support staff and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessExplanation {
    /// The requirement that was evaluated, rendered for humans.
    pub requirement: String,

    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// Required names the actor does not hold (empty when granted).
    pub missing: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial: Option<DenialKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// None of the any-of names is held.
    NoneHeld,
    /// At least one all-of name is missing.
    MissingRequired,
}

impl PermissionSet {
    /// Explain the outcome of [`PermissionSet::allows`] for `spec`.
    ///
    /// The `granted` flag always equals `self.allows(spec)`.
    pub fn explain(&self, spec: &PermissionSpec) -> AccessExplanation {
        let requirement = spec.to_string();
        let missing: Vec<String> = spec
            .names()
            .iter()
            .filter(|p| !self.contains(p.as_str()))
            .map(|p| p.as_str().to_string())
            .collect();

        match spec {
            PermissionSpec::Unrestricted => granted(requirement, "no permission is required"),
            PermissionSpec::AnyOf(names) if names.is_empty() => {
                granted(requirement, "empty requirement is unrestricted")
            }
            PermissionSpec::AnyOf(names) => {
                if names.iter().any(Permission::is_universal) {
                    granted(requirement, "requirement includes the 'all' sentinel")
                } else if let Some(held) = names.iter().find(|p| self.contains(p.as_str())) {
                    granted(requirement, format!("actor holds '{held}'"))
                } else {
                    AccessExplanation {
                        requirement,
                        granted: false,
                        reason: "actor holds none of the listed permissions".to_string(),
                        missing,
                        denial: Some(DenialKind::NoneHeld),
                    }
                }
            }
            PermissionSpec::AllOf(_) if missing.is_empty() => {
                granted(requirement, "actor holds every listed permission")
            }
            PermissionSpec::AllOf(_) => AccessExplanation {
                requirement,
                granted: false,
                reason: format!("missing {} of the listed permissions", missing.len()),
                missing,
                denial: Some(DenialKind::MissingRequired),
            },
        }
    }
}

fn granted(requirement: String, reason: impl Into<String>) -> AccessExplanation {
    AccessExplanation {
        requirement,
        granted: true,
        reason: reason.into(),
        missing: Vec::new(),
        denial: None,
    }
}
