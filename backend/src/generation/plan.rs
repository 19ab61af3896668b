//! Plan and result types
//!
//! A [`Plan`] is the planning stage's structured answer: whether to build a
//! new UI or modify the previous one, and which components (with which
//! props) it needs. It is produced once per request and shared read-only by
//! the generation and explanation stages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::components::ComponentName;
use super::validator::OutputWarning;

/// Whether the plan builds a fresh UI or edits the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    /// Build from the plan alone
    Create,
    /// Edit the previous artifact
    Modify,
}

impl PlanType {
    /// Wire name of the plan type
    pub fn as_str(self) -> &'static str {
        match self {
            PlanType::Create => "create",
            PlanType::Modify => "modify",
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Planner call producing the JSON plan
    Plan,
    /// Generator call producing the UI fragment
    Generate,
    /// Explainer call producing the prose justification
    Explain,
}

impl Stage {
    /// Stage name used in logs and wire bodies
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Plan => "plan",
            Stage::Generate => "generate",
            Stage::Explain => "explain",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One component the UI should contain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// Component from the closed vocabulary
    pub name: ComponentName,
    /// Prop values keyed by prop name
    #[serde(default)]
    pub props: Map<String, Value>,
}

/// Validated plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Create or modify
    #[serde(rename = "type")]
    pub plan_type: PlanType,
    /// Components in display order
    pub components: Vec<ComponentSpec>,
}

impl Plan {
    /// Whether the plan edits the previous artifact
    pub fn is_modify(&self) -> bool {
        self.plan_type == PlanType::Modify
    }
}

/// Pretty JSON, as embedded in the generation and explanation prompts.
///
/// Prop maps are ordered, so the output is stable for equal plans.
impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Input to one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    /// The user's instruction
    pub message: String,
    /// Code produced by an earlier run, if the user is iterating on it
    pub previous_artifact: Option<String>,
}

impl GenerationRequest {
    /// Request with no previous artifact
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            previous_artifact: None,
        }
    }

    /// Attach the previous artifact
    pub fn with_previous(mut self, previous: impl Into<String>) -> Self {
        self.previous_artifact = Some(previous.into());
        self
    }

    /// Previous artifact, treating blank text as absent
    pub fn previous(&self) -> Option<&str> {
        self.previous_artifact
            .as_deref()
            .filter(|p| !p.trim().is_empty())
    }
}

/// Output of a successful pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Validated plan
    pub plan: Plan,
    /// UI fragment produced by the generation stage, verbatim
    pub code: String,
    /// Prose produced by the explanation stage, verbatim
    pub explanation: String,
    /// Soft-check findings about `code` and `explanation`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<OutputWarning>,
}
