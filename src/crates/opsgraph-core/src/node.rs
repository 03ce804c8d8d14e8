//! Node identity, properties, and validation

use crate::error::{PlanError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum length of a node ID.
pub const MAX_ID_LENGTH: usize = 256;

const SENSITIVE_LABEL_SUBSTRINGS: &[&str] = &[
    "password",
    "api_key",
    "apikey",
    "token",
    "secret",
    "credential",
    "auth",
];

/// True when `key` (case-insensitively) contains any of the sensitive substrings that trigger
/// redaction in [`crate::graph::Graph::to_json`].
pub fn is_sensitive_label_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    SENSITIVE_LABEL_SUBSTRINGS.iter().any(|needle| lower.contains(needle))
}

/// Validate a node or edge ID: non-empty, at most [`MAX_ID_LENGTH`] characters, no path-traversal
/// (`..`), no shell metacharacters (`;`, `|`, `&`, `` ` ``, `$`, newline, carriage return), no NUL,
/// and composed only of `[A-Za-z0-9_.:/@-]`.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(PlanError::invalid_input("node id must not be empty"));
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(PlanError::invalid_input(format!(
            "node id exceeds {MAX_ID_LENGTH} characters"
        )));
    }
    if id.contains("..") {
        return Err(PlanError::invalid_input("node id must not contain '..'"));
    }
    if id.chars().any(|c| matches!(c, ';' | '|' | '&' | '$' | '`' | '\n' | '\r' | '\0')) {
        return Err(PlanError::invalid_input("node id contains a disallowed character"));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '/' | '@' | '-'))
    {
        return Err(PlanError::invalid_input(format!(
            "node id '{id}' contains characters outside [A-Za-z0-9_.:/@-]"
        )));
    }
    Ok(())
}

/// Risk classification for a node, used by the analyzer's risk scoring and several scheduler
/// strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Base risk score before destructive/critical-path adjustments (see the analyzer).
    pub fn base_score(self) -> f64 {
        match self {
            RiskLevel::Low => 25.0,
            RiskLevel::Medium => 50.0,
            RiskLevel::High => 75.0,
            RiskLevel::Critical => 100.0,
        }
    }
}

/// Resource requirements declared by a node, consumed by the `ResourceLeveling` scheduler strategy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ResourceRequirements {
    pub max_parallel: Option<u32>,
    pub api_calls_required: u32,
}

/// One planned operation.
///
/// Constructed via [`Node::new`], which validates the ID (see [`validate_id`]) and rejects negative
/// durations. `level`, `earliest_start`, `latest_start`, `slack`, and `is_critical` are computed
/// fields: zero/false until an algorithm populates them, never hand-set by callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub resource_kind: String,

    pub estimated_duration_secs: f64,
    pub min_duration_secs: f64,
    pub max_duration_secs: f64,

    pub resources: ResourceRequirements,
    pub risk_level: RiskLevel,
    pub destructive: bool,
    pub priority: i64,
    pub retriable: bool,
    pub idempotent: bool,
    pub cost: f64,

    pub labels: HashMap<String, String>,
    /// IDs this node directly depends on, mirrored from the graph's forward adjacency for this
    /// node — kept in sync by [`crate::graph::Graph::add_edge`]/[`crate::graph::Graph::remove_edge`].
    pub dependencies: Vec<String>,

    pub level: u32,
    pub earliest_start: f64,
    pub latest_start: f64,
    pub slack: f64,
    pub is_critical: bool,
}

impl Node {
    /// Create a node. Fails with [`PlanError::InvalidInput`] if `id` fails [`validate_id`] or any
    /// duration is negative.
    pub fn new(id: impl Into<String>, name: impl Into<String>, resource_kind: impl Into<String>) -> Result<Self> {
        let id = id.into();
        validate_id(&id)?;
        Ok(Self {
            id,
            name: name.into(),
            resource_kind: resource_kind.into(),
            estimated_duration_secs: 0.0,
            min_duration_secs: 0.0,
            max_duration_secs: 0.0,
            resources: ResourceRequirements::default(),
            risk_level: RiskLevel::Low,
            destructive: false,
            priority: 0,
            retriable: true,
            idempotent: false,
            cost: 0.0,
            labels: HashMap::new(),
            dependencies: Vec::new(),
            level: 0,
            earliest_start: 0.0,
            latest_start: 0.0,
            slack: 0.0,
            is_critical: false,
        })
    }

    pub fn with_duration(mut self, estimated: f64, min: f64, max: f64) -> Result<Self> {
        if estimated < 0.0 || min < 0.0 || max < 0.0 {
            return Err(PlanError::invalid_input(format!(
                "node '{}' has a negative duration",
                self.id
            )));
        }
        self.estimated_duration_secs = estimated;
        self.min_duration_secs = min;
        self.max_duration_secs = max;
        Ok(self)
    }

    pub fn with_risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = risk_level;
        self
    }

    pub fn with_destructive(mut self, destructive: bool) -> Self {
        self.destructive = destructive;
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_retriable(mut self, retriable: bool) -> Self {
        self.retriable = retriable;
        self
    }

    pub fn with_idempotent(mut self, idempotent: bool) -> Self {
        self.idempotent = idempotent;
        self
    }

    pub fn with_resources(mut self, resources: ResourceRequirements) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}
