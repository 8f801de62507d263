//! Error types with error codes and fix suggestions
//!
//! Error code ranges:
//! - FLOW-001-019: Structural errors (workflow graph)
//! - FLOW-020-029: Business rule violations
//! - FLOW-030-039: Status transition errors
//! - FLOW-090-099: Input errors (IO, parsing, configuration)
//!
//! Every error is a rejection of a single request. Validation is fail-fast:
//! the first violated rule is the one reported.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GateError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Machine-checkable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Structural,
    BusinessRule,
    Transition,
    Input,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Structural => write!(f, "structural"),
            ErrorKind::BusinessRule => write!(f, "business_rule"),
            ErrorKind::Transition => write!(f, "transition"),
            ErrorKind::Input => write!(f, "input"),
        }
    }
}

/// Operation a rejection belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    CreateWorkflow,
    GenerateAnalyticsReport,
    ChangeStatus,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateWorkflow => "create_workflow",
            Operation::GenerateAnalyticsReport => "generate_analytics_report",
            Operation::ChangeStatus => "change_status",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end of an edge a reference error points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEndpoint {
    Source,
    Target,
}

impl fmt::Display for EdgeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeEndpoint::Source => write!(f, "source"),
            EdgeEndpoint::Target => write!(f, "target"),
        }
    }
}

// ═══════════════════════════════════════════
// STRUCTURAL ERRORS (001-019)
// ═══════════════════════════════════════════

/// Malformed workflow graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("[FLOW-001] Workflow must have at least one node")]
    EmptyDefinition,

    #[error("[FLOW-002] Node at position {index} is missing 'id' or 'type'")]
    MissingNodeFields { index: usize },

    #[error("[FLOW-003] Duplicate node ID: '{id}'")]
    DuplicateNodeId { id: String },

    #[error("[FLOW-004] Invalid node type '{node_type}' on node '{id}'")]
    InvalidNodeType { id: String, node_type: String },

    #[error("[FLOW-005] Email node '{id}' must have a template_id or a subject")]
    MissingEmailContent { id: String },

    #[error("[FLOW-006] Webhook node '{id}' must have a valid URL (got '{url}')")]
    InvalidWebhookUrl { id: String, url: String },

    #[error("[FLOW-007] Delay node '{id}' must have a positive duration")]
    InvalidDelayDuration { id: String },

    #[error("[FLOW-008] Workflow must have exactly one start node (found none)")]
    MissingStartNode,

    #[error("[FLOW-009] Workflow must have exactly one start node (found: {})", .ids.join(", "))]
    MultipleStartNodes { ids: Vec<String> },

    #[error("[FLOW-010] Edge at position {index} is missing 'source' or 'target'")]
    MissingEdgeFields { index: usize },

    #[error("[FLOW-011] Edge {endpoint} '{id}' does not exist")]
    DanglingEdgeReference { endpoint: EdgeEndpoint, id: String },

    #[error("[FLOW-012] Self-loop detected: node '{id}' connects to itself")]
    SelfLoopEdge { id: String },

    #[error("[FLOW-013] Nodes not reachable from start node: {}", .ids.join(", "))]
    UnreachableNodes { ids: Vec<String> },
}

impl StructuralError {
    /// Get the error code (e.g., "FLOW-003")
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyDefinition => "FLOW-001",
            Self::MissingNodeFields { .. } => "FLOW-002",
            Self::DuplicateNodeId { .. } => "FLOW-003",
            Self::InvalidNodeType { .. } => "FLOW-004",
            Self::MissingEmailContent { .. } => "FLOW-005",
            Self::InvalidWebhookUrl { .. } => "FLOW-006",
            Self::InvalidDelayDuration { .. } => "FLOW-007",
            Self::MissingStartNode => "FLOW-008",
            Self::MultipleStartNodes { .. } => "FLOW-009",
            Self::MissingEdgeFields { .. } => "FLOW-010",
            Self::DanglingEdgeReference { .. } => "FLOW-011",
            Self::SelfLoopEdge { .. } => "FLOW-012",
            Self::UnreachableNodes { .. } => "FLOW-013",
        }
    }

    /// Offending node id, where the rule points at one
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::DuplicateNodeId { id }
            | Self::InvalidNodeType { id, .. }
            | Self::MissingEmailContent { id }
            | Self::InvalidWebhookUrl { id, .. }
            | Self::InvalidDelayDuration { id }
            | Self::DanglingEdgeReference { id, .. }
            | Self::SelfLoopEdge { id } => Some(id),
            _ => None,
        }
    }
}

impl FixSuggestion for StructuralError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            Self::EmptyDefinition => Some("Add a start node to the workflow"),
            Self::MissingNodeFields { .. } => Some("Every node needs an 'id' and a 'type'"),
            Self::DuplicateNodeId { .. } => Some("Use unique node IDs"),
            Self::InvalidNodeType { .. } => Some(
                "Use one of: start, end, condition, action, delay, email, webhook, database, api_call",
            ),
            Self::MissingEmailContent { .. } => {
                Some("Set data.template_id or data.subject on the email node")
            }
            Self::InvalidWebhookUrl { .. } => {
                Some("Set data.url to an absolute URL such as https://example.com/hook")
            }
            Self::InvalidDelayDuration { .. } => Some("Set data.duration to a number above zero"),
            Self::MissingStartNode | Self::MultipleStartNodes { .. } => {
                Some("Keep exactly one node with type 'start'")
            }
            Self::MissingEdgeFields { .. } => Some("Every edge needs a 'source' and a 'target'"),
            Self::DanglingEdgeReference { .. } => Some("Point edges at existing node IDs"),
            Self::SelfLoopEdge { .. } => Some("Remove the edge or route it through another node"),
            Self::UnreachableNodes { .. } => {
                Some("Connect every node to the flow that starts at the start node")
            }
        }
    }
}

// ═══════════════════════════════════════════
// BUSINESS RULE VIOLATIONS (020-029)
// ═══════════════════════════════════════════

/// Why a business rule rejected the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViolationKind {
    OperationNotAllowed,
    ResourceLimit { resource: String, limit: u32 },
}

/// A violated precondition on workflow or report creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusinessRuleViolation {
    pub operation: Operation,
    pub kind: ViolationKind,
    pub message: String,
}

impl BusinessRuleViolation {
    pub fn operation_not_allowed(operation: Operation, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind: ViolationKind::OperationNotAllowed,
            message: message.into(),
        }
    }

    pub fn resource_limit(operation: Operation, resource: impl Into<String>, limit: u32) -> Self {
        let resource = resource.into();
        Self {
            operation,
            message: format!("Limit of {limit} {resource} reached"),
            kind: ViolationKind::ResourceLimit { resource, limit },
        }
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            ViolationKind::OperationNotAllowed => "FLOW-020",
            ViolationKind::ResourceLimit { .. } => "FLOW-021",
        }
    }

    pub fn is_resource_limit(&self) -> bool {
        matches!(self.kind, ViolationKind::ResourceLimit { .. })
    }
}

impl fmt::Display for BusinessRuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code(), self.operation, self.message)
    }
}

impl std::error::Error for BusinessRuleViolation {}

// ═══════════════════════════════════════════
// TRANSITION ERRORS (030-039)
// ═══════════════════════════════════════════

/// Requested event is not allowed from the aggregate's current state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[FLOW-030] Cannot {event} a {aggregate} that is {from}")]
pub struct TransitionError {
    pub aggregate: &'static str,
    pub from: &'static str,
    pub event: &'static str,
}

// ═══════════════════════════════════════════
// TOP-LEVEL ERROR
// ═══════════════════════════════════════════

/// All errors surfaced by the crate
#[derive(Debug, Error)]
pub enum GateError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    BusinessRule(#[from] BusinessRuleViolation),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("[FLOW-090] IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("[FLOW-091] JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("[FLOW-092] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("[FLOW-093] Invalid configuration: {details}")]
    Config { details: String },

    #[error("[FLOW-094] Unsupported file format: {path}")]
    UnsupportedFormat { path: String },
}

impl GateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Structural(_) => ErrorKind::Structural,
            Self::BusinessRule(_) => ErrorKind::BusinessRule,
            Self::Transition(_) => ErrorKind::Transition,
            _ => ErrorKind::Input,
        }
    }

    /// Operation the error belongs to, if it is a rejection
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Structural(_) => Some(Operation::CreateWorkflow),
            Self::BusinessRule(v) => Some(v.operation),
            Self::Transition(_) => Some(Operation::ChangeStatus),
            _ => None,
        }
    }

    /// Get the error code (e.g., "FLOW-001")
    pub fn code(&self) -> &'static str {
        match self {
            Self::Structural(e) => e.code(),
            Self::BusinessRule(v) => v.code(),
            Self::Transition(_) => "FLOW-030",
            Self::Io(_) => "FLOW-090",
            Self::JsonParse(_) => "FLOW-091",
            Self::YamlParse(_) => "FLOW-092",
            Self::Config { .. } => "FLOW-093",
            Self::UnsupportedFormat { .. } => "FLOW-094",
        }
    }
}

impl FixSuggestion for GateError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            Self::Structural(e) => e.fix_suggestion(),
            Self::BusinessRule(v) => match v.kind {
                ViolationKind::ResourceLimit { .. } => {
                    Some("Remove unused resources or upgrade to the premium plan")
                }
                ViolationKind::OperationNotAllowed => None,
            },
            Self::Transition(_) => Some("Check the current status before requesting the change"),
            Self::Io(_) => Some("Check file path and permissions"),
            Self::JsonParse(_) => Some("Check JSON syntax"),
            Self::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            Self::Config { .. } => Some("Check the rules file against `flowgate rules` output"),
            Self::UnsupportedFormat { .. } => Some("Use a .json, .yaml or .yml file"),
        }
    }
}
