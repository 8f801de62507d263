//! Flowgate - workflow definition validation and business-rule gates
//!
//! - `validator`: structural checks and reachability for workflow graphs
//! - `gate`: plan quotas, field bounds and report date windows
//! - `lifecycle`: campaign and chat status transition tables
//! - `handler`: request orchestration over the collaborator traits

pub mod collaborators;
pub mod datastore;
pub mod errors;
pub mod event_log;
pub mod flow_graph;
pub mod gate;
pub mod handler;
pub mod lifecycle;
pub mod output_policy;
pub mod report;
pub mod rules;
pub mod validator;
pub mod validators;
pub mod workflow;

pub use collaborators::{
    Clock, FixedClock, QuotaCounter, SystemClock, User, UserDirectory, WorkflowRepository,
};
pub use datastore::{Fixtures, InMemoryStore};
pub use errors::{
    BusinessRuleViolation, ErrorKind, FixSuggestion, GateError, Operation, StructuralError,
    TransitionError, ViolationKind,
};
pub use event_log::{Activity, ActivityKind, ActivityLog};
pub use flow_graph::FlowGraph;
pub use gate::{BusinessRuleGate, WorkflowRequest};
pub use handler::{change_status, CreateWorkflowHandler, GenerateReportHandler};
pub use lifecycle::{CampaignEvent, CampaignState, ChatEvent, ChatState, StateMachine};
pub use output_policy::OutputFormat;
pub use report::{Granularity, ReportKind, ReportRequest};
pub use rules::{GateRules, Plan};
pub use validator::{validate_structure, ValidationReport, Validator};
pub use workflow::{ValidatedWorkflow, WorkflowDefinition};
