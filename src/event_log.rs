//! Activity log for gate decisions
//!
//! - Activity: envelope with sequence id + timestamp + kind
//! - ActivityKind: accepted and rejected requests, status changes
//! - ActivityLog: thread-safe, append-only

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use crate::errors::{ErrorKind, Operation};

/// Single entry in the activity log
#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    /// Monotonic sequence id
    pub id: u64,
    pub recorded_at: DateTime<Utc>,
    pub kind: ActivityKind,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityKind {
    WorkflowCreated {
        workflow_id: u64,
        user_id: String,
        complexity_score: u32,
        is_complex: bool,
    },
    ReportApproved {
        user_id: String,
        report_type: String,
        range_days: i64,
    },
    StatusChanged {
        aggregate: &'static str,
        from: &'static str,
        to: &'static str,
    },
    RequestRejected {
        operation: Operation,
        error_kind: ErrorKind,
        code: &'static str,
        message: String,
    },
}

impl ActivityKind {
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::RequestRejected { .. })
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::WorkflowCreated { user_id, .. } | Self::ReportApproved { user_id, .. } => {
                Some(user_id)
            }
            Self::StatusChanged { .. } | Self::RequestRejected { .. } => None,
        }
    }
}

/// Thread-safe, append-only activity log
#[derive(Clone, Default)]
pub struct ActivityLog {
    entries: Arc<RwLock<Vec<Activity>>>,
    next_id: Arc<AtomicU64>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an activity, returns its id
    pub fn record(&self, kind: ActivityKind) -> u64 {
        // Ids are taken under the write lock so entries stay in id order
        let mut entries = self.entries.write();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        entries.push(Activity {
            id,
            recorded_at: Utc::now(),
            kind,
        });
        id
    }

    pub fn entries(&self) -> Vec<Activity> {
        self.entries.read().clone()
    }

    pub fn rejections(&self) -> Vec<Activity> {
        self.entries()
            .into_iter()
            .filter(|a| a.kind.is_rejection())
            .collect()
    }

    pub fn for_user(&self, user_id: &str) -> Vec<Activity> {
        self.entries()
            .into_iter()
            .filter(|a| a.kind.user_id() == Some(user_id))
            .collect()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.entries()).unwrap_or(Value::Null)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityLog")
            .field("len", &self.len())
            .finish()
    }
}
