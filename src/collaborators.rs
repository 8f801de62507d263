//! Collaborator interfaces consumed by the gate and the handlers
//!
//! Persistence, user lookup and counters live outside this crate. These traits
//! are the seams; `datastore` has in-memory implementations.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::rules::Plan;
use crate::workflow::ValidatedWorkflow;

/// A user as seen by the gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub plan: Plan,
}

impl User {
    pub fn new(id: impl Into<String>, plan: Plan) -> Self {
        Self {
            id: id.into(),
            plan,
        }
    }
}

pub trait UserDirectory: Send + Sync {
    fn find_user_by_id(&self, id: &str) -> Option<User>;
}

/// Keyed counters (e.g. daily report generations)
pub trait QuotaCounter: Send + Sync {
    fn get_count(&self, key: &str) -> u32;

    /// Increment and return the new count
    fn increment(&self, key: &str) -> u32;
}

/// Workflow accepted by the handler, ready to persist
#[derive(Debug, Clone, Serialize)]
pub struct NewWorkflow {
    pub name: String,
    pub description: Option<String>,
    pub user_id: String,
    pub status: WorkflowStatus,
    pub complexity_score: u32,
    pub definition: ValidatedWorkflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Draft,
}

/// Workflow as returned by the repository
#[derive(Debug, Clone, Serialize)]
pub struct StoredWorkflow {
    pub id: u64,
    #[serde(flatten)]
    pub workflow: NewWorkflow,
}

pub trait WorkflowRepository: Send + Sync {
    fn count_by_user(&self, user_id: &str) -> u32;

    fn save(&self, workflow: NewWorkflow) -> StoredWorkflow;
}

/// Source of "today" for date-range checks
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock, UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Fixed date, for tests and dry runs
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
