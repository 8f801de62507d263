//! In-memory collaborators backed by DashMap
//!
//! One store implements user lookup, keyed counters and the workflow
//! repository. Cloning shares the underlying maps.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::collaborators::{
    NewWorkflow, QuotaCounter, StoredWorkflow, User, UserDirectory, WorkflowRepository,
};

/// Seed data for a store (fixtures.yaml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub users: Vec<User>,
    /// Workflows already owned per user id
    pub workflow_counts: HashMap<String, u32>,
    /// Counter values per key
    pub counters: HashMap<String, u32>,
}

impl Fixtures {
    /// Parse YAML (or JSON, which YAML accepts)
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, crate::errors::GateError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixtures from {:?}", path))?;
        Self::from_yaml(&text).with_context(|| format!("Failed to parse fixtures file {:?}", path))
    }
}

/// Thread-safe store for users, counters and workflows (lock-free)
#[derive(Clone, Default)]
pub struct InMemoryStore {
    users: Arc<DashMap<String, User>>,
    workflow_counts: Arc<DashMap<String, u32>>,
    workflows: Arc<DashMap<u64, StoredWorkflow>>,
    counters: Arc<DashMap<String, u32>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixtures(fixtures: Fixtures) -> Self {
        let store = Self::new();
        for user in fixtures.users {
            store.add_user(user);
        }
        for (user_id, count) in fixtures.workflow_counts {
            store.set_workflow_count(&user_id, count);
        }
        for (key, value) in fixtures.counters {
            store.counters.insert(key, value);
        }
        store
    }

    pub fn add_user(&self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    /// Pretend a user already owns `count` workflows
    pub fn set_workflow_count(&self, user_id: &str, count: u32) {
        self.workflow_counts.insert(user_id.to_string(), count);
    }

    pub fn get_workflow(&self, id: u64) -> Option<StoredWorkflow> {
        self.workflows.get(&id).map(|w| w.clone())
    }

    pub fn workflow_count(&self) -> usize {
        self.workflows.len()
    }
}

impl UserDirectory for InMemoryStore {
    fn find_user_by_id(&self, id: &str) -> Option<User> {
        self.users.get(id).map(|u| u.clone())
    }
}

impl QuotaCounter for InMemoryStore {
    fn get_count(&self, key: &str) -> u32 {
        self.counters.get(key).map(|c| *c).unwrap_or(0)
    }

    fn increment(&self, key: &str) -> u32 {
        let mut entry = self.counters.entry(key.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }
}

impl WorkflowRepository for InMemoryStore {
    fn count_by_user(&self, user_id: &str) -> u32 {
        self.workflow_counts.get(user_id).map(|c| *c).unwrap_or(0)
    }

    fn save(&self, workflow: NewWorkflow) -> StoredWorkflow {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        *self
            .workflow_counts
            .entry(workflow.user_id.clone())
            .or_insert(0) += 1;

        let stored = StoredWorkflow { id, workflow };
        self.workflows.insert(id, stored.clone());
        stored
    }
}
