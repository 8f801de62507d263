//! Request handlers
//!
//! Orchestrate gate, validator and collaborators for one request, and record
//! the outcome in the activity log.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::collaborators::{
    Clock, NewWorkflow, QuotaCounter, StoredWorkflow, UserDirectory, WorkflowRepository,
    WorkflowStatus,
};
use crate::errors::{GateError, Operation, Result};
use crate::event_log::{ActivityKind, ActivityLog};
use crate::gate::{BusinessRuleGate, WorkflowRequest};
use crate::lifecycle::StateMachine;
use crate::report::{self, Granularity, ReportKind, ReportRequest};
use crate::validator::validate_structure;

fn record_rejection(activity: &ActivityLog, operation: Operation, error: &GateError) {
    tracing::warn!(operation = %operation, code = error.code(), "{}", error);
    activity.record(ActivityKind::RequestRejected {
        operation,
        error_kind: error.kind(),
        code: error.code(),
        message: error.to_string(),
    });
}

// ═══════════════════════════════════════════
// WORKFLOW CREATION
// ═══════════════════════════════════════════

/// A persisted workflow plus its complexity flag
#[derive(Debug, Clone, Serialize)]
pub struct CreatedWorkflow {
    #[serde(flatten)]
    pub workflow: StoredWorkflow,
    pub is_complex: bool,
}

pub struct CreateWorkflowHandler {
    gate: Arc<BusinessRuleGate>,
    users: Arc<dyn UserDirectory>,
    workflows: Arc<dyn WorkflowRepository>,
    activity: ActivityLog,
}

impl CreateWorkflowHandler {
    pub fn new(
        gate: Arc<BusinessRuleGate>,
        users: Arc<dyn UserDirectory>,
        workflows: Arc<dyn WorkflowRepository>,
        activity: ActivityLog,
    ) -> Self {
        Self {
            gate,
            users,
            workflows,
            activity,
        }
    }

    /// Gate, validate, normalize, score and save a new workflow
    pub fn handle(&self, request: WorkflowRequest) -> Result<CreatedWorkflow> {
        self.create(request).map_err(|error| {
            record_rejection(&self.activity, Operation::CreateWorkflow, &error);
            error
        })
    }

    fn create(&self, request: WorkflowRequest) -> Result<CreatedWorkflow> {
        let user = self.gate.check_workflow_creation(
            &request,
            self.users.as_ref(),
            self.workflows.as_ref(),
        )?;
        let definition = validate_structure(&request.structure)?;

        let complexity_score = definition.complexity_score();
        let is_complex = complexity_score > self.gate.rules().workflow.complex_threshold;

        let stored = self.workflows.save(NewWorkflow {
            name: request.name.trim().to_string(),
            description: request.description,
            user_id: user.id,
            status: WorkflowStatus::Draft,
            complexity_score,
            definition,
        });

        tracing::info!(
            workflow_id = stored.id,
            user_id = %stored.workflow.user_id,
            complexity_score,
            is_complex,
            "workflow created"
        );
        self.activity.record(ActivityKind::WorkflowCreated {
            workflow_id: stored.id,
            user_id: stored.workflow.user_id.clone(),
            complexity_score,
            is_complex,
        });

        Ok(CreatedWorkflow {
            workflow: stored,
            is_complex,
        })
    }
}

// ═══════════════════════════════════════════
// REPORT GENERATION
// ═══════════════════════════════════════════

/// An approved report request, enriched for the report builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportOutcome {
    pub user_id: String,
    pub report_type: ReportKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub range_days: i64,
    pub granularity: Granularity,
    pub complexity_score: u32,
    /// Reports generated by the user today, this one included
    pub generated_today: u32,
}

pub struct GenerateReportHandler {
    gate: Arc<BusinessRuleGate>,
    users: Arc<dyn UserDirectory>,
    counter: Arc<dyn QuotaCounter>,
    clock: Arc<dyn Clock>,
    activity: ActivityLog,
}

impl GenerateReportHandler {
    pub fn new(
        gate: Arc<BusinessRuleGate>,
        users: Arc<dyn UserDirectory>,
        counter: Arc<dyn QuotaCounter>,
        clock: Arc<dyn Clock>,
        activity: ActivityLog,
    ) -> Self {
        Self {
            gate,
            users,
            counter,
            clock,
            activity,
        }
    }

    /// Gate the request and count it against the daily quota
    pub fn handle(&self, request: ReportRequest) -> Result<ReportOutcome> {
        self.generate(request).map_err(|error| {
            record_rejection(&self.activity, Operation::GenerateAnalyticsReport, &error);
            error
        })
    }

    fn generate(&self, request: ReportRequest) -> Result<ReportOutcome> {
        let today = self.clock.today();
        let approved = self.gate.check_report_generation(
            &request,
            self.users.as_ref(),
            self.counter.as_ref(),
            today,
        )?;
        let generated_today = self.counter.increment(&approved.quota_key);

        let outcome = ReportOutcome {
            user_id: approved.user.id,
            report_type: approved.kind,
            start_date: request.start_date,
            end_date: request.end_date,
            range_days: approved.range_days,
            granularity: Granularity::for_range(approved.range_days),
            complexity_score: report::complexity_score(
                approved.kind,
                approved.range_days,
                request.filters.len(),
            ),
            generated_today,
        };

        tracing::info!(
            user_id = %outcome.user_id,
            report_type = %outcome.report_type,
            range_days = outcome.range_days,
            generated_today,
            "report approved"
        );
        self.activity.record(ActivityKind::ReportApproved {
            user_id: outcome.user_id.clone(),
            report_type: outcome.report_type.to_string(),
            range_days: outcome.range_days,
        });

        Ok(outcome)
    }
}

// ═══════════════════════════════════════════
// STATUS CHANGES
// ═══════════════════════════════════════════

/// Apply an event to an aggregate's status and record the change
pub fn change_status<S: StateMachine>(
    current: S,
    event: S::Event,
    activity: &ActivityLog,
) -> Result<S> {
    match current.apply(event) {
        Ok(next) => {
            tracing::info!(aggregate = S::AGGREGATE, from = current.name(), to = next.name(), "status changed");
            activity.record(ActivityKind::StatusChanged {
                aggregate: S::AGGREGATE,
                from: current.name(),
                to: next.name(),
            });
            Ok(next)
        }
        Err(error) => {
            let error = GateError::from(error);
            record_rejection(activity, Operation::ChangeStatus, &error);
            Err(error)
        }
    }
}
