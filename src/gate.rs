//! Business rule gate
//!
//! Independent precondition checks run before a workflow or report is
//! created. Checks run in a fixed order and the first failure is reported.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::collaborators::{QuotaCounter, User, UserDirectory, WorkflowRepository};
use crate::errors::{BusinessRuleViolation, Operation};
use crate::report::{ReportKind, ReportRequest};
use crate::rules::GateRules;
use crate::workflow::WorkflowDefinition;

type GateResult<T> = Result<T, BusinessRuleViolation>;

/// Workflow creation request as submitted by a client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub user_id: String,
    pub structure: WorkflowDefinition,
}

/// A report request that passed every rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedReport {
    pub user: User,
    pub kind: ReportKind,
    pub range_days: i64,
    /// Counter key to increment once the report is produced
    pub quota_key: String,
}

/// Counter key for a user's report generations on one day
pub fn report_quota_key(user_id: &str, day: NaiveDate) -> String {
    format!("report_generation:{}:{}", user_id, day.format("%Y-%m-%d"))
}

/// Precondition checks backed by a rule set
#[derive(Debug, Clone, Default)]
pub struct BusinessRuleGate {
    rules: GateRules,
}

impl BusinessRuleGate {
    pub fn new(rules: GateRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &GateRules {
        &self.rules
    }

    // ═══════════════════════════════════════════
    // FIELD CHECKS
    // ═══════════════════════════════════════════

    pub fn check_name(&self, name: &str) -> GateResult<()> {
        let bounds = self.rules.workflow.name;
        let len = name.trim().chars().count();
        if len < bounds.min {
            return Err(BusinessRuleViolation::operation_not_allowed(
                Operation::CreateWorkflow,
                format!("Name must have at least {} characters", bounds.min),
            ));
        }
        if len > bounds.max {
            return Err(BusinessRuleViolation::operation_not_allowed(
                Operation::CreateWorkflow,
                format!("Name cannot exceed {} characters", bounds.max),
            ));
        }
        Ok(())
    }

    pub fn check_description(&self, description: Option<&str>) -> GateResult<()> {
        let bounds = self.rules.workflow.description;
        match description {
            Some(text) if !bounds.contains(text.chars().count()) => {
                Err(BusinessRuleViolation::operation_not_allowed(
                    Operation::CreateWorkflow,
                    format!("Description cannot exceed {} characters", bounds.max),
                ))
            }
            _ => Ok(()),
        }
    }

    /// The referenced user must be given and must exist
    pub fn resolve_user(
        &self,
        operation: Operation,
        user_id: &str,
        users: &dyn UserDirectory,
    ) -> GateResult<User> {
        if user_id.trim().is_empty() {
            return Err(BusinessRuleViolation::operation_not_allowed(
                operation,
                "User ID is required",
            ));
        }
        users.find_user_by_id(user_id).ok_or_else(|| {
            BusinessRuleViolation::operation_not_allowed(operation, "User not found")
        })
    }

    // ═══════════════════════════════════════════
    // QUOTA CHECKS
    // ═══════════════════════════════════════════

    pub fn check_workflow_quota(
        &self,
        user: &User,
        workflows: &dyn WorkflowRepository,
    ) -> GateResult<()> {
        let limit = self.rules.workflow.max_workflows.for_plan(user.plan);
        let count = workflows.count_by_user(&user.id);
        if count >= limit {
            return Err(BusinessRuleViolation::resource_limit(
                Operation::CreateWorkflow,
                "workflows",
                limit,
            ));
        }
        Ok(())
    }

    /// Returns the counter key that the caller increments on success
    pub fn check_report_quota(
        &self,
        user: &User,
        counter: &dyn QuotaCounter,
        today: NaiveDate,
    ) -> GateResult<String> {
        let limit = self.rules.report.max_reports_per_day.for_plan(user.plan);
        let key = report_quota_key(&user.id, today);
        if counter.get_count(&key) >= limit {
            return Err(BusinessRuleViolation::resource_limit(
                Operation::GenerateAnalyticsReport,
                "reports per day",
                limit,
            ));
        }
        Ok(key)
    }

    // ═══════════════════════════════════════════
    // REPORT CHECKS
    // ═══════════════════════════════════════════

    pub fn check_report_kind(&self, report_type: &str) -> GateResult<ReportKind> {
        report_type.parse().map_err(|_| {
            BusinessRuleViolation::operation_not_allowed(
                Operation::GenerateAnalyticsReport,
                format!("Invalid report type: {report_type}"),
            )
        })
    }

    /// `start <= end <= today` and the range fits the kind's window.
    /// Returns the range length in days.
    pub fn check_report_range(
        &self,
        kind: ReportKind,
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> GateResult<i64> {
        let reject = |message: String| {
            BusinessRuleViolation::operation_not_allowed(Operation::GenerateAnalyticsReport, message)
        };

        if start > end {
            return Err(reject("Start date cannot be after end date".to_string()));
        }
        if end > today {
            return Err(reject("Date range cannot extend into the future".to_string()));
        }

        let days = (end - start).num_days();
        let max_days = self.rules.report.max_range_for(kind.as_str());
        if days > max_days {
            return Err(reject(format!("Maximum allowed range: {max_days} days")));
        }
        Ok(days)
    }

    // ═══════════════════════════════════════════
    // COMPOSED GATES
    // ═══════════════════════════════════════════

    /// All workflow-creation rules, in order. Returns the resolved owner.
    pub fn check_workflow_creation(
        &self,
        request: &WorkflowRequest,
        users: &dyn UserDirectory,
        workflows: &dyn WorkflowRepository,
    ) -> GateResult<User> {
        self.check_name(&request.name)?;
        self.check_description(request.description.as_deref())?;
        let user = self.resolve_user(Operation::CreateWorkflow, &request.user_id, users)?;
        self.check_workflow_quota(&user, workflows)?;
        Ok(user)
    }

    /// All report-generation rules, in order
    pub fn check_report_generation(
        &self,
        request: &ReportRequest,
        users: &dyn UserDirectory,
        counter: &dyn QuotaCounter,
        today: NaiveDate,
    ) -> GateResult<ApprovedReport> {
        let kind = self.check_report_kind(&request.report_type)?;
        let range_days =
            self.check_report_range(kind, request.start_date, request.end_date, today)?;
        let user = self.resolve_user(
            Operation::GenerateAnalyticsReport,
            &request.user_id,
            users,
        )?;
        let quota_key = self.check_report_quota(&user, counter, today)?;
        Ok(ApprovedReport {
            user,
            kind,
            range_days,
            quota_key,
        })
    }
}
