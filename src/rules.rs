//! Rule loading from YAML files
//!
//! Plan quotas, field bounds and report windows are configuration, not
//! mechanism. Every field has a default, so a rules file only needs to name
//! what it overrides.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::GateError;

/// Subscription plan of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Regular,
    Premium,
}

/// A limit that depends on the caller's plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimit {
    pub regular: u32,
    pub premium: u32,
}

impl PlanLimit {
    pub fn for_plan(&self, plan: Plan) -> u32 {
        match plan {
            Plan::Regular => self.regular,
            Plan::Premium => self.premium,
        }
    }
}

/// Inclusive character-count bounds for a text field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    #[serde(default)]
    pub min: usize,
    pub max: usize,
}

impl LengthBounds {
    pub fn contains(&self, len: usize) -> bool {
        (self.min..=self.max).contains(&len)
    }
}

/// Rules for workflow creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowRules {
    pub name: LengthBounds,
    pub description: LengthBounds,
    pub max_workflows: PlanLimit,
    /// Workflows scoring above this are flagged as complex
    pub complex_threshold: u32,
}

impl Default for WorkflowRules {
    fn default() -> Self {
        Self {
            name: LengthBounds { min: 3, max: 100 },
            description: LengthBounds { min: 0, max: 500 },
            max_workflows: PlanLimit {
                regular: 10,
                premium: 50,
            },
            complex_threshold: 50,
        }
    }
}

/// Rules for analytics report generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportRules {
    pub max_reports_per_day: PlanLimit,
    /// Widest allowed date range, in days, unless overridden per kind
    pub max_range_days: i64,
    /// Per-kind overrides of `max_range_days`, keyed by report kind
    pub range_overrides: HashMap<String, i64>,
}

impl Default for ReportRules {
    fn default() -> Self {
        Self {
            max_reports_per_day: PlanLimit {
                regular: 20,
                premium: 100,
            },
            max_range_days: 365,
            range_overrides: HashMap::from([("dashboard".to_string(), 30)]),
        }
    }
}

impl ReportRules {
    pub fn max_range_for(&self, kind: &str) -> i64 {
        self.range_overrides
            .get(kind)
            .copied()
            .unwrap_or(self.max_range_days)
    }
}

/// Complete rule set (from rules.yaml)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateRules {
    pub workflow: WorkflowRules,
    pub report: ReportRules,
}

impl GateRules {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, GateError> {
        let rules: GateRules = serde_yaml::from_str(yaml)?;
        rules.check()?;
        Ok(rules)
    }

    /// Load from a rules file
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules from {:?}", path))?;
        let rules = Self::from_yaml(&yaml)
            .with_context(|| format!("Failed to parse rules file {:?}", path))?;
        tracing::debug!(path = %path.display(), "loaded gate rules");
        Ok(rules)
    }

    /// Load from a file when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml(&self) -> std::result::Result<String, GateError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject rule sets that could never accept anything
    fn check(&self) -> std::result::Result<(), GateError> {
        let name = self.workflow.name;
        if name.min > name.max {
            return Err(GateError::Config {
                details: format!("workflow.name.min ({}) exceeds max ({})", name.min, name.max),
            });
        }
        if self.report.max_range_days < 0
            || self.report.range_overrides.values().any(|d| *d < 0)
        {
            return Err(GateError::Config {
                details: "report range limits must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_plan_quotas() {
        let rules = GateRules::default();
        assert_eq!(rules.workflow.max_workflows.for_plan(Plan::Regular), 10);
        assert_eq!(rules.workflow.max_workflows.for_plan(Plan::Premium), 50);
        assert_eq!(rules.report.max_reports_per_day.for_plan(Plan::Regular), 20);
        assert_eq!(rules.report.max_reports_per_day.for_plan(Plan::Premium), 100);
        assert_eq!(rules.report.max_range_for("dashboard"), 30);
        assert_eq!(rules.report.max_range_for("traffic"), 365);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let rules = GateRules::from_yaml(
            r#"
workflow:
  max_workflows:
    regular: 3
    premium: 30
"#,
        )
        .unwrap();

        assert_eq!(rules.workflow.max_workflows.regular, 3);
        assert_eq!(rules.workflow.name, LengthBounds { min: 3, max: 100 });
        assert_eq!(rules.report, ReportRules::default());
    }

    #[test]
    fn test_range_overrides_replace_map() {
        let rules = GateRules::from_yaml(
            r#"
report:
  max_range_days: 90
  range_overrides:
    revenue: 31
"#,
        )
        .unwrap();

        assert_eq!(rules.report.max_range_for("revenue"), 31);
        assert_eq!(rules.report.max_range_for("dashboard"), 90);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = GateRules::from_yaml(
            r#"
workflow:
  name:
    min: 10
    max: 5
"#,
        )
        .unwrap_err();
        assert!(matches!(err, GateError::Config { .. }));
    }

    #[test]
    fn test_yaml_roundtrip_of_defaults() {
        let yaml = GateRules::default().to_yaml().unwrap();
        assert!(yaml.contains("complex_threshold: 50"));
        assert_eq!(GateRules::from_yaml(&yaml).unwrap(), GateRules::default());
    }

    #[test]
    fn test_length_bounds() {
        let bounds = LengthBounds { min: 3, max: 5 };
        assert!(!bounds.contains(2));
        assert!(bounds.contains(3));
        assert!(bounds.contains(5));
        assert!(!bounds.contains(6));
    }
}
