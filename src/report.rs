//! Analytics report requests
//!
//! Report kinds are a closed set. Granularity and complexity are derived from
//! the requested date range and filters.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Traffic,
    Conversions,
    Revenue,
    AdsPerformance,
    SocialMedia,
    EmailMarketing,
    Custom,
    Dashboard,
}

impl ReportKind {
    pub const ALL: [ReportKind; 8] = [
        ReportKind::Traffic,
        ReportKind::Conversions,
        ReportKind::Revenue,
        ReportKind::AdsPerformance,
        ReportKind::SocialMedia,
        ReportKind::EmailMarketing,
        ReportKind::Custom,
        ReportKind::Dashboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Traffic => "traffic",
            ReportKind::Conversions => "conversions",
            ReportKind::Revenue => "revenue",
            ReportKind::AdsPerformance => "ads_performance",
            ReportKind::SocialMedia => "social_media",
            ReportKind::EmailMarketing => "email_marketing",
            ReportKind::Custom => "custom",
            ReportKind::Dashboard => "dashboard",
        }
    }

    /// Base complexity points for the kind
    fn base_score(&self) -> u32 {
        match self {
            ReportKind::Traffic => 10,
            ReportKind::Conversions | ReportKind::EmailMarketing => 15,
            ReportKind::Dashboard | ReportKind::SocialMedia => 20,
            ReportKind::Revenue => 25,
            ReportKind::AdsPerformance => 30,
            ReportKind::Custom => 40,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or(())
    }
}

/// Bucket size for report data points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Hour,
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn for_range(days: i64) -> Self {
        if days <= 7 {
            Granularity::Hour
        } else if days <= 30 {
            Granularity::Day
        } else if days <= 90 {
            Granularity::Week
        } else {
            Granularity::Month
        }
    }
}

/// Report generation request as submitted by a client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportRequest {
    pub report_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub filters: Map<String, Value>,
}

/// `kind base + min(days / 10, 20) + 2 per filter`
pub fn complexity_score(kind: ReportKind, range_days: i64, filter_count: usize) -> u32 {
    let range_points = (range_days.max(0) / 10).min(20) as u32;
    kind.base_score() + range_points + filter_count as u32 * 2
}
