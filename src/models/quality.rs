//! Quality non-conformity records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a non-conformity was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NcSource {
    Safety,
    Audit,
    Customer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NcSeverity {
    Minor,
    Major,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NcStatus {
    #[default]
    Open,
    Investigating,
    Closed,
}

/// Status a non-conformity can be resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    Investigating,
    #[default]
    Closed,
}

impl From<Resolution> for NcStatus {
    fn from(value: Resolution) -> Self {
        match value {
            Resolution::Investigating => NcStatus::Investigating,
            Resolution::Closed => NcStatus::Closed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonConformity {
    /// e.g. `NC-2026-001`
    pub id: String,
    pub title: String,
    pub description: String,
    pub source: NcSource,
    pub severity: NcSeverity,
    pub status: NcStatus,
    pub date_opened: NaiveDate,
    pub assigned_to: Option<String>,
}

/// DTO for raising a non-conformity. Id, status and date are assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNonConformity {
    pub title: String,
    pub description: String,
    pub source: NcSource,
    pub severity: NcSeverity,
    pub assigned_to: Option<String>,
}
