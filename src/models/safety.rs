//! Safety incident records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncidentSeverity {
    #[default]
    NearMiss,
    Minor,
    Major,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Open,
    Investigating,
    Closed,
    /// Generated by automation and awaiting human review.
    Draft,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub title: String,
    pub location: String,
    pub description: String,
    pub severity: IncidentSeverity,
    pub date: NaiveDate,
    pub status: IncidentStatus,
    pub reported_by: String,
    /// Set on system-generated drafts.
    #[serde(default)]
    pub is_automated: bool,
}

/// DTO for reporting an incident directly. Id, date and status are assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIncident {
    pub title: String,
    pub location: String,
    pub description: String,
    pub severity: IncidentSeverity,
    pub reported_by: String,
}

/// Partial incident produced by automation. Missing fields get defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncidentDraft {
    pub title: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub severity: Option<IncidentSeverity>,
    pub date: Option<NaiveDate>,
    pub reported_by: Option<String>,
}

/// DTO for updating an incident.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncidentPatch {
    pub title: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub severity: Option<IncidentSeverity>,
    pub date: Option<NaiveDate>,
    pub status: Option<IncidentStatus>,
    pub reported_by: Option<String>,
}

impl IncidentPatch {
    pub fn apply_to(self, incident: &mut Incident) {
        if let Some(title) = self.title {
            incident.title = title;
        }
        if let Some(location) = self.location {
            incident.location = location;
        }
        if let Some(description) = self.description {
            incident.description = description;
        }
        if let Some(severity) = self.severity {
            incident.severity = severity;
        }
        if let Some(date) = self.date {
            incident.date = date;
        }
        if let Some(status) = self.status {
            incident.status = status;
        }
        if let Some(reported_by) = self.reported_by {
            incident.reported_by = reported_by;
        }
    }
}
