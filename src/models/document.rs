//! Controlled documents (EDMS) and their revision history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of controlled document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "SOP")]
    Sop,
    Protocol,
    #[serde(rename = "Work Instruction")]
    WorkInstruction,
    #[serde(rename = "Safety Data Sheet")]
    SafetyDataSheet,
    #[serde(rename = "Calibration Record")]
    CalibrationRecord,
    Form,
    Certificate,
    Policy,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Sop => "SOP",
            DocumentType::Protocol => "Protocol",
            DocumentType::WorkInstruction => "Work Instruction",
            DocumentType::SafetyDataSheet => "Safety Data Sheet",
            DocumentType::CalibrationRecord => "Calibration Record",
            DocumentType::Form => "Form",
            DocumentType::Certificate => "Certificate",
            DocumentType::Policy => "Policy",
        }
    }
}

/// Workflow status of a document.
///
/// `Superseded` is representable but no workflow operation produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentStatus {
    #[default]
    Draft,
    UnderReview,
    Approved,
    Obsolete,
    Superseded,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::UnderReview => "under-review",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Obsolete => "obsolete",
            DocumentStatus::Superseded => "superseded",
        }
    }

    /// Document is retired and kept only for the audit trail.
    pub fn is_retired(&self) -> bool {
        matches!(self, DocumentStatus::Obsolete | DocumentStatus::Superseded)
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Controlled laboratory document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabDocument {
    /// e.g. `DOC-2024-001`
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    /// e.g. "1.0", "2.3"
    pub version: String,
    pub status: DocumentStatus,
    pub author: String,
    pub reviewer: Option<String>,
    pub approver: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
    pub created_at: NaiveDate,
    pub updated_at: NaiveDate,
    pub effective_date: Option<NaiveDate>,
    pub review_due: Option<NaiveDate>,
}

/// Immutable entry in a document's change history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRevision {
    pub id: String,
    pub document_id: String,
    pub version: String,
    pub changed_by: String,
    pub changed_at: NaiveDate,
    pub summary: String,
}

/// DTO for creating a document. Id, status and dates are assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    pub doc_type: DocumentType,
    pub version: String,
    pub author: String,
    pub reviewer: Option<String>,
    pub approver: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
    pub effective_date: Option<NaiveDate>,
    pub review_due: Option<NaiveDate>,
}

/// DTO for updating a document.
///
/// Status is absent on purpose: it only moves through the workflow methods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub doc_type: Option<DocumentType>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub reviewer: Option<Option<String>>,
    pub approver: Option<Option<String>>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub effective_date: Option<Option<NaiveDate>>,
    pub review_due: Option<Option<NaiveDate>>,
}

impl DocumentPatch {
    /// Apply every field that is set.
    pub fn apply_to(self, doc: &mut LabDocument) {
        if let Some(title) = self.title {
            doc.title = title;
        }
        if let Some(doc_type) = self.doc_type {
            doc.doc_type = doc_type;
        }
        if let Some(version) = self.version {
            doc.version = version;
        }
        if let Some(author) = self.author {
            doc.author = author;
        }
        if let Some(reviewer) = self.reviewer {
            doc.reviewer = reviewer;
        }
        if let Some(approver) = self.approver {
            doc.approver = approver;
        }
        if let Some(description) = self.description {
            doc.description = description;
        }
        if let Some(tags) = self.tags {
            doc.tags = tags;
        }
        if let Some(effective_date) = self.effective_date {
            doc.effective_date = effective_date;
        }
        if let Some(review_due) = self.review_due {
            doc.review_due = review_due;
        }
    }
}
