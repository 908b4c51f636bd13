//! Controlled document store (EDMS).
//!
//! Documents move draft → under-review → approved → obsolete, and
//! "request changes" sends an under-review or approved document back to
//! draft. Every transition stamps `updated_at`. Documents are never deleted.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::clock::{Clock, one_year_after};
use crate::ids::{IdIssuer, IdKind, max_sequence};
use crate::models::{DocumentPatch, DocumentRevision, DocumentStatus, LabDocument, NewDocument};
use crate::seed;
use crate::state::Observable;

/// Observable list of lab documents plus their revision history.
pub struct DocumentControlModel {
    documents: Observable<Vec<LabDocument>>,
    revisions: Observable<Vec<DocumentRevision>>,
    ids: Arc<IdIssuer>,
    clock: Arc<dyn Clock>,
}

impl DocumentControlModel {
    /// Model preloaded with the seed documents.
    pub fn new(ids: Arc<IdIssuer>, clock: Arc<dyn Clock>) -> Self {
        Self::with_records(seed::documents(), seed::revisions(), ids, clock)
    }

    /// Model over the given records. Id sequences are moved past them.
    pub fn with_records(
        documents: Vec<LabDocument>,
        revisions: Vec<DocumentRevision>,
        ids: Arc<IdIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        ids.reserve_through(IdKind::Document, max_sequence(documents.iter().map(|d| d.id.as_str())));
        ids.reserve_through(IdKind::Revision, max_sequence(revisions.iter().map(|r| r.id.as_str())));

        Self {
            documents: Observable::new(documents),
            revisions: Observable::new(revisions),
            ids,
            clock,
        }
    }

    pub fn documents(&self) -> Vec<LabDocument> {
        self.documents.get()
    }

    pub fn revisions(&self) -> Vec<DocumentRevision> {
        self.revisions.get()
    }

    pub fn get(&self, id: &str) -> Option<LabDocument> {
        self.documents.with(|docs| docs.iter().find(|d| d.id == id).cloned())
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<LabDocument>> {
        self.documents.subscribe()
    }

    pub fn subscribe_revisions(&self) -> watch::Receiver<Vec<DocumentRevision>> {
        self.revisions.subscribe()
    }

    /// Create a draft document and return its generated id.
    pub fn add_document(&self, new: NewDocument) -> String {
        let today = self.clock.today();
        let id = self.ids.next_dated(IdKind::Document, today.year());

        let doc = LabDocument {
            id: id.clone(),
            title: new.title,
            doc_type: new.doc_type,
            version: new.version,
            status: DocumentStatus::Draft,
            author: new.author,
            reviewer: new.reviewer,
            approver: new.approver,
            description: new.description,
            tags: new.tags,
            created_at: today,
            updated_at: today,
            effective_date: new.effective_date,
            review_due: new.review_due,
        };

        info!("Document {} created: {}", id, doc.title);
        self.documents.update(|docs| docs.insert(0, doc));
        id
    }

    /// Apply `patch` to a document.
    ///
    /// A non-empty `revision_summary` also records one revision carrying the
    /// updated version and author. Returns false for an unknown id.
    pub fn update_document(&self, id: &str, patch: DocumentPatch, revision_summary: Option<&str>) -> bool {
        let today = self.clock.today();
        let mut revision = None;

        let updated = self.documents.update_if(|docs| {
            let Some(doc) = docs.iter_mut().find(|d| d.id == id) else {
                return false;
            };
            patch.apply_to(doc);
            doc.updated_at = today;

            if let Some(summary) = revision_summary.filter(|s| !s.trim().is_empty()) {
                revision = Some(DocumentRevision {
                    id: self.ids.next_short(IdKind::Revision),
                    document_id: doc.id.clone(),
                    version: doc.version.clone(),
                    changed_by: doc.author.clone(),
                    changed_at: today,
                    summary: summary.to_string(),
                });
            }
            true
        });

        if let Some(rev) = revision {
            info!("Document {} revised to v{} ({})", id, rev.version, rev.id);
            self.revisions.update(|revs| revs.insert(0, rev));
        } else if updated {
            debug!("Document {} updated without revision", id);
        }

        updated
    }

    /// Move a document into review.
    pub fn submit_for_review(&self, id: &str) -> bool {
        self.transition(id, DocumentStatus::UnderReview, |_, _| {})
    }

    /// Approve a document: effective today, due for review in one year.
    pub fn approve(&self, id: &str, approver: &str) -> bool {
        self.transition(id, DocumentStatus::Approved, |doc, today| {
            doc.approver = Some(approver.to_string());
            doc.effective_date = Some(today);
            doc.review_due = Some(one_year_after(today));
        })
    }

    /// Send a document back to draft.
    pub fn request_changes(&self, id: &str) -> bool {
        self.transition(id, DocumentStatus::Draft, |_, _| {})
    }

    /// Retire a document. It stays in the list for the audit trail.
    pub fn mark_obsolete(&self, id: &str) -> bool {
        self.transition(id, DocumentStatus::Obsolete, |_, _| {})
    }

    /// Revisions of one document, newest first.
    pub fn get_revisions(&self, document_id: &str) -> Vec<DocumentRevision> {
        self.revisions.with(|revs| {
            revs.iter()
                .filter(|r| r.document_id == document_id)
                .cloned()
                .collect()
        })
    }

    /// Approved documents whose review is due on or before `on`.
    pub fn due_for_review(&self, on: NaiveDate) -> Vec<LabDocument> {
        self.documents.with(|docs| {
            docs.iter()
                .filter(|d| d.status == DocumentStatus::Approved)
                .filter(|d| d.review_due.is_some_and(|due| due <= on))
                .cloned()
                .collect()
        })
    }

    fn transition(&self, id: &str, to: DocumentStatus, extra: impl FnOnce(&mut LabDocument, NaiveDate)) -> bool {
        let today = self.clock.today();
        let mut from = None;

        let changed = self.documents.update_if(|docs| {
            let Some(doc) = docs.iter_mut().find(|d| d.id == id) else {
                return false;
            };
            from = Some(doc.status);
            doc.status = to;
            doc.updated_at = today;
            extra(doc, today);
            true
        });

        if let Some(from) = from {
            info!("Document {}: {} -> {}", id, from, to);
        } else {
            debug!("Document {} not found, {} ignored", id, to);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::DocumentType;
    use std::collections::HashSet;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn model() -> DocumentControlModel {
        DocumentControlModel::new(Arc::new(IdIssuer::new()), Arc::new(FixedClock::on(today())))
    }

    fn new_doc(title: &str) -> NewDocument {
        NewDocument {
            title: title.to_string(),
            doc_type: DocumentType::Sop,
            version: "1.0".to_string(),
            author: "P. Lambert".to_string(),
            reviewer: None,
            approver: None,
            description: "Draft procedure".to_string(),
            tags: vec!["GC-MS".to_string()],
            effective_date: None,
            review_due: None,
        }
    }

    #[test]
    fn test_add_document_is_draft_with_dated_id() {
        let model = model();
        let id = model.add_document(new_doc("GC-MS SOP"));

        assert_eq!(id, "DOC-2026-011");
        let doc = model.get(&id).unwrap();
        assert_eq!(doc.status, DocumentStatus::Draft);
        assert_eq!(doc.created_at, today());
        assert_eq!(doc.updated_at, today());
        assert_eq!(model.documents()[0].id, id);
    }

    #[test]
    fn test_add_document_never_reuses_ids() {
        let model = model();
        let ids: HashSet<String> = (0..50).map(|i| model.add_document(new_doc(&format!("Doc {i}")))).collect();
        assert_eq!(ids.len(), 50);

        let seeded: HashSet<String> = seed::documents().into_iter().map(|d| d.id).collect();
        assert!(ids.is_disjoint(&seeded));
    }

    #[test]
    fn test_approve_sets_dates() {
        let model = model();
        assert!(model.approve("DOC-2024-003", "Quality Manager"));

        let doc = model.get("DOC-2024-003").unwrap();
        assert_eq!(doc.status, DocumentStatus::Approved);
        assert_eq!(doc.approver.as_deref(), Some("Quality Manager"));
        assert_eq!(doc.effective_date, Some(today()));
        assert_eq!(doc.review_due, NaiveDate::from_ymd_opt(2027, 10, 18));
        assert_eq!(doc.updated_at, today());
    }

    #[test]
    fn test_request_changes_always_yields_draft() {
        let model = model();
        for id in ["DOC-2024-001", "DOC-2024-003", "DOC-2025-005", "DOC-2023-008"] {
            assert!(model.request_changes(id));
            assert_eq!(model.get(id).unwrap().status, DocumentStatus::Draft);
        }
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let model = model();
        let before = model.documents();
        let rx = model.subscribe();

        assert!(!model.request_changes("DOC-1999-999"));
        assert!(!model.approve("DOC-1999-999", "Nobody"));
        assert!(!model.update_document("DOC-1999-999", DocumentPatch::default(), Some("x")));

        assert_eq!(model.documents(), before);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(model.revisions().len(), seed::revisions().len());
    }

    #[test]
    fn test_workflow_round_trip() {
        let model = model();
        let id = model.add_document(new_doc("Waste Segregation SOP"));

        model.submit_for_review(&id);
        assert_eq!(model.get(&id).unwrap().status, DocumentStatus::UnderReview);
        model.request_changes(&id);
        assert_eq!(model.get(&id).unwrap().status, DocumentStatus::Draft);
        model.submit_for_review(&id);
        model.approve(&id, "Lab Director");
        assert_eq!(model.get(&id).unwrap().status, DocumentStatus::Approved);
        model.mark_obsolete(&id);
        assert_eq!(model.get(&id).unwrap().status, DocumentStatus::Obsolete);
    }

    #[test]
    fn test_update_with_summary_appends_one_revision() {
        let model = model();
        let before = model.get_revisions("DOC-2024-002").len();

        let patch = DocumentPatch {
            version: Some("2.2".to_string()),
            ..Default::default()
        };
        assert!(model.update_document("DOC-2024-002", patch, Some("Added HF spill annex.")));

        let revs = model.get_revisions("DOC-2024-002");
        assert_eq!(revs.len(), before + 1);
        let newest = &revs[0];
        assert_eq!(newest.id, "REV-009");
        assert_eq!(newest.document_id, "DOC-2024-002");
        assert_eq!(newest.version, "2.2");
        assert_eq!(newest.changed_by, "Safety Committee");
        assert_eq!(newest.changed_at, today());
    }

    #[test]
    fn test_update_without_summary_appends_nothing() {
        let model = model();
        let total = model.revisions().len();

        let patch = DocumentPatch {
            title: Some("Chemical Spill Protocol".to_string()),
            ..Default::default()
        };
        assert!(model.update_document("DOC-2024-002", patch.clone(), None));
        assert!(model.update_document("DOC-2024-002", patch, Some("   ")));

        assert_eq!(model.revisions().len(), total);
        assert_eq!(model.get("DOC-2024-002").unwrap().title, "Chemical Spill Protocol");
    }

    #[test]
    fn test_get_revisions_filters_by_document() {
        let model = model();
        let revs = model.get_revisions("DOC-2024-001");
        assert_eq!(revs.len(), 3);
        assert!(revs.iter().all(|r| r.document_id == "DOC-2024-001"));
        assert!(model.get_revisions("DOC-2023-008").is_empty());
    }

    #[test]
    fn test_due_for_review() {
        let model = model();
        let due = model.due_for_review(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        let ids: Vec<&str> = due.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["DOC-2024-001"]);
    }

    #[test]
    fn test_subscribers_see_transition() {
        let model = model();
        let mut rx = model.subscribe();
        model.mark_obsolete("DOC-2024-007");

        assert!(rx.has_changed().unwrap());
        let docs = rx.borrow_and_update();
        let doc = docs.iter().find(|d| d.id == "DOC-2024-007").unwrap();
        assert_eq!(doc.status, DocumentStatus::Obsolete);
    }
}
