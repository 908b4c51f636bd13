//! Safety incident store.
//!
//! Incidents reported by people start open. Automation files drafts
//! (`isAutomated`), which a person later completes with [`SafetyModel::submit_draft`].

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::ids::{IdIssuer, IdKind, max_sequence};
use crate::models::{Incident, IncidentDraft, IncidentPatch, IncidentSeverity, IncidentStatus, NewIncident};
use crate::seed;
use crate::state::Observable;

/// Reporter recorded on drafts filed by automation.
pub const AUTOMATION_REPORTER: &str = "System Automation";
/// Title given to drafts filed without one.
pub const UNTITLED_INCIDENT: &str = "Untitled Incident";

pub struct SafetyModel {
    incidents: Observable<Vec<Incident>>,
    ids: Arc<IdIssuer>,
    clock: Arc<dyn Clock>,
}

impl SafetyModel {
    pub fn new(ids: Arc<IdIssuer>, clock: Arc<dyn Clock>) -> Self {
        Self::with_records(seed::incidents(), ids, clock)
    }

    pub fn with_records(incidents: Vec<Incident>, ids: Arc<IdIssuer>, clock: Arc<dyn Clock>) -> Self {
        // Seeded incidents carry bare numbers; only prefixed ids share a sequence.
        for kind in [IdKind::Incident, IdKind::IncidentDraft] {
            let prefix = format!("{}-", kind.prefix());
            let used = max_sequence(incidents.iter().map(|i| i.id.as_str()).filter(|id| id.starts_with(&prefix)));
            ids.reserve_through(kind, used);
        }
        Self {
            incidents: Observable::new(incidents),
            ids,
            clock,
        }
    }

    pub fn incidents(&self) -> Vec<Incident> {
        self.incidents.get()
    }

    /// Drafts awaiting review.
    pub fn drafts(&self) -> Vec<Incident> {
        self.incidents.with(|list| {
            list.iter()
                .filter(|i| i.status == IncidentStatus::Draft)
                .cloned()
                .collect()
        })
    }

    pub fn get(&self, id: &str) -> Option<Incident> {
        self.incidents.with(|list| list.iter().find(|i| i.id == id).cloned())
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Incident>> {
        self.incidents.subscribe()
    }

    /// Report an incident, open from today.
    pub fn add_incident(&self, new: NewIncident) -> String {
        let id = self.ids.next_long(IdKind::Incident);
        let incident = Incident {
            id: id.clone(),
            title: new.title,
            location: new.location,
            description: new.description,
            severity: new.severity,
            date: self.clock.today(),
            status: IncidentStatus::Open,
            reported_by: new.reported_by,
            is_automated: false,
        };

        info!("Incident {} reported: {}", id, incident.title);
        self.incidents.update(|list| list.insert(0, incident));
        id
    }

    /// File an automation draft. Fields left empty get defaults.
    pub fn add_draft(&self, draft: IncidentDraft) -> String {
        let id = self.ids.next_long(IdKind::IncidentDraft);
        let incident = Incident {
            id: id.clone(),
            title: draft.title.unwrap_or_else(|| UNTITLED_INCIDENT.to_string()),
            location: draft.location.unwrap_or_default(),
            description: draft.description.unwrap_or_default(),
            severity: draft.severity.unwrap_or(IncidentSeverity::NearMiss),
            date: draft.date.unwrap_or_else(|| self.clock.today()),
            status: IncidentStatus::Draft,
            reported_by: draft.reported_by.unwrap_or_else(|| AUTOMATION_REPORTER.to_string()),
            is_automated: true,
        };

        info!("Incident draft {} filed by automation", id);
        self.incidents.update(|list| list.insert(0, incident));
        id
    }

    pub fn update_incident(&self, id: &str, patch: IncidentPatch) -> bool {
        let changed = self.modify(id, |inc| patch.apply_to(inc));
        debug!("Incident {} update applied: {}", id, changed);
        changed
    }

    /// Complete a draft: merge `patch`, open it, and drop the automation flag.
    pub fn submit_draft(&self, id: &str, patch: IncidentPatch) -> bool {
        let changed = self.modify(id, |inc| {
            patch.apply_to(inc);
            inc.status = IncidentStatus::Open;
            inc.is_automated = false;
        });
        if changed {
            info!("Incident draft {} submitted", id);
        }
        changed
    }

    pub fn resolve_incident(&self, id: &str) -> bool {
        let changed = self.modify(id, |inc| inc.status = IncidentStatus::Closed);
        if changed {
            info!("Incident {} closed", id);
        }
        changed
    }

    fn modify(&self, id: &str, f: impl FnOnce(&mut Incident)) -> bool {
        self.incidents.update_if(|list| match list.iter_mut().find(|i| i.id == id) {
            Some(inc) => {
                f(inc);
                true
            }
            None => false,
        })
    }
}
