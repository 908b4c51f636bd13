//! Quality non-conformity store.

use std::sync::Arc;

use chrono::Datelike;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::ids::{IdIssuer, IdKind, max_sequence};
use crate::models::{NcStatus, NewNonConformity, NonConformity, Resolution};
use crate::seed;
use crate::state::Observable;

pub struct QualityModel {
    records: Observable<Vec<NonConformity>>,
    ids: Arc<IdIssuer>,
    clock: Arc<dyn Clock>,
}

impl QualityModel {
    pub fn new(ids: Arc<IdIssuer>, clock: Arc<dyn Clock>) -> Self {
        Self::with_records(seed::non_conformities(), ids, clock)
    }

    pub fn with_records(records: Vec<NonConformity>, ids: Arc<IdIssuer>, clock: Arc<dyn Clock>) -> Self {
        ids.reserve_through(IdKind::NonConformity, max_sequence(records.iter().map(|nc| nc.id.as_str())));
        Self {
            records: Observable::new(records),
            ids,
            clock,
        }
    }

    pub fn non_conformities(&self) -> Vec<NonConformity> {
        self.records.get()
    }

    pub fn get(&self, id: &str) -> Option<NonConformity> {
        self.records.with(|ncs| ncs.iter().find(|nc| nc.id == id).cloned())
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<NonConformity>> {
        self.records.subscribe()
    }

    /// Records that are not closed yet.
    pub fn open_items(&self) -> Vec<NonConformity> {
        self.records.with(|ncs| {
            ncs.iter()
                .filter(|nc| nc.status != NcStatus::Closed)
                .cloned()
                .collect()
        })
    }

    /// Raise a new non-conformity, opened today.
    pub fn add_nc(&self, new: NewNonConformity) -> String {
        let today = self.clock.today();
        let id = self.ids.next_dated(IdKind::NonConformity, today.year());

        let nc = NonConformity {
            id: id.clone(),
            title: new.title,
            description: new.description,
            source: new.source,
            severity: new.severity,
            status: NcStatus::Open,
            date_opened: today,
            assigned_to: new.assigned_to,
        };

        info!("Non-conformity {} raised ({:?}): {}", id, nc.severity, nc.title);
        self.records.update(|ncs| ncs.insert(0, nc));
        id
    }

    /// Move a non-conformity to investigating or closed.
    pub fn resolve_nc(&self, id: &str, resolution: Resolution) -> bool {
        let status = NcStatus::from(resolution);
        let changed = self.records.update_if(|ncs| match ncs.iter_mut().find(|nc| nc.id == id) {
            Some(nc) => {
                nc.status = status;
                true
            }
            None => false,
        });

        if changed {
            info!("Non-conformity {} -> {:?}", id, status);
        } else {
            debug!("Non-conformity {} not found", id);
        }
        changed
    }
}
