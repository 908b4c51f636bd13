//! Central id-issuing service.
//!
//! Every model draws record ids from one shared [`IdIssuer`]. Each kind has
//! its own monotonic sequence, seeded past the ids already present in the
//! initial data, so an id is never handed out twice within a process.

use std::collections::HashMap;
use std::sync::Mutex;

/// Kinds of records that receive generated ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Document,
    Revision,
    NonConformity,
    Incident,
    IncidentDraft,
    Booking,
    Board,
    Column,
    Task,
    Comment,
}

impl IdKind {
    /// Prefix used when formatting ids of this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            IdKind::Document => "DOC",
            IdKind::Revision => "REV",
            IdKind::NonConformity => "NC",
            IdKind::Incident => "INC",
            IdKind::IncidentDraft => "DRAFT",
            IdKind::Booking => "BKG",
            IdKind::Board => "BRD",
            IdKind::Column => "COL",
            IdKind::Task => "TASK",
            IdKind::Comment => "CMT",
        }
    }
}

/// Per-kind sequence counters.
#[derive(Debug, Default)]
pub struct IdIssuer {
    counters: Mutex<HashMap<IdKind, u64>>,
}

impl IdIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next sequence number for `kind`, starting at 1.
    pub fn next(&self, kind: IdKind) -> u64 {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        let counter = counters.entry(kind).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Make sure the next number for `kind` is greater than `used`.
    pub fn reserve_through(&self, kind: IdKind, used: u64) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        let counter = counters.entry(kind).or_insert(0);
        if *counter < used {
            *counter = used;
        }
    }

    /// `PREFIX-YEAR-NNN`, e.g. `DOC-2026-011`.
    pub fn next_dated(&self, kind: IdKind, year: i32) -> String {
        let n = self.next(kind);
        format!("{prefix}-{year}-{n:03}", prefix = kind.prefix())
    }

    /// `PREFIX-NNN`, e.g. `REV-009`.
    pub fn next_short(&self, kind: IdKind) -> String {
        let n = self.next(kind);
        format!("{prefix}-{n:03}", prefix = kind.prefix())
    }

    /// `PREFIX-NNNN`, e.g. `INC-0003`.
    pub fn next_long(&self, kind: IdKind) -> String {
        let n = self.next(kind);
        format!("{prefix}-{n:04}", prefix = kind.prefix())
    }
}

/// Trailing sequence number of an id such as `DOC-2024-007` or `REV-008`.
pub fn sequence_of(id: &str) -> Option<u64> {
    id.rsplit('-').next()?.parse().ok()
}

/// Highest trailing sequence number among `ids`, or 0.
pub fn max_sequence<'a>(ids: impl IntoIterator<Item = &'a str>) -> u64 {
    ids.into_iter().filter_map(sequence_of).max().unwrap_or(0)
}
