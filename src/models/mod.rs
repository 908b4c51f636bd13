//! Record types, closed status enums, and create/patch DTOs.

pub mod booking;
pub mod document;
pub mod kanban;
pub mod quality;
pub mod safety;
pub mod user;

pub use booking::{Booking, Category, Instrument, InstrumentStatus, NewBooking, TimeSlot};
pub use document::{DocumentPatch, DocumentRevision, DocumentStatus, DocumentType, LabDocument, NewDocument};
pub use kanban::{Board, Column, ColumnView, Comment, NewTask, Priority, Task, TaskPatch, WorkCategory};
pub use quality::{NcSeverity, NcSource, NcStatus, NewNonConformity, NonConformity, Resolution};
pub use safety::{Incident, IncidentDraft, IncidentPatch, IncidentSeverity, IncidentStatus, NewIncident};
pub use user::{Role, User};
