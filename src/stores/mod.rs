//! Observable record stores, one per application area.

pub mod booking;
pub mod edms;
pub mod kanban;
pub mod quality;
pub mod safety;
pub mod theme;

pub use booking::InstrumentBookingModel;
pub use edms::DocumentControlModel;
pub use kanban::KanbanModel;
pub use quality::QualityModel;
pub use safety::SafetyModel;
pub use theme::{ClassList, ThemeModel};
