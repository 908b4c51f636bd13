//! Instruments, bookings and derived time slots.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Instrument category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Spectroscopy,
    Chromatography,
    Elemental,
    General,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 4] = [
        Category::Spectroscopy,
        Category::Chromatography,
        Category::Elemental,
        Category::General,
    ];
}

/// Instrument availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentStatus {
    #[default]
    Available,
    Booked,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub image_url: Option<String>,
    pub status: InstrumentStatus,
    pub created_at: Option<NaiveDate>,
}

/// Reservation of an instrument for a time range.
///
/// `start_time < end_time` is expected but not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub instrument_id: String,
    pub user_name: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub purpose: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl Booking {
    /// Half-open overlap test against `[start, end)`.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start_time < end && self.end_time > start
    }
}

/// DTO for creating a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub instrument_id: String,
    pub user_name: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub purpose: Option<String>,
}

/// One bookable slot of an instrument's day.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub available: bool,
    /// First booking overlapping the slot, if any.
    pub booking: Option<Booking>,
}
