//! Instrument booking store.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::BookingConfig;
use crate::ids::{IdIssuer, IdKind, max_sequence};
use crate::models::{Booking, Category, Instrument, InstrumentStatus, NewBooking, TimeSlot};
use crate::seed;
use crate::state::Observable;

pub struct InstrumentBookingModel {
    instruments: Observable<Vec<Instrument>>,
    bookings: Observable<Vec<Booking>>,
    schedule: BookingConfig,
    ids: Arc<IdIssuer>,
    clock: Arc<dyn Clock>,
}

impl InstrumentBookingModel {
    pub fn new(schedule: BookingConfig, ids: Arc<IdIssuer>, clock: Arc<dyn Clock>) -> Self {
        Self::with_records(seed::instruments(), seed::bookings(), schedule, ids, clock)
    }

    pub fn with_records(
        instruments: Vec<Instrument>,
        bookings: Vec<Booking>,
        schedule: BookingConfig,
        ids: Arc<IdIssuer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        ids.reserve_through(IdKind::Booking, max_sequence(bookings.iter().map(|b| b.id.as_str())));
        Self {
            instruments: Observable::new(instruments),
            bookings: Observable::new(bookings),
            schedule,
            ids,
            clock,
        }
    }

    pub fn instruments(&self) -> Vec<Instrument> {
        self.instruments.get()
    }

    pub fn bookings(&self) -> Vec<Booking> {
        self.bookings.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Booking>> {
        self.bookings.subscribe()
    }

    pub fn subscribe_instruments(&self) -> watch::Receiver<Vec<Instrument>> {
        self.instruments.subscribe()
    }

    pub fn get_instrument(&self, id: &str) -> Option<Instrument> {
        self.instruments.with(|list| list.iter().find(|i| i.id == id).cloned())
    }

    pub fn instruments_in(&self, category: Category) -> Vec<Instrument> {
        self.instruments.with(|list| list.iter().filter(|i| i.category == category).cloned().collect())
    }

    /// Set an instrument's status by hand; bookings do not change it.
    pub fn set_instrument_status(&self, id: &str, status: InstrumentStatus) -> bool {
        let changed = self.instruments.update_if(|list| match list.iter_mut().find(|i| i.id == id) {
            Some(inst) => {
                inst.status = status;
                true
            }
            None => false,
        });
        if changed {
            info!("Instrument {} status -> {:?}", id, status);
        }
        changed
    }

    /// Record a booking. Overlaps with existing bookings are allowed.
    pub fn add_booking(&self, new: NewBooking) -> String {
        if new.start_time >= new.end_time {
            warn!(
                "Booking for {} ends before it starts ({} >= {})",
                new.instrument_id, new.start_time, new.end_time
            );
        }

        let id = self.ids.next_long(IdKind::Booking);
        let booking = Booking {
            id: id.clone(),
            instrument_id: new.instrument_id,
            user_name: new.user_name,
            start_time: new.start_time,
            end_time: new.end_time,
            purpose: new.purpose,
            created_at: Some(self.clock.now()),
        };

        info!(
            "Booking {} for {} by {} ({} - {})",
            id, booking.instrument_id, booking.user_name, booking.start_time, booking.end_time
        );
        self.bookings.update(|list| list.insert(0, booking));
        id
    }

    pub fn delete_booking(&self, id: &str) -> bool {
        let removed = self.bookings.update_if(|list| {
            let before = list.len();
            list.retain(|b| b.id != id);
            list.len() != before
        });
        debug!("Booking {} delete: {}", id, removed);
        removed
    }

    /// Bookings of one instrument ordered by start time.
    pub fn bookings_for(&self, instrument_id: &str) -> Vec<Booking> {
        let mut list: Vec<Booking> = self.bookings.with(|all| {
            all.iter()
                .filter(|b| b.instrument_id == instrument_id)
                .cloned()
                .collect()
        });
        list.sort_by_key(|b| b.start_time);
        list
    }

    /// Bookable slots of `day` for one instrument.
    ///
    /// A slot is taken when any booking overlaps it. Nothing is bookable
    /// while the instrument is under maintenance. An unknown instrument has
    /// no slots.
    pub fn time_slots(&self, instrument_id: &str, day: NaiveDate) -> Vec<TimeSlot> {
        let Some(instrument) = self.get_instrument(instrument_id) else {
            return Vec::new();
        };
        let in_maintenance = instrument.status == InstrumentStatus::Maintenance;
        let bookings = self.bookings_for(instrument_id);

        let (Some(open), Some(close)) = (
            NaiveTime::from_hms_opt(self.schedule.day_start_hour, 0, 0),
            NaiveTime::from_hms_opt(self.schedule.day_end_hour, 0, 0),
        ) else {
            return Vec::new();
        };
        let step = TimeDelta::minutes(i64::from(self.schedule.slot_minutes.max(1)));
        let day_end = day.and_time(close);

        let mut slots = Vec::new();
        let mut start = day.and_time(open);
        while start + step <= day_end {
            let end = start + step;
            let booking = bookings.iter().find(|b| b.overlaps(start, end)).cloned();
            slots.push(TimeSlot {
                start,
                end,
                available: !in_maintenance && booking.is_none(),
                booking,
            });
            start = end;
        }
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveDateTime;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 16).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    fn model() -> InstrumentBookingModel {
        InstrumentBookingModel::new(
            BookingConfig::default(),
            Arc::new(IdIssuer::new()),
            Arc::new(FixedClock::on(day())),
        )
    }

    #[test]
    fn test_time_slots_mark_booked_hours() {
        let model = model();
        let slots = model.time_slots("inst-icpms", day());

        assert_eq!(slots.len(), 10);
        assert_eq!(slots[0].start, at(8, 0));
        assert_eq!(slots[9].end, at(18, 0));

        let taken: Vec<bool> = slots.iter().map(|s| !s.available).collect();
        assert_eq!(taken, vec![false, true, true, true, false, false, false, false, false, false]);
        assert_eq!(slots[1].booking.as_ref().unwrap().id, "BKG-0001");
    }

    #[test]
    fn test_time_slots_maintenance_blocks_all() {
        let model = model();
        let slots = model.time_slots("inst-gcms", day());
        assert!(!slots.is_empty());
        assert!(slots.iter().all(|s| !s.available && s.booking.is_none()));
    }

    #[test]
    fn test_time_slots_unknown_instrument() {
        assert!(model().time_slots("inst-nmr", day()).is_empty());
    }

    #[test]
    fn test_partial_overlap_blocks_slot() {
        let model = model();
        model.add_booking(NewBooking {
            instrument_id: "inst-ftir".to_string(),
            user_name: "T. Nakamura".to_string(),
            start_time: at(10, 30),
            end_time: at(11, 15),
            purpose: None,
        });

        let slots = model.time_slots("inst-ftir", day());
        let blocked: Vec<u32> = slots
            .iter()
            .filter(|s| !s.available)
            .map(|s| chrono::Timelike::hour(&s.start))
            .collect();
        assert_eq!(blocked, vec![10, 11]);
    }

    #[test]
    fn test_add_and_delete_booking() {
        let model = model();
        let id = model.add_booking(NewBooking {
            instrument_id: "inst-hplc".to_string(),
            user_name: "P. Lambert".to_string(),
            start_time: at(8, 0),
            end_time: at(9, 0),
            purpose: Some("System suitability".to_string()),
        });
        assert_eq!(id, "BKG-0003");

        let hplc = model.bookings_for("inst-hplc");
        assert_eq!(hplc.len(), 2);
        assert_eq!(hplc[0].id, id);

        assert!(model.delete_booking(&id));
        assert!(!model.delete_booking(&id));
        assert_eq!(model.bookings_for("inst-hplc").len(), 1);
    }

    #[test]
    fn test_overlapping_bookings_are_accepted() {
        let model = model();
        model.add_booking(NewBooking {
            instrument_id: "inst-icpms".to_string(),
            user_name: "Dr. M. Rousseau".to_string(),
            start_time: at(10, 0),
            end_time: at(11, 0),
            purpose: None,
        });
        assert_eq!(model.bookings_for("inst-icpms").len(), 2);
    }

    #[test]
    fn test_set_instrument_status() {
        let model = model();
        assert!(model.set_instrument_status("inst-gcms", InstrumentStatus::Available));
        assert_eq!(model.get_instrument("inst-gcms").unwrap().status, InstrumentStatus::Available);
        assert!(!model.set_instrument_status("inst-nmr", InstrumentStatus::Booked));
        assert_eq!(model.instruments_in(Category::Chromatography).len(), 2);
    }
}
