//! Test-drive slot generation.
//!
//! Bookings are stored as absolute instants while schedules are wall-clock
//! hours, so every function here takes the dealership's UTC offset to decide
//! which calendar day and hour an instant belongs to.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use super::calculators::overlaps;
use super::error::BookingError;
use super::models::{BookedSlot, CandidateSlot, DayOfWeek, WeeklySchedule};

/// Absolute start of `hour` o'clock on `date` in the dealer's offset.
///
/// `hour` may be 24, meaning midnight at the end of `date`. Fails with
/// `DateOutOfRange` at the edges of the representable calendar.
pub fn local_hour_start(
    date: NaiveDate,
    hour: u32,
    offset: FixedOffset,
) -> Result<DateTime<Utc>, BookingError> {
    date.and_time(NaiveTime::MIN)
        .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
        .and_then(|midnight| midnight.checked_add_signed(Duration::hours(i64::from(hour))))
        .map(|start| Utc.from_utc_datetime(&start))
        .ok_or(BookingError::DateOutOfRange)
}

/// Absolute `[start, end)` covering the whole of `date` in the dealer's offset
pub fn local_day_bounds(
    date: NaiveDate,
    offset: FixedOffset,
) -> Result<(DateTime<Utc>, DateTime<Utc>), BookingError> {
    Ok((
        local_hour_start(date, 0, offset)?,
        local_hour_start(date, 24, offset)?,
    ))
}

/// Build the hour-long test-drive slots for `date`.
///
/// Returns nothing when the schedule has no entry for that weekday or the
/// dealer is closed. Opening and closing times are cut down to whole hours
/// (a 09:30 opening yields a first slot at 09:00). A slot is unavailable if
/// any booking overlaps it.
pub fn generate_test_drive_slots(
    date: NaiveDate,
    schedule: &WeeklySchedule,
    bookings: &[BookedSlot],
    offset: FixedOffset,
) -> Result<Vec<CandidateSlot>, BookingError> {
    let working_hour = match schedule.for_day(DayOfWeek::of(date)) {
        Some(h) if h.is_open => h,
        _ => return Ok(Vec::new()),
    };

    (working_hour.open_hour()..working_hour.close_hour())
        .map(|hour| {
            let start = local_hour_start(date, hour, offset)?;
            let end = local_hour_start(date, hour + 1, offset)?;
            let taken = bookings
                .iter()
                .any(|b| overlaps(start, end, b.start_time, b.end_time));
            Ok(CandidateSlot::new(hour, !taken))
        })
        .collect()
}

/// Whether `date` can still be picked, i.e. is not before today
pub fn is_selectable_date(date: NaiveDate, now: DateTime<Utc>, offset: FixedOffset) -> bool {
    date >= now.with_timezone(&offset).date_naive()
}

/// Slots for a date picker: past dates come back fully unavailable
pub fn slots_for_selection(
    date: NaiveDate,
    schedule: &WeeklySchedule,
    bookings: &[BookedSlot],
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<Vec<CandidateSlot>, BookingError> {
    let mut slots = generate_test_drive_slots(date, schedule, bookings, offset)?;
    if !is_selectable_date(date, now, offset) {
        for slot in &mut slots {
            slot.available = false;
        }
    }
    Ok(slots)
}
