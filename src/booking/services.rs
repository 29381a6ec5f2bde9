//! Booking service functions with database access.
//!
//! These load the schedule, rates and booking snapshot for a car (through the
//! cache where possible) and hand them to the pure calculators. Only
//! `create_booking` is authoritative about double booking: it re-checks
//! overlaps inside a transaction holding the car's row lock.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Timelike, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

use super::calculators::{calculate_rental_quote, ensure_no_conflict, RentalQuote};
use super::error::BookingError;
use super::models::{
    BookedSlot, Booking, BookingType, CandidateSlot, Car, NewBooking, RentalRequest,
    WeeklySchedule, WorkingHour,
};
use super::queries;
use super::requests::CreateBookingRequest;
use super::slots::{local_day_bounds, slots_for_selection};

/// Load a car, cache first
pub async fn load_car(state: &AppState, car_id: Uuid) -> Result<Arc<Car>, AppError> {
    if let Some(cached) = state.cache.cars.get(&car_id).await {
        debug!("Cache HIT for car: {}", car_id);
        return Ok(cached);
    }

    debug!("Cache MISS for car: {}", car_id);
    let car = Arc::new(queries::get_car(&state.db, car_id).await?);
    state.cache.cars.insert(car_id, car.clone()).await;
    Ok(car)
}

/// Load a dealer's weekly schedule, cache first
pub async fn load_schedule(
    state: &AppState,
    dealer_id: Uuid,
) -> Result<Arc<WeeklySchedule>, AppError> {
    if let Some(cached) = state.cache.schedules.get(&dealer_id).await {
        debug!("Cache HIT for schedule: {}", dealer_id);
        return Ok(cached);
    }

    debug!("Cache MISS for schedule: {}", dealer_id);
    let schedule = queries::get_working_hours(&state.db, dealer_id)
        .await?
        .into_iter()
        .map(WorkingHour::try_from)
        .collect::<Result<Vec<_>, _>>()
        .and_then(WeeklySchedule::new)
        .map_err(|e| AppError::Internal(format!("dealer {} has a broken schedule: {}", dealer_id, e)))?;

    let schedule = Arc::new(schedule);
    state.cache.schedules.insert(dealer_id, schedule.clone()).await;
    Ok(schedule)
}

fn to_booked_slots(rows: &[Booking]) -> Result<Vec<BookedSlot>, AppError> {
    rows.iter()
        .map(|b| b.to_slot().map_err(AppError::Internal))
        .collect()
}

/// Bookings of a car intersecting `[from, to)` as of now
async fn booking_snapshot(
    state: &AppState,
    car_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<BookedSlot>, AppError> {
    let rows = queries::find_overlapping_bookings(&state.db, car_id, from, to).await?;
    to_booked_slots(&rows)
}

/// Test-drive slots for a car on `date`
pub async fn test_drive_availability(
    state: &AppState,
    car_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<CandidateSlot>, AppError> {
    let offset = state.config.dealer_offset;
    let car = load_car(state, car_id).await?;
    let schedule = load_schedule(state, car.dealer_id).await?;

    let (from, to) = local_day_bounds(date, offset)?;
    let bookings = booking_snapshot(state, car_id, from, to).await?;

    let slots = slots_for_selection(date, &schedule, &bookings, offset, state.clock.now())?;
    Ok(slots)
}

/// Quote a rental of a stored car, rejecting ranges that are already taken
pub async fn quote_rental(
    state: &AppState,
    car_id: Uuid,
    request: RentalRequest,
) -> Result<RentalQuote, AppError> {
    let car = load_car(state, car_id).await?;
    let quote = calculate_rental_quote(&request, &car.rates())?;

    let bookings = booking_snapshot(state, car_id, request.start_at, request.end_at).await?;
    ensure_no_conflict(request.start_at, request.end_at, &bookings)?;

    Ok(quote)
}

/// Check that `[start_at, end_at)` is exactly one whole local hour.
///
/// Returns the local date and hour the test drive falls on.
pub fn test_drive_window(
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<(NaiveDate, u32), BookingError> {
    if end_at <= start_at {
        return Err(BookingError::InvalidRange { start_at, end_at });
    }
    let local = start_at.with_timezone(&offset);
    if end_at - start_at != Duration::hours(1) || local.minute() != 0 || local.second() != 0 {
        return Err(BookingError::SlotUnavailable);
    }
    Ok((local.date_naive(), local.hour()))
}

/// Validate and store a booking.
///
/// Test drives must match an available slot; rentals are priced with the
/// car's current rates. The final overlap check runs inside the insert
/// transaction, so a stale snapshot surfaces as `BookingError::Conflict`.
pub async fn create_booking(
    state: &AppState,
    car_id: Uuid,
    request: &CreateBookingRequest,
) -> Result<Booking, AppError> {
    let now = state.clock.now();
    if request.start_at < now {
        return Err(BookingError::StartInPast {
            start_at: request.start_at,
        }
        .into());
    }

    let (rental_type, total_price) = match request.booking_type {
        BookingType::TestDrive => {
            let offset = state.config.dealer_offset;
            let (date, hour) = test_drive_window(request.start_at, request.end_at, offset)?;
            let slots = test_drive_availability(state, car_id, date).await?;
            let open = slots.iter().any(|s| s.hour == hour && s.available);
            if !open {
                return Err(BookingError::SlotUnavailable.into());
            }
            (None, None)
        }
        BookingType::Rental => {
            let rental_type = request.rental_type.ok_or(BookingError::MissingRentalType)?;
            let car = load_car(state, car_id).await?;
            let quote = calculate_rental_quote(
                &RentalRequest {
                    rental_type,
                    start_at: request.start_at,
                    end_at: request.end_at,
                },
                &car.rates(),
            )?;
            (Some(rental_type), Some(quote.total_price))
        }
    };

    let new_booking = NewBooking {
        car_id,
        user_id: request.user_id,
        booking_type: request.booking_type,
        rental_type,
        start_time: request.start_at,
        end_time: request.end_at,
        total_price,
    };

    let mut tx = state.db.begin().await?;
    queries::lock_car(&mut *tx, car_id).await?;

    let existing =
        queries::find_overlapping_bookings(&mut *tx, car_id, request.start_at, request.end_at)
            .await?;
    if let Err(e) = ensure_no_conflict(request.start_at, request.end_at, &to_booked_slots(&existing)?) {
        warn!(
            "Booking conflict for car {} at {} - {}",
            car_id, request.start_at, request.end_at
        );
        return Err(e.into());
    }

    let booking = queries::insert_booking(&mut *tx, &new_booking).await?;
    tx.commit().await?;

    info!(
        "Created {} booking {} for car {} ({} - {})",
        booking.booking_type, booking.id, car_id, booking.start_time, booking.end_time
    );
    Ok(booking)
}

/// Cancel a booking so its time becomes available again
pub async fn cancel_booking(state: &AppState, booking_id: Uuid) -> Result<(), AppError> {
    if !queries::cancel_booking(&state.db, booking_id).await? {
        return Err(AppError::NotFound);
    }
    info!("Cancelled booking {}", booking_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_test_drive_window_accepts_aligned_hour() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let (date, hour) = test_drive_window(at(10, 0), at(11, 0), utc).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(hour, 10);
    }

    #[test]
    fn test_test_drive_window_uses_dealer_offset() {
        // 23:00 UTC on Jan 1 is 01:00 on Jan 2 at UTC+2
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let start = at(23, 0);
        let (date, hour) = test_drive_window(start, start + Duration::hours(1), offset).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(hour, 1);
    }

    #[test]
    fn test_test_drive_window_rejects_misaligned() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(
            test_drive_window(at(10, 30), at(11, 30), utc),
            Err(BookingError::SlotUnavailable)
        );
        assert_eq!(
            test_drive_window(at(10, 0), at(12, 0), utc),
            Err(BookingError::SlotUnavailable)
        );
        assert!(matches!(
            test_drive_window(at(11, 0), at(10, 0), utc),
            Err(BookingError::InvalidRange { .. })
        ));
    }
}
