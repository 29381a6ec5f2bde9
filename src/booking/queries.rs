//! Database queries for cars, dealer schedules and bookings.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::AppError;

use super::models::{Booking, Car, NewBooking, WorkingHourRow};

/// Status given to newly created bookings
pub const STATUS_CONFIRMED: &str = "CONFIRMED";

/// Status of cancelled bookings; they no longer occupy time
pub const STATUS_CANCELLED: &str = "CANCELLED";

/// Get a car by id
pub async fn get_car(pool: &PgPool, car_id: Uuid) -> Result<Car, AppError> {
    sqlx::query_as::<_, Car>(
        r#"
        SELECT id, dealer_id, hourly_rate, daily_rate
        FROM cars
        WHERE id = $1
          AND deleted_at IS NULL
        "#,
    )
    .bind(car_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

/// Lock a car row for the rest of the transaction.
///
/// Serialises concurrent booking attempts for the same car.
pub async fn lock_car<'e, E>(executor: E, car_id: Uuid) -> Result<(), AppError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id
        FROM cars
        WHERE id = $1
          AND deleted_at IS NULL
        FOR UPDATE
        "#,
    )
    .bind(car_id)
    .fetch_optional(executor)
    .await?
    .ok_or(AppError::NotFound)?;

    Ok(())
}

/// Get a dealer's working hours
pub async fn get_working_hours(
    pool: &PgPool,
    dealer_id: Uuid,
) -> Result<Vec<WorkingHourRow>, AppError> {
    let rows = sqlx::query_as::<_, WorkingHourRow>(
        r#"
        SELECT day_of_week, is_open, open_time, close_time
        FROM working_hours
        WHERE dealer_id = $1
        ORDER BY day_of_week
        "#,
    )
    .bind(dealer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Find a car's active bookings that intersect `[from, to)`
pub async fn find_overlapping_bookings<'e, E>(
    executor: E,
    car_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<Booking>, AppError>
where
    E: PgExecutor<'e>,
{
    let bookings = sqlx::query_as::<_, Booking>(
        r#"
        SELECT
            id, car_id, user_id, booking_type, rental_type,
            start_time, end_time, total_price, status, created_at
        FROM bookings
        WHERE car_id = $1
          AND status <> $4
          AND start_time < $3
          AND end_time > $2
        ORDER BY start_time
        "#,
    )
    .bind(car_id)
    .bind(from)
    .bind(to)
    .bind(STATUS_CANCELLED)
    .fetch_all(executor)
    .await?;

    Ok(bookings)
}

/// Insert a confirmed booking
pub async fn insert_booking<'e, E>(executor: E, booking: &NewBooking) -> Result<Booking, AppError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings (
            id, car_id, user_id, booking_type, rental_type,
            start_time, end_time, total_price, status, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
        RETURNING
            id, car_id, user_id, booking_type, rental_type,
            start_time, end_time, total_price, status, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(booking.car_id)
    .bind(booking.user_id)
    .bind(booking.booking_type.as_str())
    .bind(booking.rental_type.map(|t| t.as_str()))
    .bind(booking.start_time)
    .bind(booking.end_time)
    .bind(booking.total_price)
    .bind(STATUS_CONFIRMED)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

/// Mark a booking cancelled. Returns false if no active booking matched.
pub async fn cancel_booking(pool: &PgPool, booking_id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE bookings
        SET status = $2
        WHERE id = $1
          AND status <> $2
        "#,
    )
    .bind(booking_id)
    .bind(STATUS_CANCELLED)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
