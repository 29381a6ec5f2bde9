//! Database tests for booking creation and cancellation.
//!
//! Run with `DATABASE_URL` pointing at a Postgres server:
//! `cargo test --test booking_db_test -- --ignored`

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use rust_decimal_macros::dec;
use sqlx::PgPool;
use uuid::Uuid;

use carlot_booking::booking::requests::CreateBookingRequest;
use carlot_booking::booking::services::{cancel_booking, create_booking};
use carlot_booking::booking::{BookingError, BookingType, FixedClock, RentalType};
use carlot_booking::cache::AppCache;
use carlot_booking::config::Config;
use carlot_booking::error::AppError;
use carlot_booking::AppState;

fn state_for(db: PgPool) -> AppState {
    let config = Config {
        database_url: String::new(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        database_max_connections: 5,
        dealer_offset: FixedOffset::east_opt(0).unwrap(),
        cache_ttl: Duration::from_secs(60),
    };
    AppState {
        db,
        cache: AppCache::new(config.cache_ttl),
        clock: Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())),
        config: Arc::new(config),
    }
}

async fn insert_car(db: &PgPool) -> Uuid {
    let car_id = Uuid::new_v4();
    sqlx::query("INSERT INTO cars (id, dealer_id, hourly_rate, daily_rate) VALUES ($1, $2, $3, $4)")
        .bind(car_id)
        .bind(Uuid::new_v4())
        .bind(dec!(20))
        .bind(dec!(50))
        .execute(db)
        .await
        .unwrap();
    car_id
}

fn daily_rental(start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> CreateBookingRequest {
    CreateBookingRequest {
        user_id: Uuid::new_v4(),
        booking_type: BookingType::Rental,
        start_at,
        end_at,
        rental_type: Some(RentalType::Daily),
    }
}

fn feb(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, day, 9, 0, 0).unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL pointing at a Postgres server"]
async fn test_concurrent_overlapping_rentals_book_once(db: PgPool) {
    let car_id = insert_car(&db).await;
    let state = state_for(db.clone());

    let first = daily_rental(feb(1), feb(3));
    let second = daily_rental(feb(2), feb(4));
    let (a, b) = tokio::join!(
        create_booking(&state, car_id, &first),
        create_booking(&state, car_id, &second),
    );

    let results = [a, b];
    let booked = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::Booking(BookingError::Conflict { .. }))))
        .count();
    assert_eq!(booked, 1);
    assert_eq!(conflicts, 1);

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE car_id = $1")
        .bind(car_id)
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(stored, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL pointing at a Postgres server"]
async fn test_cancelled_booking_frees_its_time(db: PgPool) {
    let car_id = insert_car(&db).await;
    let state = state_for(db);

    let booking = create_booking(&state, car_id, &daily_rental(feb(1), feb(3)))
        .await
        .unwrap();
    assert_eq!(booking.total_price, Some(dec!(100)));

    let retry = create_booking(&state, car_id, &daily_rental(feb(2), feb(4))).await;
    assert!(matches!(
        retry,
        Err(AppError::Booking(BookingError::Conflict { .. }))
    ));

    cancel_booking(&state, booking.id).await.unwrap();
    assert!(matches!(
        cancel_booking(&state, booking.id).await,
        Err(AppError::NotFound)
    ));

    let rebooked = create_booking(&state, car_id, &daily_rental(feb(2), feb(4))).await;
    assert!(rebooked.is_ok());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs DATABASE_URL pointing at a Postgres server"]
async fn test_adjacent_rentals_both_book(db: PgPool) {
    let car_id = insert_car(&db).await;
    let state = state_for(db);

    create_booking(&state, car_id, &daily_rental(feb(1), feb(2)))
        .await
        .unwrap();
    create_booking(&state, car_id, &daily_rental(feb(2), feb(3)))
        .await
        .unwrap();
}
