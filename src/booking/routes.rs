//! Booking API route handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::cache::CacheStats;
use crate::config::offset_from_minutes;
use crate::error::{AppError, Result};
use crate::AppState;

use super::calculators::{calculate_rental_quote, default_end_time, ensure_no_conflict};
use super::models::{CarRates, WeeklySchedule};
use super::requests::{
    CarRentalQuoteRequest, CreateBookingRequest, DefaultEndRequest, RentalQuoteRequest,
    TestDriveSlotsQuery, TestDriveSlotsRequest,
};
use super::responses::{
    BookingResponse, DefaultEndResponse, RentalQuoteResponse, TestDriveSlotsResponse,
};
use super::services;
use super::slots::slots_for_selection;

/// Routes for the booking API
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/test-drives/slots", post(test_drive_slots))
        .route("/api/rentals/quote", post(rental_quote))
        .route("/api/rentals/default-end", post(rental_default_end))
        .route("/api/cars/:car_id/test-drive-slots", get(car_test_drive_slots))
        .route("/api/cars/:car_id/rental-quote", post(car_rental_quote))
        .route("/api/cars/:car_id/bookings", post(create_booking))
        .route("/api/bookings/:booking_id", delete(cancel_booking))
        .route("/api/cache/stats", get(cache_stats))
        .route("/api/cache/invalidate", post(invalidate_cache))
}

/// Slots computed from a schedule and bookings supplied by the caller
async fn test_drive_slots(
    State(state): State<AppState>,
    Json(req): Json<TestDriveSlotsRequest>,
) -> Result<Json<TestDriveSlotsResponse>> {
    let offset = match req.utc_offset_minutes {
        Some(minutes) => offset_from_minutes(minutes)
            .ok_or_else(|| AppError::BadRequest(format!("invalid UTC offset: {} minutes", minutes)))?,
        None => state.config.dealer_offset,
    };
    let schedule = WeeklySchedule::new(req.working_hours)?;

    let slots = slots_for_selection(req.date, &schedule, &req.bookings, offset, state.clock.now())?;
    Ok(Json(TestDriveSlotsResponse::new(req.date, slots)))
}

/// Rental quote with caller-supplied rates
async fn rental_quote(Json(req): Json<RentalQuoteRequest>) -> Result<Json<RentalQuoteResponse>> {
    let rates = CarRates {
        hourly_rate: req.hourly_rate,
        daily_rate: req.daily_rate,
    };
    let quote = calculate_rental_quote(&req.rental(), &rates)?;
    ensure_no_conflict(req.start_at, req.end_at, &req.bookings)?;
    Ok(Json(quote.into()))
}

async fn rental_default_end(Json(req): Json<DefaultEndRequest>) -> Result<Json<DefaultEndResponse>> {
    Ok(Json(DefaultEndResponse {
        end_at: default_end_time(req.rental_type, req.start_at)?,
    }))
}

async fn car_test_drive_slots(
    State(state): State<AppState>,
    Path(car_id): Path<Uuid>,
    Query(query): Query<TestDriveSlotsQuery>,
) -> Result<Json<TestDriveSlotsResponse>> {
    let slots = services::test_drive_availability(&state, car_id, query.date).await?;
    Ok(Json(TestDriveSlotsResponse::new(query.date, slots)))
}

async fn car_rental_quote(
    State(state): State<AppState>,
    Path(car_id): Path<Uuid>,
    Json(req): Json<CarRentalQuoteRequest>,
) -> Result<Json<RentalQuoteResponse>> {
    let quote = services::quote_rental(&state, car_id, req.into()).await?;
    Ok(Json(quote.into()))
}

async fn create_booking(
    State(state): State<AppState>,
    Path(car_id): Path<Uuid>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>)> {
    let booking = services::create_booking(&state, car_id, &req).await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<StatusCode> {
    services::cancel_booking(&state, booking_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

async fn invalidate_cache(State(state): State<AppState>) -> StatusCode {
    state.cache.invalidate_all();
    StatusCode::NO_CONTENT
}
