//! Response DTOs for booking API endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::calculators::{DurationSummary, RentalQuote};
use super::models::{Booking, CandidateSlot, RentalType};

/// Response for test-drive slot listing
#[derive(Debug, Serialize)]
pub struct TestDriveSlotsResponse {
    pub date: NaiveDate,
    pub available_count: usize,
    pub slots: Vec<CandidateSlot>,
}

impl TestDriveSlotsResponse {
    pub fn new(date: NaiveDate, slots: Vec<CandidateSlot>) -> Self {
        Self {
            date,
            available_count: slots.iter().filter(|s| s.available).count(),
            slots,
        }
    }
}

/// Response for a rental quote
#[derive(Debug, Serialize)]
pub struct RentalQuoteResponse {
    pub rental_type: RentalType,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
    pub duration: DurationSummary,
    pub total_hours: i64,
    pub days: i64,
    pub remainder_hours: i64,
}

impl From<RentalQuote> for RentalQuoteResponse {
    fn from(quote: RentalQuote) -> Self {
        Self {
            rental_type: quote.rental_type,
            total_price: quote.total_price,
            total_hours: quote.duration.total_hours(),
            days: quote.duration.days(),
            remainder_hours: quote.duration.remainder_hours(),
            duration: quote.duration,
        }
    }
}

/// Response for the suggested end time
#[derive(Debug, Serialize)]
pub struct DefaultEndResponse {
    pub end_at: DateTime<Utc>,
}

/// Response for a stored booking
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub car_id: Uuid,
    pub user_id: Uuid,
    pub booking_type: String,
    pub rental_type: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub total_price: Option<Decimal>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            car_id: booking.car_id,
            user_id: booking.user_id,
            booking_type: booking.booking_type,
            rental_type: booking.rental_type,
            start_at: booking.start_time,
            end_at: booking.end_time,
            total_price: booking.total_price,
            status: booking.status,
            created_at: booking.created_at,
        }
    }
}

/// Generic error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
