//! Request DTOs for booking API endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::models::{BookedSlot, BookingType, RentalRequest, RentalType, WorkingHour};

/// Request to compute test-drive slots from a supplied snapshot
#[derive(Debug, Deserialize)]
pub struct TestDriveSlotsRequest {
    pub date: NaiveDate,
    pub working_hours: Vec<WorkingHour>,
    #[serde(default)]
    pub bookings: Vec<BookedSlot>,
    /// Dealer UTC offset; falls back to the configured one
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

/// Query string for a car's test-drive slots
#[derive(Debug, Deserialize)]
pub struct TestDriveSlotsQuery {
    pub date: NaiveDate,
}

/// Request to quote a rental with explicit rates
#[derive(Debug, Deserialize)]
pub struct RentalQuoteRequest {
    pub rental_type: RentalType,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str")]
    pub hourly_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub daily_rate: Decimal,
    #[serde(default)]
    pub bookings: Vec<BookedSlot>,
}

impl RentalQuoteRequest {
    pub fn rental(&self) -> RentalRequest {
        RentalRequest {
            rental_type: self.rental_type,
            start_at: self.start_at,
            end_at: self.end_at,
        }
    }
}

/// Request to quote a rental of a stored car
#[derive(Debug, Deserialize)]
pub struct CarRentalQuoteRequest {
    pub rental_type: RentalType,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl From<CarRentalQuoteRequest> for RentalRequest {
    fn from(req: CarRentalQuoteRequest) -> Self {
        RentalRequest {
            rental_type: req.rental_type,
            start_at: req.start_at,
            end_at: req.end_at,
        }
    }
}

/// Request for the suggested end time
#[derive(Debug, Deserialize)]
pub struct DefaultEndRequest {
    pub rental_type: RentalType,
    pub start_at: DateTime<Utc>,
}

/// Request to book a car
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub user_id: Uuid,
    pub booking_type: BookingType,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(default)]
    pub rental_type: Option<RentalType>,
}
