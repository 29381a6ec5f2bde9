//! Validation failures raised by the booking calculators.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Booking validation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("End time must be after start time")]
    InvalidRange {
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    },

    #[error("Hourly rentals must last between 1 and 24 hours (requested {hours})")]
    HourlyDurationOutOfBounds { hours: i64 },

    #[error("Daily rentals must last at least one full day (requested {hours} hours)")]
    DailyDurationTooShort { hours: i64 },

    #[error("Rental bookings need a rental type")]
    MissingRentalType,

    #[error("Start time {start_at} is in the past")]
    StartInPast { start_at: DateTime<Utc> },

    #[error("Requested test drive slot is not available")]
    SlotUnavailable,

    #[error("Requested time overlaps an existing booking ({start} - {end})")]
    Conflict {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid working hours: {message}")]
    InvalidSchedule { message: String },

    #[error("Invalid duration summary '{0}'")]
    InvalidDurationSummary(String),

    #[error("Rate must not be negative (got {rate})")]
    NegativeRate { rate: Decimal },

    #[error("Rental price is too large to represent")]
    PriceOverflow,

    #[error("Date or time is outside the supported range")]
    DateOutOfRange,
}

impl BookingError {
    /// Stable identifier used in JSON error bodies
    pub fn error_type(&self) -> &'static str {
        match self {
            BookingError::InvalidRange { .. } => "invalid_range",
            BookingError::HourlyDurationOutOfBounds { .. } => "hourly_duration_out_of_bounds",
            BookingError::DailyDurationTooShort { .. } => "daily_duration_too_short",
            BookingError::MissingRentalType => "missing_rental_type",
            BookingError::StartInPast { .. } => "start_in_past",
            BookingError::SlotUnavailable => "slot_unavailable",
            BookingError::Conflict { .. } => "booking_conflict",
            BookingError::InvalidSchedule { .. } => "invalid_schedule",
            BookingError::InvalidDurationSummary(_) => "invalid_duration_summary",
            BookingError::NegativeRate { .. } => "negative_rate",
            BookingError::PriceOverflow => "price_overflow",
            BookingError::DateOutOfRange => "date_out_of_range",
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, BookingError::Conflict { .. } | BookingError::SlotUnavailable)
    }
}
