//! Core rental calculation functions.
//!
//! Pure functions for duration and pricing math - no database access.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use super::error::BookingError;
use super::models::{BookedSlot, CarRates, RentalRequest, RentalType};

const HOURS_PER_DAY: i64 = 24;

/// Decimal places kept when a partial day is billed as a fraction
const FRACTION_PLACES: u32 = 3;

/// Round to specified decimal places, halves away from zero.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use carlot_booking::booking::round_fraction;
///
/// assert_eq!(round_fraction(dec!(0.0416666), 3), dec!(0.042));
/// assert_eq!(round_fraction(dec!(0.0625), 3), dec!(0.063));
/// assert_eq!(round_fraction(dec!(0.5), 3), dec!(0.5));
/// ```
pub fn round_fraction(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Half-open overlap: `[a_start, a_end)` intersects `[b_start, b_end)`
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

/// Whole hours between two instants, truncated
pub fn elapsed_hours(start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> i64 {
    (end_at - start_at).num_hours()
}

/// Whole days between two instants, truncated
pub fn elapsed_days(start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> i64 {
    (end_at - start_at).num_days()
}

/// Elapsed rental time, shaped by billing mode.
///
/// Hourly rentals are always expressed in hours; daily rentals as whole days
/// plus leftover hours. The `Display` form ("3 hours", "1 day, 12 hours") is
/// what gets shown and stored, and `FromStr` reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationSummary {
    Hours(i64),
    Days { days: i64, hours: i64 },
}

impl DurationSummary {
    pub fn rental_type(&self) -> RentalType {
        match self {
            DurationSummary::Hours(_) => RentalType::Hourly,
            DurationSummary::Days { .. } => RentalType::Daily,
        }
    }

    pub fn total_hours(&self) -> i64 {
        match *self {
            DurationSummary::Hours(hours) => hours,
            DurationSummary::Days { days, hours } => {
                days.saturating_mul(HOURS_PER_DAY).saturating_add(hours)
            }
        }
    }

    pub fn days(&self) -> i64 {
        match *self {
            DurationSummary::Hours(_) => 0,
            DurationSummary::Days { days, .. } => days,
        }
    }

    pub fn remainder_hours(&self) -> i64 {
        match *self {
            DurationSummary::Hours(hours) => hours,
            DurationSummary::Days { hours, .. } => hours,
        }
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

impl fmt::Display for DurationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DurationSummary::Hours(hours) => f.write_str(&plural(hours, "hour")),
            DurationSummary::Days { days, hours: 0 } => f.write_str(&plural(days, "day")),
            DurationSummary::Days { days, hours } => {
                write!(f, "{}, {}", plural(days, "day"), plural(hours, "hour"))
            }
        }
    }
}

impl FromStr for DurationSummary {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BookingError::InvalidDurationSummary(s.to_string());

        let mut days = None;
        let mut hours = None;
        for part in s.split(',').map(str::trim) {
            let (count, unit) = part.split_once(' ').ok_or_else(invalid)?;
            let count: u32 = count.parse().map_err(|_| invalid())?;
            let count = i64::from(count);
            let slot = match unit {
                "day" | "days" => &mut days,
                "hour" | "hours" => &mut hours,
                _ => return Err(invalid()),
            };
            if slot.replace(count).is_some() {
                return Err(invalid());
            }
        }

        match (days, hours) {
            (Some(days), hours) => Ok(DurationSummary::Days {
                days,
                hours: hours.unwrap_or(0),
            }),
            (None, Some(hours)) => Ok(DurationSummary::Hours(hours)),
            (None, None) => Err(invalid()),
        }
    }
}

impl Serialize for DurationSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Check a rental request and work out how long it runs.
///
/// Hourly rentals must cover `(0, 24]` whole hours; daily rentals at least
/// one whole day.
pub fn validate_rental(request: &RentalRequest) -> Result<DurationSummary, BookingError> {
    if request.end_at <= request.start_at {
        return Err(BookingError::InvalidRange {
            start_at: request.start_at,
            end_at: request.end_at,
        });
    }

    let hours = elapsed_hours(request.start_at, request.end_at);

    match request.rental_type {
        RentalType::Hourly => {
            if hours <= 0 || hours > HOURS_PER_DAY {
                return Err(BookingError::HourlyDurationOutOfBounds { hours });
            }
            Ok(DurationSummary::Hours(hours))
        }
        RentalType::Daily => {
            let days = elapsed_days(request.start_at, request.end_at);
            if days < 1 {
                return Err(BookingError::DailyDurationTooShort { hours });
            }
            Ok(DurationSummary::Days {
                days,
                hours: hours % HOURS_PER_DAY,
            })
        }
    }
}

/// Price a validated duration.
///
/// Hourly: at least one hour is charged. Daily: whole days at the daily rate,
/// plus any leftover hours billed as a fraction of a day rounded to three
/// places (12 hours -> 0.5 day), not as a full extra day.
pub fn price_for(duration: &DurationSummary, rates: &CarRates) -> Result<Decimal, BookingError> {
    let price = match *duration {
        DurationSummary::Hours(hours) => Decimal::from(hours.max(1)).checked_mul(rates.hourly_rate),
        DurationSummary::Days { days, hours } => {
            let base = Decimal::from(days.max(1)).checked_mul(rates.daily_rate);
            if hours == 0 {
                base
            } else {
                let fraction = round_fraction(
                    Decimal::from(hours) / Decimal::from(HOURS_PER_DAY),
                    FRACTION_PLACES,
                );
                base.zip(fraction.checked_mul(rates.daily_rate))
                    .and_then(|(base, extra)| base.checked_add(extra))
            }
        }
    };
    price.ok_or(BookingError::PriceOverflow)
}

/// Priced rental
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentalQuote {
    pub rental_type: RentalType,
    pub total_price: Decimal,
    pub duration: DurationSummary,
}

/// Validate a rental request and price it
pub fn calculate_rental_quote(
    request: &RentalRequest,
    rates: &CarRates,
) -> Result<RentalQuote, BookingError> {
    rates.validate()?;
    let duration = validate_rental(request)?;
    Ok(RentalQuote {
        rental_type: request.rental_type,
        total_price: price_for(&duration, rates)?,
        duration,
    })
}

/// End time suggested when the rental type or start time changes
pub fn default_end_time(
    rental_type: RentalType,
    start_at: DateTime<Utc>,
) -> Result<DateTime<Utc>, BookingError> {
    let length = match rental_type {
        RentalType::Hourly => Duration::hours(2),
        RentalType::Daily => Duration::days(1),
    };
    start_at
        .checked_add_signed(length)
        .ok_or(BookingError::DateOutOfRange)
}

/// First existing booking that intersects `[start_at, end_at)`
pub fn find_conflict<'a>(
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    bookings: &'a [BookedSlot],
) -> Option<&'a BookedSlot> {
    bookings
        .iter()
        .find(|b| overlaps(start_at, end_at, b.start_time, b.end_time))
}

/// Fail with `Conflict` if `[start_at, end_at)` intersects any booking
pub fn ensure_no_conflict(
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    bookings: &[BookedSlot],
) -> Result<(), BookingError> {
    match find_conflict(start_at, end_at, bookings) {
        Some(hit) => Err(BookingError::Conflict {
            start: hit.start_time,
            end: hit.end_time,
        }),
        None => Ok(()),
    }
}
