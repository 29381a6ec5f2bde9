//! Domain records for test-drive and rental bookings.
//!
//! Strongly typed versions of what the marketplace stores about dealer
//! schedules and reservations, plus the sqlx row types they are read from.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::error::BookingError;

/// Day of the week as stored in the dealer schedule ("MONDAY".."SUNDAY")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// Day of the week a calendar date falls on
    pub fn of(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self::from(date.weekday())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "MONDAY",
            DayOfWeek::Tuesday => "TUESDAY",
            DayOfWeek::Wednesday => "WEDNESDAY",
            DayOfWeek::Thursday => "THURSDAY",
            DayOfWeek::Friday => "FRIDAY",
            DayOfWeek::Saturday => "SATURDAY",
            DayOfWeek::Sunday => "SUNDAY",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl FromStr for DayOfWeek {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MONDAY" => Ok(DayOfWeek::Monday),
            "TUESDAY" => Ok(DayOfWeek::Tuesday),
            "WEDNESDAY" => Ok(DayOfWeek::Wednesday),
            "THURSDAY" => Ok(DayOfWeek::Thursday),
            "FRIDAY" => Ok(DayOfWeek::Friday),
            "SATURDAY" => Ok(DayOfWeek::Saturday),
            "SUNDAY" => Ok(DayOfWeek::Sunday),
            other => Err(BookingError::InvalidSchedule {
                message: format!("unknown day of week '{}'", other),
            }),
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opening hours for one weekday.
///
/// `open_time` and `close_time` are HHMM integers (900 = 09:00, 1730 = 17:30).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHour {
    pub day_of_week: DayOfWeek,
    pub is_open: bool,
    pub open_time: u32,
    pub close_time: u32,
}

impl WorkingHour {
    /// Build a validated working-hour entry
    pub fn new(
        day_of_week: DayOfWeek,
        is_open: bool,
        open_time: u32,
        close_time: u32,
    ) -> Result<Self, BookingError> {
        let hour = Self {
            day_of_week,
            is_open,
            open_time,
            close_time,
        };
        hour.validate()?;
        Ok(hour)
    }

    /// An open day with `open_time`..`close_time`
    pub fn open(day_of_week: DayOfWeek, open_time: u32, close_time: u32) -> Result<Self, BookingError> {
        Self::new(day_of_week, true, open_time, close_time)
    }

    /// A closed day
    pub fn closed(day_of_week: DayOfWeek) -> Self {
        Self {
            day_of_week,
            is_open: false,
            open_time: 0,
            close_time: 0,
        }
    }

    /// Check HHMM encoding and, for open days, that opening precedes closing
    pub fn validate(&self) -> Result<(), BookingError> {
        if !self.is_open {
            return Ok(());
        }
        for value in [self.open_time, self.close_time] {
            if !is_valid_hhmm(value) {
                return Err(BookingError::InvalidSchedule {
                    message: format!("{}: {} is not a valid HHMM time", self.day_of_week, value),
                });
            }
        }
        if self.open_time >= self.close_time {
            return Err(BookingError::InvalidSchedule {
                message: format!(
                    "{}: open time {} must be before close time {}",
                    self.day_of_week, self.open_time, self.close_time
                ),
            });
        }
        Ok(())
    }

    /// Opening hour with the minutes dropped (930 -> 9)
    pub fn open_hour(&self) -> u32 {
        self.open_time / 100
    }

    /// Closing hour with the minutes dropped (1730 -> 17)
    pub fn close_hour(&self) -> u32 {
        self.close_time / 100
    }
}

fn is_valid_hhmm(value: u32) -> bool {
    let (hours, minutes) = (value / 100, value % 100);
    minutes < 60 && (hours < 24 || value == 2400)
}

/// A dealer's weekly schedule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeeklySchedule {
    hours: Vec<WorkingHour>,
}

impl WeeklySchedule {
    /// Validate every entry and build the schedule
    pub fn new(hours: Vec<WorkingHour>) -> Result<Self, BookingError> {
        for hour in &hours {
            hour.validate()?;
        }
        Ok(Self { hours })
    }

    /// First entry configured for `day`, if any
    pub fn for_day(&self, day: DayOfWeek) -> Option<&WorkingHour> {
        self.hours.iter().find(|h| h.day_of_week == day)
    }

    pub fn hours(&self) -> &[WorkingHour] {
        &self.hours
    }
}

/// Booking category stored on every reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingType {
    TestDrive,
    Rental,
}

impl BookingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingType::TestDrive => "TEST_DRIVE",
            BookingType::Rental => "RENTAL",
        }
    }
}

impl FromStr for BookingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TEST_DRIVE" => Ok(BookingType::TestDrive),
            "RENTAL" => Ok(BookingType::Rental),
            other => Err(format!("unknown booking type '{}'", other)),
        }
    }
}

/// Rental billing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalType {
    Hourly,
    Daily,
}

impl RentalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentalType::Hourly => "hourly",
            RentalType::Daily => "daily",
        }
    }
}

impl FromStr for RentalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(RentalType::Hourly),
            "daily" => Ok(RentalType::Daily),
            other => Err(format!("unknown rental type '{}'", other)),
        }
    }
}

/// What kind of reservation occupies a booked range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "booking_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingKind {
    TestDrive,
    Rental {
        rental_type: RentalType,
        #[serde(default, with = "rust_decimal::serde::str_option")]
        total_price: Option<Decimal>,
    },
}

impl BookingKind {
    pub fn booking_type(&self) -> BookingType {
        match self {
            BookingKind::TestDrive => BookingType::TestDrive,
            BookingKind::Rental { .. } => BookingType::Rental,
        }
    }
}

/// An existing reservation occupying `[start_time, end_time)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedSlot {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: BookingKind,
}

impl BookedSlot {
    pub fn test_drive(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            id: None,
            start_time,
            end_time,
            kind: BookingKind::TestDrive,
        }
    }

    pub fn rental(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        rental_type: RentalType,
        total_price: Option<Decimal>,
    ) -> Self {
        Self {
            id: None,
            start_time,
            end_time,
            kind: BookingKind::Rental {
                rental_type,
                total_price,
            },
        }
    }
}

/// One hour-long test-drive window on a given day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSlot {
    #[serde(skip)]
    pub hour: u32,
    pub start_time: String,
    pub end_time: String,
    pub available: bool,
}

impl CandidateSlot {
    pub fn new(hour: u32, available: bool) -> Self {
        Self {
            hour,
            start_time: format!("{:02}:00", hour),
            end_time: format!("{:02}:00", hour + 1),
            available,
        }
    }
}

/// Requested rental period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RentalRequest {
    pub rental_type: RentalType,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// Per-car rental rates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarRates {
    pub hourly_rate: Decimal,
    pub daily_rate: Decimal,
}

impl CarRates {
    /// Rates must not be negative
    pub fn validate(&self) -> Result<(), BookingError> {
        for rate in [self.hourly_rate, self.daily_rate] {
            if rate < Decimal::ZERO {
                return Err(BookingError::NegativeRate { rate });
            }
        }
        Ok(())
    }
}

/// Car from cars
#[derive(Debug, Clone, FromRow)]
pub struct Car {
    pub id: Uuid,
    pub dealer_id: Uuid,
    pub hourly_rate: Decimal,
    pub daily_rate: Decimal,
}

impl Car {
    pub fn rates(&self) -> CarRates {
        CarRates {
            hourly_rate: self.hourly_rate,
            daily_rate: self.daily_rate,
        }
    }
}

/// Working hour row from working_hours
#[derive(Debug, Clone, FromRow)]
pub struct WorkingHourRow {
    pub day_of_week: String,
    pub is_open: bool,
    pub open_time: i32,
    pub close_time: i32,
}

impl TryFrom<WorkingHourRow> for WorkingHour {
    type Error = BookingError;

    fn try_from(row: WorkingHourRow) -> Result<Self, Self::Error> {
        let to_hhmm = |value: i32| {
            u32::try_from(value).map_err(|_| BookingError::InvalidSchedule {
                message: format!("{}: negative time {}", row.day_of_week, value),
            })
        };
        WorkingHour::new(
            row.day_of_week.parse()?,
            row.is_open,
            to_hhmm(row.open_time)?,
            to_hhmm(row.close_time)?,
        )
    }
}

/// Booking row from bookings
#[derive(Debug, Clone, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub car_id: Uuid,
    pub user_id: Uuid,
    pub booking_type: String,
    pub rental_type: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_price: Option<Decimal>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Convert to the range it occupies, failing on unknown type strings
    pub fn to_slot(&self) -> Result<BookedSlot, String> {
        let kind = match self.booking_type.parse::<BookingType>()? {
            BookingType::TestDrive => BookingKind::TestDrive,
            BookingType::Rental => {
                let rental_type = self
                    .rental_type
                    .as_deref()
                    .ok_or_else(|| format!("rental booking {} has no rental_type", self.id))?
                    .parse()?;
                BookingKind::Rental {
                    rental_type,
                    total_price: self.total_price,
                }
            }
        };
        Ok(BookedSlot {
            id: Some(self.id),
            start_time: self.start_time,
            end_time: self.end_time,
            kind,
        })
    }
}

/// Values for a new bookings row
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub car_id: Uuid,
    pub user_id: Uuid,
    pub booking_type: BookingType,
    pub rental_type: Option<RentalType>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_price: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_of_week_from_date() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(DayOfWeek::of(monday), DayOfWeek::Monday);
        assert_eq!(DayOfWeek::of(monday.succ_opt().unwrap()), DayOfWeek::Tuesday);
        assert_eq!(DayOfWeek::Monday.to_string(), "MONDAY");
    }

    #[test]
    fn test_day_of_week_parse() {
        assert_eq!("SUNDAY".parse::<DayOfWeek>().unwrap(), DayOfWeek::Sunday);
        assert_eq!("friday".parse::<DayOfWeek>().unwrap(), DayOfWeek::Friday);
        assert!("FUNDAY".parse::<DayOfWeek>().is_err());
    }

    #[test]
    fn test_working_hour_validation() {
        assert!(WorkingHour::open(DayOfWeek::Monday, 900, 1700).is_ok());
        assert!(WorkingHour::open(DayOfWeek::Monday, 0, 2400).is_ok());
        // open must precede close
        assert!(WorkingHour::open(DayOfWeek::Monday, 1700, 900).is_err());
        assert!(WorkingHour::open(DayOfWeek::Monday, 900, 900).is_err());
        // not HHMM
        assert!(WorkingHour::open(DayOfWeek::Monday, 975, 1700).is_err());
        assert!(WorkingHour::open(DayOfWeek::Monday, 900, 2430).is_err());
        // closed days ignore their times
        assert!(WorkingHour::new(DayOfWeek::Monday, false, 1700, 900).is_ok());
    }

    #[test]
    fn test_working_hour_truncates_minutes() {
        let hour = WorkingHour::open(DayOfWeek::Monday, 930, 1745).unwrap();
        assert_eq!(hour.open_hour(), 9);
        assert_eq!(hour.close_hour(), 17);
    }

    #[test]
    fn test_weekly_schedule_lookup() {
        let schedule = WeeklySchedule::new(vec![
            WorkingHour::open(DayOfWeek::Monday, 900, 1700).unwrap(),
            WorkingHour::closed(DayOfWeek::Sunday),
        ])
        .unwrap();
        assert!(schedule.for_day(DayOfWeek::Monday).unwrap().is_open);
        assert!(!schedule.for_day(DayOfWeek::Sunday).unwrap().is_open);
        assert!(schedule.for_day(DayOfWeek::Tuesday).is_none());
    }

    #[test]
    fn test_working_hour_row_conversion() {
        let row = WorkingHourRow {
            day_of_week: "WEDNESDAY".to_string(),
            is_open: true,
            open_time: 800,
            close_time: 1800,
        };
        let hour = WorkingHour::try_from(row).unwrap();
        assert_eq!(hour.day_of_week, DayOfWeek::Wednesday);
        assert_eq!(hour.open_time, 800);

        let row = WorkingHourRow {
            day_of_week: "WEDNESDAY".to_string(),
            is_open: true,
            open_time: -100,
            close_time: 1800,
        };
        assert!(WorkingHour::try_from(row).is_err());
    }

    #[test]
    fn test_candidate_slot_labels() {
        let slot = CandidateSlot::new(9, true);
        assert_eq!(slot.start_time, "09:00");
        assert_eq!(slot.end_time, "10:00");
        assert_eq!(CandidateSlot::new(23, false).end_time, "24:00");
    }

    #[test]
    fn test_booked_slot_json_shape() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap();

        let json = serde_json::to_value(BookedSlot::test_drive(start, end)).unwrap();
        assert_eq!(json["booking_type"], "TEST_DRIVE");

        let parsed: BookedSlot = serde_json::from_value(serde_json::json!({
            "start_time": "2024-01-01T10:00:00Z",
            "end_time": "2024-01-02T10:00:00Z",
            "booking_type": "RENTAL",
            "rental_type": "daily",
            "total_price": "50"
        }))
        .unwrap();
        assert_eq!(parsed.kind.booking_type(), BookingType::Rental);
        assert_eq!(
            parsed.kind,
            BookingKind::Rental {
                rental_type: RentalType::Daily,
                total_price: Some(Decimal::from(50)),
            }
        );
    }

    #[test]
    fn test_booking_row_to_slot() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let mut row = Booking {
            id: Uuid::new_v4(),
            car_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            booking_type: "RENTAL".to_string(),
            rental_type: Some("hourly".to_string()),
            start_time: start,
            end_time: start + chrono::Duration::hours(2),
            total_price: Some(Decimal::from(20)),
            status: "CONFIRMED".to_string(),
            created_at: start,
        };
        let slot = row.to_slot().unwrap();
        assert_eq!(slot.id, Some(row.id));
        assert_eq!(slot.kind.booking_type(), BookingType::Rental);

        row.rental_type = None;
        assert!(row.to_slot().is_err());

        row.booking_type = "PICKUP".to_string();
        assert!(row.to_slot().is_err());
    }
}
