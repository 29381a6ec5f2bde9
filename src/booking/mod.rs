//! Booking engine for test drives and car rentals.
//!
//! Computes which test-drive hours are still free for a car and prices
//! hourly and daily rentals. The calculators are pure; services wrap them
//! with schedule, rate and booking lookups.

pub mod calculators;
pub mod clock;
pub mod error;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod slots;

// Re-export commonly used items
pub use calculators::{
    calculate_rental_quote, default_end_time, find_conflict, round_fraction, DurationSummary,
    RentalQuote,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::BookingError;
pub use models::{
    BookedSlot, BookingKind, BookingType, CandidateSlot, Car, CarRates, DayOfWeek, RentalRequest,
    RentalType, WeeklySchedule, WorkingHour,
};
pub use responses::ErrorResponse;
pub use routes::router;
pub use slots::generate_test_drive_slots;
