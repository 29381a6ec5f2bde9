//! In-memory caching using moka
//!
//! Dealer schedules and car rates change rarely compared to how often
//! availability is requested, so both are cached with a TTL. Bookings are
//! never cached: they are the snapshot availability is computed against.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::booking::{Car, WeeklySchedule};

/// Application cache holding schedules and car records
#[derive(Clone)]
pub struct AppCache {
    /// Weekly schedules (dealer_id -> WeeklySchedule)
    pub schedules: Cache<Uuid, Arc<WeeklySchedule>>,
    /// Cars with their rates (car_id -> Car)
    pub cars: Cache<Uuid, Arc<Car>>,
}

impl AppCache {
    /// Create a new cache instance with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            schedules: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(ttl)
                .build(),

            cars: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(ttl)
                .time_to_idle(ttl / 2)
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            schedules_size: self.schedules.entry_count(),
            cars_size: self.cars.entry_count(),
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.schedules.invalidate_all();
        self.cars.invalidate_all();
        info!("All caches invalidated");
    }

    /// Invalidate a single dealer's schedule
    pub async fn invalidate_dealer(&self, dealer_id: Uuid) {
        self.schedules.invalidate(&dealer_id).await;
        info!("Schedule cache invalidated for dealer: {}", dealer_id);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(5 * 60))
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub schedules_size: u64,
    pub cars_size: u64,
}
