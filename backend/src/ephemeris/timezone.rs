//! Timezone adapters used by the daylight-hour gate of the rating converter.
//!
//! Lookups are memoized in an explicit [`TimezoneCache`] that callers create
//! and inject, so independent planners (and parallel tests) never share state
//! unless they are handed the same cache.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use parking_lot::RwLock;

use super::EphemerisResult;
use crate::error::EphemerisError;
use crate::models::Location;

/// Timezone contract: UTC offset in effect at `time` for `location`.
pub trait TimezoneAdapter: Send + Sync {
    fn utc_offset(&self, time: DateTime<Utc>, location: &Location)
        -> EphemerisResult<FixedOffset>;

    /// Local wall-clock hour, 0-23.
    fn local_hour(&self, time: DateTime<Utc>, location: &Location) -> EphemerisResult<u32> {
        let offset = self.utc_offset(time, location)?;
        Ok(time.with_timezone(&offset).hour())
    }
}

/// Nautical timezone: `round(lng / 15)` hours from UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongitudeTimezone;

impl TimezoneAdapter for LongitudeTimezone {
    fn utc_offset(
        &self,
        _time: DateTime<Utc>,
        location: &Location,
    ) -> EphemerisResult<FixedOffset> {
        if !location.lng.is_finite() {
            return Err(EphemerisError::NonFiniteInput("longitude"));
        }
        let hours = (location.lng / 15.0).round().clamp(-12.0, 12.0) as i32;
        FixedOffset::east_opt(hours * 3600)
            .ok_or_else(|| EphemerisError::InvalidResult(format!("offset {}h", hours)))
    }
}

/// The same offset everywhere; useful when the caller already knows the zone.
#[derive(Debug, Clone, Copy)]
pub struct FixedOffsetTimezone(pub FixedOffset);

impl FixedOffsetTimezone {
    /// Offset from UTC in whole minutes (e.g. -420 for UTC-7).
    pub fn from_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes * 60).map(Self)
    }
}

impl TimezoneAdapter for FixedOffsetTimezone {
    fn utc_offset(
        &self,
        _time: DateTime<Utc>,
        _location: &Location,
    ) -> EphemerisResult<FixedOffset> {
        Ok(self.0)
    }
}

/// Cache key: location rounded to 0.01° plus the UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    lat_centi: i32,
    lng_centi: i32,
    day: i32,
}

impl CacheKey {
    fn new(time: DateTime<Utc>, location: &Location) -> Self {
        Self {
            lat_centi: (location.lat * 100.0).round() as i32,
            lng_centi: (location.lng * 100.0).round() as i32,
            day: time.num_days_from_ce(),
        }
    }
}

/// Memoized timezone offsets.
#[derive(Debug, Default)]
pub struct TimezoneCache {
    entries: RwLock<HashMap<CacheKey, FixedOffset>>,
}

impl TimezoneCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    fn get(&self, key: &CacheKey) -> Option<FixedOffset> {
        self.entries.read().get(key).copied()
    }

    fn insert(&self, key: CacheKey, offset: FixedOffset) {
        self.entries.write().insert(key, offset);
    }
}

/// Wraps another adapter and memoizes its answers in an injected cache.
#[derive(Debug, Clone)]
pub struct CachedTimezone<A> {
    inner: A,
    cache: Arc<TimezoneCache>,
}

impl<A: TimezoneAdapter> CachedTimezone<A> {
    pub fn new(inner: A, cache: Arc<TimezoneCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<TimezoneCache> {
        &self.cache
    }
}

impl<A: TimezoneAdapter> TimezoneAdapter for CachedTimezone<A> {
    fn utc_offset(
        &self,
        time: DateTime<Utc>,
        location: &Location,
    ) -> EphemerisResult<FixedOffset> {
        let key = CacheKey::new(time, location);
        if let Some(offset) = self.cache.get(&key) {
            return Ok(offset);
        }
        let offset = self.inner.utc_offset(time, location)?;
        self.cache.insert(key, offset);
        Ok(offset)
    }
}
