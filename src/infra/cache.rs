//! Persistent on-disk cache for parsed ocean rate series with TTL + source tracking.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::{LaneDirection, RateBook, RatePoint, RateSeries};

const CACHE_FILENAME: &str = "ocean_rates_cache.json";

/// Default TTL: 7 days. The BTS workbook is republished a few times a year.
pub const RATE_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Cached rate series for both lanes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCache {
    /// URL or path the series were read from.
    pub source: String,
    /// Unix timestamp (seconds) when this cache was created.
    pub cached_at: u64,
    pub inbound: Vec<RatePoint>,
    pub outbound: Vec<RatePoint>,
}

impl RateCache {
    /// Create a new cache with current timestamp.
    pub fn new(source: impl Into<String>, rates: &RateBook) -> Self {
        Self {
            source: source.into(),
            cached_at: unix_now(),
            inbound: rates.for_direction(LaneDirection::Inbound).points().to_vec(),
            outbound: rates.for_direction(LaneDirection::Outbound).points().to_vec(),
        }
    }

    pub fn rate_book(&self) -> RateBook {
        RateBook::new(
            RateSeries::new(LaneDirection::Inbound, self.inbound.iter().copied()),
            RateSeries::new(LaneDirection::Outbound, self.outbound.iter().copied()),
        )
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }

    pub fn age(&self) -> Duration {
        Duration::from_secs(unix_now().saturating_sub(self.cached_at))
    }

    pub fn cached_at_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.cached_at)
    }

    /// Human-readable age string.
    pub fn age_string(&self) -> String {
        let secs = self.age().as_secs();
        if secs < 60 {
            format!("{secs}s")
        } else if secs < 3600 {
            format!("{}m", secs / 60)
        } else if secs < 86400 {
            format!("{}h", secs / 3600)
        } else {
            format!("{}d", secs / 86400)
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Location of the rate cache file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateCacheStore {
    path: PathBuf,
}

impl RateCacheStore {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CACHE_FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cache for `source`, if one exists. Expiry is the caller's call.
    pub fn load(&self, source: &str) -> Option<RateCache> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no rate cache found");
            return None;
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %self.path.display(), "failed to read rate cache: {e}");
                return None;
            }
        };

        match serde_json::from_str::<RateCache>(&content) {
            Ok(cache) if cache.source == source => {
                debug!(age = %cache.age_string(), "loaded rate cache");
                Some(cache)
            }
            Ok(cache) => {
                debug!(cached = %cache.source, requested = source, "rate cache is for another source");
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), "failed to parse rate cache: {e}");
                None
            }
        }
    }

    pub fn save(&self, cache: &RateCache) -> Result<(), io::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(cache)?;
        fs::write(&self.path, content)?;
        info!(
            inbound = cache.inbound.len(),
            outbound = cache.outbound.len(),
            path = %self.path.display(),
            "saved rate cache"
        );
        Ok(())
    }
}
