//! Thin asynchronous client for the BTS ocean freight rate workbook.
//!
//! - Downloads the workbook (or reads a local copy) and parses both lanes.
//! - Keeps the parsed series in an on-disk cache with stale fallbacks.

use std::{
    path::PathBuf,
    time::{Duration, SystemTime},
};

use reqwest::{Client, Url};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{LaneDirection, RateBook};
use crate::infra::cache::{RateCache, RateCacheStore, RATE_CACHE_TTL};
use crate::infra::workbook::{parse_workbook, WorkbookError};
use crate::util::version::user_agent;

pub const DEFAULT_WORKBOOK_URL: &str =
    "https://www.bts.gov/sites/bts.dot.gov/files/2025-04/F4_23_Ocean_rates_v3.xlsx";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum DataAcquisitionError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to read workbook {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unreadable rate workbook: {0}")]
    Workbook(#[from] WorkbookError),
    #[error("offline run requested but no cached rates exist for {0}")]
    NoCachedRates(String),
}

/// Where the workbook comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RateSource {
    Remote(Url),
    LocalFile(PathBuf),
}

impl RateSource {
    pub fn remote(url: &str) -> Result<Self, DataAcquisitionError> {
        Ok(Self::Remote(Url::parse(url)?))
    }

    /// Key under which parsed series are cached.
    pub fn cache_key(&self) -> String {
        match self {
            Self::Remote(url) => url.to_string(),
            Self::LocalFile(path) => path.display().to_string(),
        }
    }
}

/// How much the client may rely on the cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FetchMode {
    /// Serve a fresh cache entry, otherwise fetch.
    #[default]
    PreferCache,
    /// Always fetch; a stale cache is only a fallback on failure.
    Refresh,
    /// Never touch the network.
    Offline,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Cached,
    Stale,
}

#[derive(Clone, Debug)]
pub struct RatesPayload {
    pub rates: RateBook,
    pub fetched_at: SystemTime,
    pub status: CacheStatus,
}

#[derive(Clone)]
pub struct RateSourceClient {
    http: Client,
    cache: Option<RateCacheStore>,
    ttl: Duration,
}

impl RateSourceClient {
    pub fn new() -> Result<Self, DataAcquisitionError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DataAcquisitionError> {
        let http = Client::builder()
            .user_agent(user_agent())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            cache: None,
            ttl: RATE_CACHE_TTL,
        })
    }

    pub fn with_cache(mut self, store: Option<RateCacheStore>) -> Self {
        self.cache = store;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Load both lane series, honouring the cache according to `mode`.
    pub async fn load_rates(
        &self,
        source: &RateSource,
        mode: FetchMode,
    ) -> Result<RatesPayload, DataAcquisitionError> {
        let key = source.cache_key();
        let cached = self.cache.as_ref().and_then(|store| store.load(&key));

        match (&cached, mode) {
            (Some(cache), FetchMode::Offline) => {
                info!(source = %key, age = %cache.age_string(), "using cached ocean rates (offline)");
                return Ok(payload_from_cache(cache, CacheStatus::Cached));
            }
            (None, FetchMode::Offline) => return Err(DataAcquisitionError::NoCachedRates(key)),
            (Some(cache), FetchMode::PreferCache) if !cache.is_expired(self.ttl) => {
                info!(source = %key, age = %cache.age_string(), "using cached ocean rates");
                return Ok(payload_from_cache(cache, CacheStatus::Cached));
            }
            (Some(cache), FetchMode::PreferCache) => {
                info!(age = %cache.age_string(), "rate cache expired, refreshing");
            }
            _ => {}
        }

        match self.fetch_and_parse(source).await {
            Ok(rates) => {
                if let Some(store) = &self.cache {
                    if let Err(e) = store.save(&RateCache::new(key.clone(), &rates)) {
                        warn!("failed to save rate cache: {e}");
                    }
                }
                Ok(RatesPayload {
                    rates,
                    fetched_at: SystemTime::now(),
                    status: CacheStatus::Fresh,
                })
            }
            Err(error) => match cached {
                Some(cache) => {
                    warn!(
                        age = %cache.age_string(),
                        "rate acquisition failed ({error}); falling back to stale cache"
                    );
                    Ok(payload_from_cache(&cache, CacheStatus::Stale))
                }
                None => Err(error),
            },
        }
    }

    async fn fetch_and_parse(&self, source: &RateSource) -> Result<RateBook, DataAcquisitionError> {
        let bytes = match source {
            RateSource::Remote(url) => self.download(url).await?,
            RateSource::LocalFile(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| DataAcquisitionError::Io {
                        path: path.clone(),
                        source,
                    })?
            }
        };
        let rates = parse_workbook(&bytes)?;
        for direction in LaneDirection::ALL {
            if rates.for_direction(direction).is_empty() {
                warn!(lane = %direction, "rate workbook has no usable points for lane");
            }
        }
        Ok(rates)
    }

    /// Fetch the raw workbook bytes.
    pub async fn download(&self, url: &Url) -> Result<Vec<u8>, DataAcquisitionError> {
        info!(%url, "downloading ocean rate workbook");
        let response = self.http.get(url.clone()).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        info!(bytes = bytes.len(), "downloaded ocean rate workbook");
        Ok(bytes.to_vec())
    }
}

fn payload_from_cache(cache: &RateCache, status: CacheStatus) -> RatesPayload {
    RatesPayload {
        rates: cache.rate_book(),
        fetched_at: cache.cached_at_time(),
        status,
    }
}
