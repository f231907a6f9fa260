use crate::domain::ports::{HolidayCalendar, HolidayProvider};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Fixed in-memory holiday set. `refresh` never fails.
#[derive(Debug, Clone, Default)]
pub struct StaticHolidays {
    dates: HashSet<NaiveDate>,
}

impl StaticHolidays {
    pub fn new<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl HolidayCalendar for StaticHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

#[async_trait]
impl HolidayProvider for StaticHolidays {
    async fn refresh(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RemoteHolidaysOptions {
    pub cache_ttl: Duration,
    pub timeout: Duration,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for RemoteHolidaysOptions {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(24 * 60 * 60),
            timeout: Duration::from_secs(10),
            retry_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Default)]
struct HolidayCache {
    dates: HashSet<NaiveDate>,
    fetched_at: Option<Instant>,
}

/// Holiday list fetched over HTTP as a JSON array of `YYYY-MM-DD` strings.
pub struct RemoteHolidays {
    client: Client,
    source_url: String,
    options: RemoteHolidaysOptions,
    extra_dates: HashSet<NaiveDate>,
    cache: RwLock<HolidayCache>,
    refresh_lock: Mutex<()>,
}

impl RemoteHolidays {
    pub fn new(source_url: String, options: RemoteHolidaysOptions) -> Result<Self> {
        let client = Client::builder().timeout(options.timeout).build()?;
        Ok(Self {
            client,
            source_url,
            options,
            extra_dates: HashSet::new(),
            cache: RwLock::new(HolidayCache::default()),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Dates that are always holidays, on top of whatever the source returns.
    pub fn with_extra_dates<I: IntoIterator<Item = NaiveDate>>(mut self, dates: I) -> Self {
        self.extra_dates.extend(dates);
        self
    }

    pub fn cached_len(&self) -> usize {
        self.cache.read().map(|c| c.dates.len()).unwrap_or(0)
    }

    fn is_fresh(&self) -> bool {
        match self.cache.read() {
            Ok(cache) => cache
                .fetched_at
                .map(|at| at.elapsed() < self.options.cache_ttl)
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    fn has_cached_dates(&self) -> bool {
        self.cache
            .read()
            .map(|c| c.fetched_at.is_some())
            .unwrap_or(false)
    }

    async fn fetch_once(&self) -> Result<HashSet<NaiveDate>> {
        tracing::debug!("Fetching holidays from: {}", self.source_url);
        let response = self.client.get(&self.source_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HolidaySource {
                message: format!("holiday source returned HTTP {}", status),
            });
        }

        let entries: Vec<String> = response.json().await?;
        Ok(parse_holiday_dates(&entries))
    }

    async fn fetch_with_retry(&self) -> Result<HashSet<NaiveDate>> {
        let attempts = self.options.retry_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.fetch_once().await {
                Ok(dates) => return Ok(dates),
                Err(e) => {
                    tracing::warn!(
                        "Holiday fetch attempt {}/{} failed: {}",
                        attempt,
                        attempts,
                        e
                    );
                    last_error = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(self.options.retry_delay).await;
                    }
                }
            }
        }

        Err(match last_error {
            Some(AppError::HolidaySource { message }) => AppError::HolidaySource { message },
            Some(other) => AppError::HolidaySource {
                message: other.to_string(),
            },
            None => AppError::HolidaySource {
                message: "no fetch attempted".to_string(),
            },
        })
    }
}

impl HolidayCalendar for RemoteHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        if self.extra_dates.contains(&date) {
            return true;
        }
        self.cache
            .read()
            .map(|c| c.dates.contains(&date))
            .unwrap_or(false)
    }
}

#[async_trait]
impl HolidayProvider for RemoteHolidays {
    async fn refresh(&self) -> Result<()> {
        if self.is_fresh() {
            return Ok(());
        }

        // 同一時間只允許一個請求去抓取
        let _guard = self.refresh_lock.lock().await;
        if self.is_fresh() {
            return Ok(());
        }

        match self.fetch_with_retry().await {
            Ok(dates) => {
                tracing::info!("Loaded {} holidays from {}", dates.len(), self.source_url);
                let mut cache = self.cache.write().map_err(|_| AppError::HolidaySource {
                    message: "holiday cache lock poisoned".to_string(),
                })?;
                cache.dates = dates;
                cache.fetched_at = Some(Instant::now());
                Ok(())
            }
            Err(e) if self.has_cached_dates() => {
                tracing::warn!("Keeping stale holiday list after refresh failure: {}", e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Parses `YYYY-MM-DD` entries, skipping anything else.
///
/// Entries carrying a time part (`2024-06-11T00:00:00`) keep only the date.
pub fn parse_holiday_dates(entries: &[String]) -> HashSet<NaiveDate> {
    entries
        .iter()
        .filter_map(|entry| {
            let date_part = entry.trim().get(..10).unwrap_or(entry.as_str());
            match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    tracing::warn!("Skipping unparseable holiday entry: {:?}", entry);
                    None
                }
            }
        })
        .collect()
}
