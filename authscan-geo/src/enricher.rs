//! Geo enrichment of threshold-filtered offenders.
//!
//! Distinct addresses are looked up concurrently, at most `concurrency` at a time,
//! each bounded by `lookup_timeout`. Results (including failures) are cached for
//! the enricher's lifetime, so an address is resolved at most once per run.
//! Every failure mode degrades to [`UNKNOWN_COUNTRY`]; enrichment never fails.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

use authscan_core::{OffenderRecord, UNKNOWN_COUNTRY};
use authscan_telemetry::MetricsRecorder;

use crate::lookup::{GeoLookup, LookupError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnricherOptions {
    pub concurrency: usize,
    pub lookup_timeout: Duration,
}

impl Default for EnricherOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            lookup_timeout: Duration::from_millis(500),
        }
    }
}

pub struct GeoEnricher {
    lookup: Arc<dyn GeoLookup>,
    options: EnricherOptions,
    cache: Mutex<HashMap<String, String>>,
    metrics: Option<Arc<MetricsRecorder>>,
}

impl GeoEnricher {
    pub fn new(lookup: Arc<dyn GeoLookup>, options: EnricherOptions) -> Self {
        Self {
            lookup,
            options,
            cache: Mutex::new(HashMap::new()),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRecorder>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Number of addresses resolved so far.
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }

    /// Attaches a country to every `(address, count)` entry.
    #[instrument(level = "debug", skip_all, fields(entries = entries.len()))]
    pub async fn enrich(&self, entries: Vec<(String, u64)>) -> Vec<OffenderRecord> {
        let mut pending: Vec<String> = {
            let cache = self.cache.lock();
            entries
                .iter()
                .map(|(address, _)| address)
                .filter(|address| !cache.contains_key(*address))
                .cloned()
                .collect()
        };
        pending.sort_unstable();
        pending.dedup();
        debug!(lookups = pending.len(), "Resolving offender origins");

        let permits = Arc::new(Semaphore::new(self.options.concurrency.max(1)));
        let mut tasks = JoinSet::new();
        for address in pending {
            let lookup = Arc::clone(&self.lookup);
            let permits = Arc::clone(&permits);
            let limit = self.options.lookup_timeout;
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let started = Instant::now();
                let result = resolve(lookup.as_ref(), &address, limit).await;
                (address, result, started.elapsed())
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (address, result, elapsed) = match joined {
                Ok(done) => done,
                Err(e) => {
                    // The address stays uncached and falls back to Unknown below.
                    warn!("Geo lookup task failed: {e}");
                    continue;
                }
            };
            if let Some(metrics) = &self.metrics {
                metrics.lookup_latency.observe(elapsed.as_secs_f64());
            }

            let country = match result {
                Ok(Some(country)) => country,
                Ok(None) => UNKNOWN_COUNTRY.to_string(),
                Err(e) => {
                    warn!(address = %address, "{e}");
                    if let Some(metrics) = &self.metrics {
                        metrics.lookup_failures.inc();
                    }
                    UNKNOWN_COUNTRY.to_string()
                }
            };
            self.cache.lock().insert(address, country);
        }

        let cache = self.cache.lock();
        entries
            .into_iter()
            .map(|(address, count)| {
                let country = cache.get(&address).cloned();
                OffenderRecord::new(address, count, country)
            })
            .collect()
    }
}

async fn resolve(
    lookup: &dyn GeoLookup,
    address: &str,
    limit: Duration,
) -> Result<Option<String>, LookupError> {
    match tokio::time::timeout(limit, lookup.lookup(address)).await {
        Ok(result) => result.map(|record| record.and_then(|r| r.label())),
        Err(_) => Err(LookupError::Timeout(limit)),
    }
}
