use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::domain::monitoring::{DependencyHealth, ProbeError, TableInventory};

/// Round-trips against the external store.
///
/// Implement this for each backing store; the probe owns timing, timeouts and caching.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    /// Cheapest possible query proving the store answers.
    async fn ping(&self) -> anyhow::Result<()>;

    /// Per-table row counts, indexes and foreign keys.
    async fn inventory(&self) -> anyhow::Result<BTreeMap<String, TableInventory>>;
}

struct CachedProbe {
    health: DependencyHealth,
    probed_at: Instant,
}

/// Liveness check for the store with a time-bounded cache.
///
/// Only one round-trip runs at a time. Callers that accept cached data never
/// wait on I/O while a stale snapshot exists; forced callers always wait for a
/// fresh probe.
pub struct DependencyProbe {
    transport: Arc<dyn ProbeTransport>,
    ttl: Duration,
    timeout: Duration,
    cache: RwLock<Option<CachedProbe>>,
    refresh: Mutex<()>,
}

impl DependencyProbe {
    pub fn new(transport: Arc<dyn ProbeTransport>, ttl: Duration, timeout: Duration) -> Self {
        Self {
            transport,
            ttl,
            timeout,
            cache: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Latest snapshot regardless of age, without touching the store.
    pub fn cached(&self) -> Option<DependencyHealth> {
        self.cache.read().as_ref().map(|cached| cached.health.clone())
    }

    fn fresh(&self, max_age: Duration) -> Option<DependencyHealth> {
        self.cache
            .read()
            .as_ref()
            .filter(|cached| cached.probed_at.elapsed() < max_age)
            .map(|cached| cached.health.clone())
    }

    #[instrument(skip(self))]
    pub async fn check(&self, force: bool) -> DependencyHealth {
        if force {
            let _refresh = self.refresh.lock().await;
            return self.refresh_cache().await;
        }
        self.check_within(self.ttl).await
    }

    /// Re-probes after a request failed, unless the last probe is younger
    /// than `min_interval` or another probe is already in flight.
    #[instrument(skip(self))]
    pub async fn recheck(&self, min_interval: Duration) -> DependencyHealth {
        self.check_within(min_interval).await
    }

    async fn check_within(&self, max_age: Duration) -> DependencyHealth {
        if let Some(health) = self.fresh(max_age) {
            debug!("serving cached dependency health");
            return health;
        }

        let _refresh = match self.refresh.try_lock() {
            Ok(guard) => guard,
            Err(_) => match self.cached() {
                Some(stale) => {
                    debug!("refresh in flight, serving stale dependency health");
                    return stale;
                }
                None => self.refresh.lock().await,
            },
        };

        // Another caller may have refreshed while we waited for the lock.
        if let Some(health) = self.fresh(max_age) {
            return health;
        }

        self.refresh_cache().await
    }

    async fn refresh_cache(&self) -> DependencyHealth {
        let health = self.probe().await;
        *self.cache.write() = Some(CachedProbe {
            health: health.clone(),
            probed_at: Instant::now(),
        });
        health
    }

    async fn probe(&self) -> DependencyHealth {
        let started = Instant::now();
        let ping = match tokio::time::timeout(self.timeout, self.transport.ping()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ProbeError::Unavailable(format!("{:#}", e))),
            Err(_) => Err(ProbeError::TimedOut(self.timeout)),
        };
        let latency = started.elapsed();

        if let Err(e) = ping {
            warn!(error = %e, "Database health probe failed");
            return DependencyHealth::failed(e.to_string(), Utc::now());
        }

        let (tables, metadata_error) =
            match tokio::time::timeout(self.timeout, self.transport.inventory()).await {
                Ok(Ok(tables)) => (Some(tables), None),
                Ok(Err(e)) => {
                    let err = ProbeError::Inventory(format!("{:#}", e));
                    warn!(error = %err, "Database inventory unavailable, reporting partial health");
                    (None, Some(err.to_string()))
                }
                Err(_) => {
                    let err = ProbeError::TimedOut(self.timeout);
                    warn!(error = %err, "Database inventory timed out, reporting partial health");
                    (None, Some(err.to_string()))
                }
            };

        debug!(latency_ms = latency.as_millis() as u64, "Database health probe succeeded");
        DependencyHealth::healthy(latency, tables, metadata_error, Utc::now())
    }
}
