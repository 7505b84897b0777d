use std::sync::Arc;

use pickadrive_core::{AppError, AppResult};
use pickadrive_domain::{AdmissionDecision, AdmissionPolicy, AttemptLog, ClientKey, PurgeSummary};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::ports::{AttemptLogStore, Clock};

/// Application service deciding whether a client may perform the gated action.
///
/// Every check runs prune, decide, append and persist under one lock, so
/// concurrent checks for a key never both see the same pre-append count.
#[derive(Clone)]
pub struct AdmissionGate {
    log: Arc<Mutex<AttemptLog>>,
    store: Arc<dyn AttemptLogStore>,
    clock: Arc<dyn Clock>,
    policy: AdmissionPolicy,
}

impl AdmissionGate {
    /// Creates a gate and loads its log from `store`.
    ///
    /// A missing log starts empty. An unreadable or malformed log is logged
    /// and also starts empty; loading never fails.
    pub async fn load(
        store: Arc<dyn AttemptLogStore>,
        clock: Arc<dyn Clock>,
        policy: AdmissionPolicy,
    ) -> Self {
        let log = match store.load().await {
            Ok(Some(mut log)) => {
                log.normalize();
                info!(keys = log.len(), "admission log loaded");
                log
            }
            Ok(None) => {
                info!("no admission log stored yet, starting empty");
                AttemptLog::new()
            }
            Err(error) => {
                warn!(%error, "admission log unreadable, starting empty");
                AttemptLog::new()
            }
        };

        Self::with_log(log, store, clock, policy)
    }

    /// Creates a gate around an already loaded log.
    #[must_use]
    pub fn with_log(
        log: AttemptLog,
        store: Arc<dyn AttemptLogStore>,
        clock: Arc<dyn Clock>,
        policy: AdmissionPolicy,
    ) -> Self {
        Self {
            log: Arc::new(Mutex::new(log)),
            store,
            clock,
            policy,
        }
    }

    /// Policy applied by this gate.
    #[must_use]
    pub fn policy(&self) -> AdmissionPolicy {
        self.policy
    }

    /// Evaluates an attempt for `key` at the current clock time.
    pub async fn evaluate(&self, key: &ClientKey) -> AdmissionDecision {
        self.evaluate_at(key, self.clock.now_millis()).await
    }

    /// Evaluates an attempt for `key` at `now_ms`.
    ///
    /// Denials only prune in memory and do not write the store. An admission
    /// reaches the in-memory log only after its save settles, so cancelling
    /// the call mid-save never leaves an unpersisted attempt behind.
    pub async fn evaluate_at(&self, key: &ClientKey, now_ms: i64) -> AdmissionDecision {
        let mut log = self.log.lock().await;
        let window_ms = self.policy.window_ms();
        let live_attempts = log.prune(key, now_ms, window_ms);
        let max_attempts =
            usize::try_from(self.policy.max_attempts_per_window()).unwrap_or(usize::MAX);

        if live_attempts >= max_attempts {
            let retry_after_ms = log.oldest(key).map_or(0, |oldest| {
                u64::try_from(oldest.saturating_add(window_ms).saturating_sub(now_ms))
                    .unwrap_or(0)
            });
            debug!(client_key = %key, live_attempts, retry_after_ms, "admission denied");
            return AdmissionDecision::Denied { retry_after_ms };
        }

        let mut candidate = log.clone();
        candidate.record(key, now_ms);

        match self.store.save(&candidate).await {
            Ok(()) => {
                *log = candidate;
                debug!(client_key = %key, live_attempts = live_attempts + 1, "admission granted");
                AdmissionDecision::Admitted
            }
            Err(store_error) => {
                let reason = store_error.to_string();
                let admitted = self.policy.fail_open();
                if admitted {
                    *log = candidate;
                }
                error!(
                    client_key = %key,
                    error = %reason,
                    fail_open = admitted,
                    "failed to persist admission log"
                );
                AdmissionDecision::PersistenceFailed { admitted, reason }
            }
        }
    }

    /// Evaluates an attempt and maps the decision onto application errors.
    ///
    /// Denials become `AppError::RateLimited` with the client-facing quota
    /// message. A persistence failure is an error only in fail-closed mode,
    /// and its store details are logged rather than returned.
    pub async fn check_admission(&self, key: &ClientKey) -> AppResult<()> {
        match self.evaluate(key).await {
            AdmissionDecision::Admitted => Ok(()),
            AdmissionDecision::Denied { retry_after_ms } => Err(AppError::RateLimited {
                message: self.policy.limit_message(),
                retry_after_ms,
            }),
            AdmissionDecision::PersistenceFailed { admitted: true, .. } => Ok(()),
            AdmissionDecision::PersistenceFailed {
                admitted: false, ..
            } => Err(AppError::Internal("failed to record admission".to_owned())),
        }
    }

    /// Number of attempts for `key` still inside the window at `now_ms`.
    pub async fn attempts_in_window_at(&self, key: &ClientKey, now_ms: i64) -> usize {
        let window_ms = self.policy.window_ms();
        self.log
            .lock()
            .await
            .attempts(key)
            .iter()
            .filter(|&&timestamp| now_ms.saturating_sub(timestamp) < window_ms)
            .count()
    }

    /// Sweeps expired attempts at the current clock time.
    pub async fn purge_expired(&self) -> AppResult<PurgeSummary> {
        self.purge_expired_at(self.clock.now_millis()).await
    }

    /// Sweeps attempts expired at `now_ms` and drops emptied keys.
    ///
    /// The store is rewritten only when something was removed.
    pub async fn purge_expired_at(&self, now_ms: i64) -> AppResult<PurgeSummary> {
        let mut log = self.log.lock().await;
        let summary = log.purge_expired(now_ms, self.policy.window_ms());

        if !summary.is_noop() {
            self.store.save(&log).await?;
            info!(
                expired_attempts = summary.expired_attempts,
                dropped_keys = summary.dropped_keys,
                "admission log purged"
            );
        }

        Ok(summary)
    }

    /// Writes the current in-memory log to the store.
    pub async fn flush(&self) -> AppResult<()> {
        let log = self.log.lock().await;
        self.store.save(&log).await?;
        debug!(keys = log.len(), "admission log flushed");
        Ok(())
    }
}
