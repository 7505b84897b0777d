use std::sync::Arc;
use std::time::Duration;

use pickadrive_application::{AdmissionGate, AttemptLogStore};
use pickadrive_infrastructure::{InMemoryAttemptLogStore, JsonFileAttemptLogStore, SystemClock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api_config::{AdmissionStoreConfig, ApiConfig};

pub(super) async fn build_admission_gate(config: &ApiConfig) -> AdmissionGate {
    let store: Arc<dyn AttemptLogStore> = match &config.admission_store {
        AdmissionStoreConfig::JsonFile(path) => {
            info!(path = %path.display(), "using json file admission store");
            Arc::new(JsonFileAttemptLogStore::new(path.clone()))
        }
        AdmissionStoreConfig::InMemory => {
            info!("using in-memory admission store");
            Arc::new(InMemoryAttemptLogStore::new())
        }
    };

    AdmissionGate::load(store, Arc::new(SystemClock::new()), config.admission_policy).await
}

/// Periodically drops attempts that left the window so idle clients do not
/// accumulate in the log.
pub fn spawn_admission_purge(gate: AdmissionGate, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            if let Err(error) = gate.purge_expired().await {
                warn!(%error, "admission log purge failed");
            }
        }
    })
}
