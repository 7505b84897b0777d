use async_trait::async_trait;
use pickadrive_application::AttemptLogStore;
use pickadrive_core::AppResult;
use pickadrive_domain::AttemptLog;
use tokio::sync::RwLock;

/// In-memory attempt log store. Quotas reset when the process exits.
#[derive(Default)]
pub struct InMemoryAttemptLogStore {
    stored: RwLock<Option<AttemptLog>>,
}

impl InMemoryAttemptLogStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttemptLogStore for InMemoryAttemptLogStore {
    async fn load(&self) -> AppResult<Option<AttemptLog>> {
        Ok(self.stored.read().await.clone())
    }

    async fn save(&self, log: &AttemptLog) -> AppResult<()> {
        *self.stored.write().await = Some(log.clone());
        Ok(())
    }
}
