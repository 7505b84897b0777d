use async_trait::async_trait;
use pickadrive_core::AppResult;
use pickadrive_domain::{AttemptLog, ClientKey, RequestContext};

/// Repository port for the durable attempt log.
#[async_trait]
pub trait AttemptLogStore: Send + Sync {
    /// Reads the whole log.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet and an error when
    /// stored content cannot be read or decoded.
    async fn load(&self) -> AppResult<Option<AttemptLog>>;

    /// Replaces the stored log with `log`.
    ///
    /// Implementations must never leave a partially written log behind.
    async fn save(&self, log: &AttemptLog) -> AppResult<()>;
}

/// Wall clock port.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Port turning request attributes into an admission bucket.
pub trait ClientKeyDeriver: Send + Sync {
    /// Derives the key a request is counted under.
    fn derive_key(&self, context: &RequestContext) -> ClientKey;
}

/// Default key scheme: network origin joined with the agent string.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressAgentKeyDeriver;

impl ClientKeyDeriver for AddressAgentKeyDeriver {
    fn derive_key(&self, context: &RequestContext) -> ClientKey {
        ClientKey::from(context)
    }
}
