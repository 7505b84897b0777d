//! JSON file-backed attempt log store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pickadrive_application::AttemptLogStore;
use pickadrive_core::{AppError, AppResult};
use pickadrive_domain::AttemptLog;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

/// File implementation of the attempt log store port.
///
/// The log is stored as one pretty-printed JSON object. Saves write a sibling
/// temporary file, sync it and rename it over the target.
#[derive(Debug, Clone)]
pub struct JsonFileAttemptLogStore {
    path: PathBuf,
}

impl JsonFileAttemptLogStore {
    /// Creates a store persisting to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the stored log.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    fn temporary_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("admission-log");
        self.path
            .with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()))
    }

    async fn write_then_rename(&self, temporary: &Path, contents: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::File::create(temporary).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(temporary, &self.path).await
    }
}

#[async_trait]
impl AttemptLogStore for JsonFileAttemptLogStore {
    async fn load(&self) -> AppResult<Option<AttemptLog>> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(AppError::Internal(format!(
                    "failed to read admission log '{}': {error}",
                    self.path.display()
                )));
            }
        };

        serde_json::from_slice::<AttemptLog>(&contents)
            .map(Some)
            .map_err(|error| {
                AppError::Internal(format!(
                    "admission log '{}' is malformed: {error}",
                    self.path.display()
                ))
            })
    }

    async fn save(&self, log: &AttemptLog) -> AppResult<()> {
        let contents = serde_json::to_vec_pretty(log).map_err(|error| {
            AppError::Internal(format!("failed to encode admission log: {error}"))
        })?;

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                AppError::Internal(format!(
                    "failed to create admission log directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }

        let temporary = self.temporary_path();
        if let Err(error) = self.write_then_rename(&temporary, &contents).await {
            if let Err(cleanup_error) = tokio::fs::remove_file(&temporary).await
                && cleanup_error.kind() != ErrorKind::NotFound
            {
                warn!(
                    path = %temporary.display(),
                    error = %cleanup_error,
                    "failed to remove temporary admission log"
                );
            }

            return Err(AppError::Internal(format!(
                "failed to write admission log '{}': {error}",
                self.path.display()
            )));
        }

        Ok(())
    }
}
