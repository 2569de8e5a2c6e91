use crate::error::{Result, ShutdownError};
use crate::population::Roster;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Saves server state before the process goes away
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Persist the current state. With `blocking` the call returns only once
    /// the state is durable.
    async fn save_state(&self, blocking: bool) -> Result<()>;
}

/// On-disk form of the server state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub saved_at: DateTime<Utc>,
    pub online: Vec<String>,
    pub visits: BTreeMap<String, u32>,
}

impl WorldSnapshot {
    pub fn capture(roster: &Roster) -> Self {
        Self {
            saved_at: Utc::now(),
            online: roster.online(),
            visits: roster.visits(),
        }
    }

    pub async fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Writes a JSON [`WorldSnapshot`] of the roster to a file
pub struct SnapshotStore {
    path: PathBuf,
    roster: Arc<Roster>,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>, roster: Arc<Roster>) -> Self {
        Self {
            path: path.into(),
            roster,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_snapshot(path: PathBuf, snapshot: WorldSnapshot) -> Result<()> {
        let json = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write next to the target and rename so a crash never leaves a torn file
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &json).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        debug!(
            "Wrote snapshot to {} ({} bytes)",
            path.display(),
            json.len()
        );
        Ok(())
    }
}

#[async_trait]
impl Persistence for SnapshotStore {
    async fn save_state(&self, blocking: bool) -> Result<()> {
        let snapshot = WorldSnapshot::capture(&self.roster);
        let path = self.path.clone();

        if blocking {
            Self::write_snapshot(path, snapshot).await.map_err(|e| {
                ShutdownError::persistence(format!(
                    "failed to write {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
            info!("World snapshot saved to {}", self.path.display());
        } else {
            tokio::spawn(async move {
                let target = path.display().to_string();
                if let Err(e) = Self::write_snapshot(path, snapshot).await {
                    warn!("Background snapshot to {} failed: {}", target, e);
                }
            });
        }

        Ok(())
    }
}
