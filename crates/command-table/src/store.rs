//! Live rules snapshot with atomic reload.

use crate::error::RulesError;
use crate::types::RulesSnapshot;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

/// Holds the current [`RulesSnapshot`] and swaps it wholesale on reload.
///
/// Readers clone the `Arc` and keep working on that snapshot even if a
/// reload lands in the meantime. A reload that fails validation leaves the
/// previous snapshot in place.
#[derive(Clone)]
pub struct RulesStore {
    current: Arc<RwLock<Arc<RulesSnapshot>>>,
    path: PathBuf,
}

impl RulesStore {
    /// Load the rules file at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, RulesError> {
        let path = path.into();
        let snapshot = RulesSnapshot::load(&path).await?;
        info!(
            path = %path.display(),
            groups = snapshot.commands.len(),
            channels = snapshot.channels.len(),
            "Loaded rules"
        );
        Ok(Self::with_snapshot(snapshot, path))
    }

    /// Wrap an already-built snapshot. Reloads read from `path`.
    pub fn with_snapshot(snapshot: RulesSnapshot, path: impl Into<PathBuf>) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(snapshot))),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The live snapshot.
    pub async fn snapshot(&self) -> Arc<RulesSnapshot> {
        self.current.read().await.clone()
    }

    /// Re-read the rules file and swap it in.
    ///
    /// Returns whether the content differs from what was live.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn reload(&self) -> Result<bool, RulesError> {
        let snapshot = match RulesSnapshot::load(&self.path).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Rejected rules reload, keeping previous rules");
                return Err(e);
            }
        };

        let changed = self.replace(snapshot).await;
        info!(changed, "Reloaded rules");
        Ok(changed)
    }

    /// Swap in a new snapshot. Returns whether it differs from the old one.
    pub async fn replace(&self, snapshot: RulesSnapshot) -> bool {
        let mut current = self.current.write().await;
        let changed = **current != snapshot;
        *current = Arc::new(snapshot);
        changed
    }
}
