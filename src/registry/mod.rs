// ABOUTME: Agent registry module providing the durable executor catalog
// ABOUTME: Handles catalog loading, atomic snapshot swapping, and executor lookup

pub mod catalog;
pub mod error;

pub use catalog::{Catalog, ComplianceStatus, ExecutorRecord};
pub use error::{RegistryError, Result};

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tokio::fs;
use tracing::{debug, info};

/// Durable catalog of known executors.
///
/// The catalog itself is immutable once loaded; a reload builds a fresh
/// [`Catalog`] and swaps it in atomically, so routing calls that already hold
/// a snapshot keep seeing a consistent view. Registration is owned by an
/// external onboarding process; this type exposes no write path besides
/// `save`, which exists for that process and for tests.
pub struct AgentRegistry {
    catalog: RwLock<Arc<Catalog>>,
    path: Option<PathBuf>,
}

impl AgentRegistry {
    /// Create a registry backed by an in-memory catalog (no durable file).
    pub fn in_memory(catalog: Catalog) -> Self {
        Self {
            catalog: RwLock::new(Arc::new(catalog)),
            path: None,
        }
    }

    /// Load the registry from a persisted catalog file.
    ///
    /// An absent file is the new-system case, not an error: the registry
    /// starts empty and a later `reload` picks up whatever the onboarding
    /// process has written.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let catalog = Self::read_catalog(&path).await?;

        info!(
            "Loaded executor catalog from {} ({} records)",
            path.display(),
            catalog.len()
        );

        Ok(Self {
            catalog: RwLock::new(Arc::new(catalog)),
            path: Some(path),
        })
    }

    /// Re-read the catalog file and swap the snapshot in atomically.
    pub async fn reload(&self) -> Result<()> {
        let Some(ref path) = self.path else {
            debug!("Registry has no backing file, reload is a no-op");
            return Ok(());
        };

        let catalog = Self::read_catalog(path).await?;
        let count = catalog.len();

        let mut guard = self
            .catalog
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(catalog);

        info!("Reloaded executor catalog ({} records)", count);
        Ok(())
    }

    /// Get the current catalog snapshot.
    ///
    /// The returned `Arc` stays valid across reloads; callers doing a burst
    /// of routing should take one snapshot and reuse it.
    pub fn snapshot(&self) -> Arc<Catalog> {
        let guard = self
            .catalog
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Persist the current catalog to the given path.
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let snapshot = self.snapshot();
        let records: Vec<&ExecutorRecord> = snapshot.iter().collect();
        let json = serde_json::to_string_pretty(&records)?;

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(path.as_ref(), json).await?;

        debug!(
            "Saved executor catalog to {} ({} records)",
            path.as_ref().display(),
            snapshot.len()
        );
        Ok(())
    }

    async fn read_catalog(path: &Path) -> Result<Catalog> {
        if !path.exists() {
            debug!(
                "Catalog file {} not found, starting with empty registry",
                path.display()
            );
            return Ok(Catalog::default());
        }

        let content = fs::read_to_string(path).await?;
        let records: Vec<ExecutorRecord> = serde_json::from_str(&content)?;
        Ok(Catalog::from_records(records))
    }
}
