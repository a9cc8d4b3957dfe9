//! Payment records keyed by owner identity, mirrored to a flat JSON file.
//!
//! The whole record set is read at startup and rewritten on every edit.
//! Writes go to a sibling temp file first and are renamed into place.


use courier_core::{error::CourierError, shellexpand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Payment text per owner. Cheap to clone; clones share the same records.
#[derive(Clone, Default)]
pub struct PaymentStore {
    records: Arc<RwLock<BTreeMap<String, String>>>,
    path: Option<PathBuf>,
}

impl PaymentStore {
    /// Open the store backed by `path`, loading existing records.
    ///
    /// A missing file is an empty store; it is created on the first edit.
    pub async fn open(path: &str) -> Result<Self, CourierError> {
        let path = PathBuf::from(shellexpand(path));

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    CourierError::Store(format!("failed to create {}: {e}", parent.display()))
                })?;
            }
        }

        let records = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                CourierError::Store(format!("failed to parse {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!(
            "payments: loaded {} record(s) from {}",
            records.len(),
            path.display()
        );

        Ok(Self {
            records: Arc::new(RwLock::new(records)),
            path: Some(path),
        })
    }

    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Store `text` verbatim for `owner`, replacing any previous value,
    /// and persist the full record set.
    pub async fn edit(&self, owner: &str, text: &str) -> Result<(), CourierError> {
        let mut records = self.records.write().await;
        // Only visible to readers once it is on disk.
        let mut updated = records.clone();
        updated.insert(owner.to_string(), text.to_string());
        self.persist(&updated).await?;
        *records = updated;
        debug!("payments: saved record for {owner}");
        Ok(())
    }

    /// Stored text for `owner`.
    pub async fn send(&self, owner: &str) -> Result<String, CourierError> {
        self.records
            .read()
            .await
            .get(owner)
            .cloned()
            .ok_or_else(|| CourierError::NotFound(format!("no payment info saved for {owner}")))
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn persist(&self, records: &BTreeMap<String, String>) -> Result<(), CourierError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(records)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}
