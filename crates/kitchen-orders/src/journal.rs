//! Durable order records: one JSON file per order in the data directory.
//!
//! The journal is the order actor's context. Each write lands in `<id>.json.tmp` first and
//! is then renamed over `<id>.json`, so a reader (or a restart) sees either the old record
//! or the new one, never a torn file.

use crate::model::{Order, OrderId, OrderRecord};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

const RECORD_EXT: &str = "json";
const TEMP_EXT: &str = "json.tmp";

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not encode order {id}: {source}")]
    Encode {
        id: OrderId,
        #[source]
        source: serde_json::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> JournalError + '_ {
    move |source| JournalError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Handle to the order files. Cheap to clone; the in-memory variant persists nothing.
#[derive(Debug, Clone, Default)]
pub struct OrderJournal {
    dir: Option<Arc<PathBuf>>,
}

impl OrderJournal {
    /// A journal that accepts every write and keeps nothing.
    pub fn in_memory() -> Self {
        Self { dir: None }
    }

    /// Opens (creating if needed) the journal directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(io_error(&dir))?;
        info!(dir = %dir.display(), "Order journal opened");
        Ok(Self {
            dir: Some(Arc::new(dir)),
        })
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref().map(PathBuf::as_path)
    }

    fn record_path(dir: &Path, id: &OrderId) -> PathBuf {
        dir.join(format!("{}.{}", id, RECORD_EXT))
    }

    /// Reads every stored order.
    ///
    /// Files that are not named `<uuid>.json` or do not hold a valid record are skipped with
    /// a warning; a single bad file must not keep the kitchen from starting.
    pub async fn load(&self) -> Result<Vec<Order>, JournalError> {
        let Some(dir) = self.dir() else {
            return Ok(Vec::new());
        };

        let mut orders = Vec::new();
        let mut entries = fs::read_dir(dir).await.map_err(io_error(dir))?;
        while let Some(entry) = entries.next_entry().await.map_err(io_error(dir))? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<OrderId>().ok())
            else {
                warn!(path = %path.display(), "Skipping file with a non-order name");
                continue;
            };

            let bytes = fs::read(&path).await.map_err(io_error(&path))?;
            let order = serde_json::from_slice::<OrderRecord>(&bytes)
                .map_err(|e| e.to_string())
                .and_then(|record| record.into_order(id).map_err(|e| e.to_string()));
            match order {
                Ok(order) => orders.push(order),
                Err(error) => warn!(path = %path.display(), %error, "Skipping unreadable order"),
            }
        }

        info!(dir = %dir.display(), count = orders.len(), "Orders loaded");
        Ok(orders)
    }

    /// Writes the full record of `order`, replacing any previous version.
    pub async fn write(&self, order: &Order) -> Result<(), JournalError> {
        let Some(dir) = self.dir() else {
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(&OrderRecord::from_order(order))
            .map_err(|source| JournalError::Encode {
                id: order.id,
                source,
            })?;
        let tmp = dir.join(format!("{}.{}", order.id, TEMP_EXT));
        let path = Self::record_path(dir, &order.id);

        fs::write(&tmp, &bytes).await.map_err(io_error(&tmp))?;
        fs::rename(&tmp, &path).await.map_err(io_error(&path))?;
        debug!(id = %order.id, status = order.status.label(), "Order written");
        Ok(())
    }

    /// Removes the record of `id`. A file that is already gone counts as removed.
    pub async fn remove(&self, id: &OrderId) -> Result<(), JournalError> {
        let Some(dir) = self.dir() else {
            return Ok(());
        };

        let path = Self::record_path(dir, id);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(%id, "Order removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path)(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LineItem, OrderCreate};
    use chrono::Utc;

    fn order() -> Order {
        let params = OrderCreate::new("6", vec![LineItem::new("Gnocchi")], Utc::now()).unwrap();
        Order::new(OrderId::new(), params)
    }

    #[tokio::test]
    async fn test_write_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let journal = OrderJournal::open(dir.path()).await.unwrap();
        let order = order();

        journal.write(&order).await.unwrap();
        assert!(dir.path().join(format!("{}.json", order.id)).is_file());
        assert!(!dir.path().join(format!("{}.json.tmp", order.id)).exists());
        assert_eq!(journal.load().await.unwrap(), vec![order.clone()]);

        journal.remove(&order.id).await.unwrap();
        journal.remove(&order.id).await.unwrap();
        assert!(journal.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_journal_keeps_nothing() {
        let journal = OrderJournal::in_memory();
        assert_eq!(journal.dir(), None);
        journal.write(&order()).await.unwrap();
        assert!(journal.load().await.unwrap().is_empty());
    }
}
