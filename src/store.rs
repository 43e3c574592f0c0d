// Persistent result store: one JSON file keyed by destination name.
// Rewritten after every destination so progress survives interruption.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::ConfirmedTrip;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct ResultStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, Vec<ConfirmedTrip>>>,
}

impl ResultStore {
    // A missing file is a fresh run; a corrupt file is demoted to empty
    // with a warning so the run can still proceed.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, Vec<ConfirmedTrip>>>(&raw) {
                Ok(entries) => {
                    info!(destinations = entries.len(), "loaded existing results");
                    entries
                }
                Err(error) => {
                    warn!(%error, path = %path.display(), "results file unreadable, starting empty");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    pub fn contains(&self, destination: &str) -> bool {
        self.entries.read().contains_key(destination)
    }

    pub fn get(&self, destination: &str) -> Option<Vec<ConfirmedTrip>> {
        self.entries.read().get(destination).cloned()
    }

    pub fn put(&self, destination: &str, trips: Vec<ConfirmedTrip>) -> Result<(), StoreError> {
        let mut entries = self.entries.write();
        entries.insert(destination.to_string(), trips);

        let encoded = serde_json::to_string_pretty(&*entries)?;
        fs::write(&self.path, encoded)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn snapshot(&self) -> BTreeMap<String, Vec<ConfirmedTrip>> {
        self.entries.read().clone()
    }
}
