use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::fs;
use tokio::sync::{Mutex as RecordMutex, OwnedMutexGuard};

use crate::errors::ApiError;
use crate::state::pin::Pin;

/// File-backed pin store: one pretty-printed JSON record per pin, named
/// `<id>.json` under `dir`.
///
/// Every mutation is a whole-record read → modify → write. Concurrent writers
/// on the same id are serialized by a per-record async lock; operations that
/// touch two records take both locks in lexicographic id order. A crash
/// between the two writes of a two-record operation can leave the endpoints
/// inconsistent; accepted limitation of the flat-file layout.
#[derive(Clone)]
pub struct PinStore {
    dir: PathBuf,
    locks: Arc<Mutex<HashMap<String, Arc<RecordMutex<()>>>>>,
}

impl PinStore {
    /// Open (and create if needed) the record directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        tracing::info!("Using pins directory: {}", dir.display());

        Ok(Self {
            dir,
            locks: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Record ids come from URLs, so they are sanity-checked before being
    /// used as file names.
    fn record_path(&self, id: &str) -> Result<PathBuf, ApiError> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ApiError::Validation(format!("Invalid pin id: {id}")));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    /// Acquire the per-record lock for `id`. Hold the guard across the whole
    /// read-modify-write.
    pub async fn lock_record(&self, id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            locks
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(RecordMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Acquire both record locks in lexicographic id order so concurrent
    /// two-record operations cannot deadlock. Callers must pass distinct ids;
    /// the same id twice would block on its own lock.
    pub async fn lock_pair(&self, a: &str, b: &str) -> (OwnedMutexGuard<()>, OwnedMutexGuard<()>) {
        debug_assert_ne!(a, b);
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let g1 = self.lock_record(first).await;
        let g2 = self.lock_record(second).await;
        (g1, g2)
    }

    pub async fn exists(&self, id: &str) -> bool {
        match self.record_path(id) {
            Ok(path) => fs::metadata(path).await.is_ok(),
            Err(_) => false,
        }
    }

    pub async fn read(&self, id: &str) -> Result<Pin, ApiError> {
        let path = self.record_path(id)?;
        let data = match fs::read_to_string(&path).await {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ApiError::NotFound(format!("Pin not found: {id}")))
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str::<Pin>(&data)?)
    }

    pub async fn write(&self, pin: &Pin) -> Result<(), ApiError> {
        let path = self.record_path(&pin.id)?;
        let json = serde_json::to_string_pretty(pin)?;
        fs::write(&path, json).await?;
        Ok(())
    }

    /// Remove the record file; NotFound every time the id is absent.
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let path = self.record_path(id)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                self.locks.lock().unwrap().remove(id);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ApiError::NotFound(format!("Pin not found: {id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fresh directory scan, unordered. Unreadable or unparseable records are
    /// skipped with a warning rather than failing the whole listing.
    pub async fn scan(&self) -> Result<Vec<Pin>, ApiError> {
        let mut pins = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let data = match fs::read_to_string(&path).await {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!("Failed to read record {}: {e}", path.display());
                    continue;
                }
            };

            match serde_json::from_str::<Pin>(&data) {
                Ok(pin) => pins.push(pin),
                Err(e) => {
                    tracing::warn!("Failed to parse record {}: {e}", path.display());
                }
            }
        }

        Ok(pins)
    }
}
