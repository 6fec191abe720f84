use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::form::Submission;

/// Fixed key under which the whole submission collection is persisted.
pub const SUBMISSIONS_KEY: &str = "submissions.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored submission data is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Minimal get/put surface over the backing object store.
pub trait ObjectStore: Send + Sync {
    /// Fetches the object at `key`. `Ok(None)` means the object does not
    /// exist; transport failures are reported as errors, never as absence.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Overwrites the object at `key` with `bytes`.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Object store backed by a local directory, one file per key.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ObjectStore for FsStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match std::fs::read(self.root.join(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.root.join(key), bytes)?;
        Ok(())
    }
}

/// The persisted submission collection, stored as one JSON array object.
///
/// Mutations are whole-collection read-modify-write with no locking: two
/// concurrent submits can race and the last writer wins. Accepted at
/// classroom-scale load.
#[derive(Clone)]
pub struct SubmissionStore {
    store: Arc<dyn ObjectStore>,
}

impl SubmissionStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Loads the full collection. An absent backing object is an empty
    /// collection; any other failure propagates.
    pub fn load(&self) -> Result<Vec<Submission>, StoreError> {
        match self.store.get(SUBMISSIONS_KEY)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    /// Overwrites the backing object with the full serialized collection.
    pub fn save(&self, submissions: &[Submission]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(submissions)?;
        self.store.put(SUBMISSIONS_KEY, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{build_submission, SubmitRequest};

    fn sample_request(name: &str) -> SubmitRequest {
        SubmitRequest {
            full_name: name.to_string(),
            form_class: "8C".to_string(),
            story: "Short story text.".to_string(),
            word_count: 3,
        }
    }

    fn temp_store() -> (tempfile::TempDir, SubmissionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SubmissionStore::new(Arc::new(FsStore::new(dir.path())));
        (dir, store)
    }

    #[test]
    fn absent_object_loads_as_empty_collection() {
        let (_dir, store) = temp_store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = temp_store();
        let submissions = vec![
            build_submission(sample_request("Ada Lovelace")),
            build_submission(sample_request("Mary Shelley")),
        ];
        store.save(&submissions).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].full_name, "Ada Lovelace");
        assert_eq!(loaded[1].full_name, "Mary Shelley");

        // Persisting an unchanged loaded collection yields an identical
        // collection on the next load.
        store.save(&loaded).unwrap();
        let reloaded = store.load().unwrap();
        assert_eq!(
            serde_json::to_value(&loaded).unwrap(),
            serde_json::to_value(&reloaded).unwrap()
        );
    }

    #[test]
    fn corrupt_object_is_an_error_not_empty() {
        let (dir, store) = temp_store();
        std::fs::write(dir.path().join(SUBMISSIONS_KEY), b"not json").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn fs_get_distinguishes_absence_from_data() {
        let dir = tempfile::tempdir().unwrap();
        let fs = FsStore::new(dir.path());
        assert!(fs.get("missing.json").unwrap().is_none());
        fs.put("present.json", b"[]").unwrap();
        assert_eq!(fs.get("present.json").unwrap().unwrap(), b"[]");
    }
}
