//! JSON snapshot persistence: `{ "<collection>": [documents...] }`.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::memory::MemoryStore;
use crate::Document;

type Snapshot = BTreeMap<String, Vec<Document>>;

impl MemoryStore {
    /// Replace the contents of every declared collection found in the file.
    /// Collections missing from the file are left untouched. Returns the
    /// number of documents loaded.
    pub fn load_snapshot(&self, path: &Path) -> Result<usize> {
        let raw = fs::read(path)?;
        let snapshot: Snapshot = serde_json::from_slice(&raw)?;
        let mut loaded = 0;
        for (name, docs) in snapshot {
            match self.data(&name) {
                Ok(data) => {
                    loaded += docs.len();
                    *data.docs.write() = docs;
                }
                Err(_) => warn!(collection = %name, "snapshot has undeclared collection, skipped"),
            }
        }
        info!(path = %path.display(), documents = loaded, "snapshot loaded");
        Ok(loaded)
    }

    /// Write every collection (hidden fields included) atomically.
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        let mut snapshot = Snapshot::new();
        for name in self.collection_names() {
            let data = self.data(&name)?;
            let docs = data.docs.read().clone();
            snapshot.insert(name, docs);
        }

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &snapshot)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;
        info!(path = %path.display(), "snapshot saved");
        Ok(())
    }
}
