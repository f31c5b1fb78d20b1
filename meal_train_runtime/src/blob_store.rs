//! Durable key-value blob storage.
//!
//! The gateway only needs three operations. `put_batch` must be
//! all-or-nothing: either every entry in the batch becomes visible or
//! none does.
//!
//! `FileBlobStore` layout: one JSON object mapping key to blob text,
//!   <data_dir>/blobs.json
//! rewritten in full on every batch via temp file + fsync + rename.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub trait BlobStore {
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    fn put_batch(&mut self, entries: &[(&str, String)]) -> io::Result<()>;

    fn remove(&mut self, key: &str) -> io::Result<()>;
}

// ── In-memory ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: BTreeMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn put_batch(&mut self, entries: &[(&str, String)]) -> io::Result<()> {
        for (key, value) in entries {
            self.blobs.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.blobs.remove(key);
        Ok(())
    }
}

// ── File-backed ────────────────────────────────────────────────────

pub struct FileBlobStore {
    path: PathBuf,
}

impl FileBlobStore {
    /// Open or create a store in `data_dir`. The blob file itself is
    /// created lazily on first write.
    pub fn open(data_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(data_dir)?;
        Ok(Self {
            path: data_dir.join("blobs.json"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> io::Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Bad blob file: {}", e))
        })
    }

    fn write_all(&self, blobs: &BTreeMap<String, String>) -> io::Result<()> {
        let content = serde_json::to_vec_pretty(blobs)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        write_atomic(&self.path, &content)
    }

    /// Read the current map, treating a corrupt file as empty so it can be
    /// overwritten by the next commit. Other read errors are returned.
    fn read_for_update(&self) -> io::Result<BTreeMap<String, String>> {
        match self.read_all() {
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                tracing::warn!(path = %self.path.display(), "discarding corrupt blob file: {e}");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn put_batch(&mut self, entries: &[(&str, String)]) -> io::Result<()> {
        let mut blobs = self.read_for_update()?;
        for (key, value) in entries {
            blobs.insert((*key).to_string(), value.clone());
        }
        self.write_all(&blobs)
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        let mut blobs = self.read_for_update()?;
        if blobs.remove(key).is_some() {
            self.write_all(&blobs)?;
        }
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path has no parent directory")
    })?;
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let tmp_path = dir.join(format!("{}.tmp", file_name.to_string_lossy()));
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
    }
    fs::rename(tmp_path, path)
}
