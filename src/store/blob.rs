//! Photo storage for harvest records.
//!
//! The store accepts a local file, keeps a copy, and hands back an opaque
//! URL string. It never inspects file contents.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;
use uuid::Uuid;

/// Stores an uploaded photo and returns an opaque reference to it.
pub trait BlobStore: Send {
    /// Copy the file at `source` into the store; returns an opaque URL.
    fn store(&mut self, source: &Path) -> Result<String>;
}

/// Blob store backed by a local directory.
///
/// Each stored photo gets a fresh name so repeated uploads of the same
/// file never collide.
#[derive(Debug)]
pub struct DirBlobStore {
    root: PathBuf,
}

impl DirBlobStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The directory photos are copied into.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BlobStore for DirBlobStore {
    fn store(&mut self, source: &Path) -> Result<String> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create {}", self.root.display()))?;

        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg");
        let name = format!("{}.{}", Uuid::new_v4(), extension);
        let dest = self.root.join(&name);

        fs::copy(source, &dest)
            .with_context(|| format!("Failed to copy {} into photo store", source.display()))?;
        debug!(photo = %dest.display(), "stored harvest photo");

        Ok(format!("file://{}", dest.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_store_copies_and_returns_url() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("photo.png");
        let mut f = fs::File::create(&source).unwrap();
        f.write_all(b"not really a png").unwrap();

        let mut store = DirBlobStore::new(dir.path().join("photos"));
        let url = store.store(&source).unwrap();

        assert!(url.starts_with("file://"));
        assert!(url.ends_with(".png"));

        // Two uploads of the same file get distinct references
        let url2 = store.store(&source).unwrap();
        assert_ne!(url, url2);
    }

    #[test]
    fn test_store_missing_source_fails() {
        let dir = tempdir().unwrap();
        let mut store = DirBlobStore::new(dir.path().join("photos"));
        assert!(store.store(Path::new("/nonexistent/photo.jpg")).is_err());
    }
}
