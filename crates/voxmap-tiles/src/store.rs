//! On-disk tile cache with atomic replace.
//!
//! Layout: `<root>/<world>/<view>/<tx>_<tz>.png`. Existence of the file is the
//! only metadata; there is no index and nothing is ever evicted.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::key::TileKey;

/// Errors from the tile store.
#[derive(Debug, Error)]
pub enum TileStoreError {
    /// The world name cannot be used as a directory name.
    #[error("invalid world name '{0}'")]
    InvalidWorldName(String),
    /// A filesystem operation failed.
    #[error("tile store I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TileStoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Returns `true` if `name` is safe to use as a single path component:
/// non-empty, not `.`/`..`, and only `[A-Za-z0-9_.+-]`.
pub fn is_valid_world_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-'))
}

/// Durable cache of rendered tiles.
pub struct TileStore {
    root: PathBuf,
}

impl TileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic path of `key`'s tile. Touches nothing on disk.
    pub fn tile_path(&self, key: &TileKey) -> Result<PathBuf, TileStoreError> {
        if !is_valid_world_name(key.world()) {
            return Err(TileStoreError::InvalidWorldName(key.world().to_string()));
        }
        Ok(self
            .root
            .join(key.world())
            .join(key.view().as_str())
            .join(format!("{}_{}.png", key.tile_x(), key.tile_z())))
    }

    /// Writes `bytes` to `path` so readers see either the old file or the
    /// complete new one.
    ///
    /// The containing directory is created on first save. The bytes go to a
    /// uniquely named temporary file in that directory, which is then renamed
    /// over `path`. Concurrent saves of one path never share a temporary file;
    /// the last rename wins.
    pub fn save(&self, bytes: &[u8], path: &Path) -> Result<(), TileStoreError> {
        let dir = path.parent().unwrap_or(&self.root);
        std::fs::create_dir_all(dir).map_err(|e| TileStoreError::io(dir, e))?;
        let mut tmp = tempfile::Builder::new()
            .prefix(".tile-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| TileStoreError::io(dir, e))?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.flush())
            .map_err(|e| TileStoreError::io(tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| TileStoreError::io(path, e.error))?;
        Ok(())
    }

    /// Reads the tile at `path`; `Ok(None)` if nothing is cached there.
    pub fn load(&self, path: &Path) -> Result<Option<Vec<u8>>, TileStoreError> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TileStoreError::io(path, e)),
        }
    }

    pub fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use voxmap_render::View;

    #[test]
    fn test_tile_path_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = TileStore::new(dir.path());
        let key = TileKey::new("Main", View::Isometric, 3, 7);

        let path = store.tile_path(&key).unwrap();
        assert_eq!(path, dir.path().join("main").join("isometric").join("3_7.png"));
        assert_eq!(store.tile_path(&key).unwrap(), path);
        // Resolving a path leaves the root untouched.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_world_name_validation() {
        assert!(is_valid_world_name("main"));
        assert!(is_valid_world_name("build_2.v1+old-copy"));
        for bad in ["", ".", "..", "a/b", "a\\b", "with space", "c:"] {
            assert!(!is_valid_world_name(bad), "{bad:?} accepted");
        }

        let dir = tempfile::tempdir().unwrap();
        let store = TileStore::new(dir.path());
        let err = store
            .tile_path(&TileKey::new("..", View::TopDown, 0, 0))
            .unwrap_err();
        assert!(matches!(err, TileStoreError::InvalidWorldName(_)));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = TileStore::new(dir.path());
        let path = store
            .tile_path(&TileKey::new("main", View::TopDown, 0, 0))
            .unwrap();

        assert_eq!(store.load(&path).unwrap(), None);
        assert!(!store.exists(&path));

        store.save(b"first", &path).unwrap();
        assert_eq!(store.load(&path).unwrap().as_deref(), Some(&b"first"[..]));

        store.save(b"second version", &path).unwrap();
        assert_eq!(
            store.load(&path).unwrap().as_deref(),
            Some(&b"second version"[..])
        );
    }

    #[test]
    fn test_save_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = TileStore::new(dir.path());
        let path = store
            .tile_path(&TileKey::new("main", View::TopDown, 1, 1))
            .unwrap();
        store.save(b"a", &path).unwrap();
        store.save(b"b", &path).unwrap();

        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("1_1.png")]);
    }

    #[test]
    fn test_save_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = TileStore::new(dir.path());
        let path = store
            .tile_path(&TileKey::new("fresh", View::Isometric, 2, 5))
            .unwrap();
        assert!(!path.parent().unwrap().exists());

        store.save(b"x", &path).unwrap();
        assert_eq!(store.load(&path).unwrap().as_deref(), Some(&b"x"[..]));
    }

    #[test]
    fn test_save_under_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = TileStore::new(dir.path());
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let path = blocker.join("topdown").join("0_0.png");
        assert!(matches!(
            store.save(b"x", &path),
            Err(TileStoreError::Io { .. })
        ));
    }

    #[test]
    fn test_concurrent_saves_never_expose_partial_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(TileStore::new(dir.path()));
        let path = store
            .tile_path(&TileKey::new("main", View::TopDown, 0, 0))
            .unwrap();
        let payloads: Vec<Vec<u8>> = (0..4u8).map(|i| vec![i; 64 * 1024]).collect();

        let writers: Vec<_> = payloads
            .iter()
            .cloned()
            .map(|payload| {
                let store = Arc::clone(&store);
                let path = path.clone();
                thread::spawn(move || {
                    for _ in 0..20 {
                        store.save(&payload, &path).unwrap();
                    }
                })
            })
            .collect();

        for _ in 0..200 {
            if let Some(bytes) = store.load(&path).unwrap() {
                assert!(payloads.contains(&bytes), "observed a torn tile");
            }
        }
        for writer in writers {
            writer.join().unwrap();
        }
        let last = store.load(&path).unwrap().unwrap();
        assert!(payloads.contains(&last));
    }
}
