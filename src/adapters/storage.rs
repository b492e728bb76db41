use crate::domain::model::WriteMode;
use crate::domain::ports::Storage;
use crate::utils::error::{RouteError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

fn open_read_write(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| RouteError::io(path, e))
}

/// Truncates and rewrites the file through the handle it was read from.
/// A failure while writing leaves the file partially written.
#[derive(Debug)]
pub struct InPlaceFile {
    path: PathBuf,
    file: File,
}

impl InPlaceFile {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = open_read_write(&path)?;
        Ok(Self { path, file })
    }
}

impl Storage for InPlaceFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn reader(&mut self) -> Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(BufReader::new(&self.file)))
    }

    fn replace(&mut self, content: &[u8]) -> Result<()> {
        let path = &self.path;
        self.file.set_len(0).map_err(|e| RouteError::io(path, e))?;
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| RouteError::io(path, e))?;
        self.file
            .write_all(content)
            .map_err(|e| RouteError::io(path, e))?;
        self.file.flush().map_err(|e| RouteError::io(path, e))?;
        Ok(())
    }
}

/// Writes a sibling temp file and renames it over the original, so readers
/// see either the old or the new content. Symlinks are followed: the rename
/// lands on the file the link points to and the link itself is kept.
#[derive(Debug)]
pub struct AtomicFile {
    path: PathBuf,
    target: PathBuf,
    file: File,
}

impl AtomicFile {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = open_read_write(&path)?;
        let target = std::fs::canonicalize(&path).map_err(|e| RouteError::io(&path, e))?;
        if target != path {
            tracing::debug!("{} resolves to {}", path.display(), target.display());
        }
        Ok(Self { path, target, file })
    }

    fn parent_dir(&self) -> &Path {
        match self.target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl Storage for AtomicFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn reader(&mut self) -> Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(BufReader::new(&self.file)))
    }

    fn replace(&mut self, content: &[u8]) -> Result<()> {
        let dir = self.parent_dir().to_path_buf();
        let metadata = self
            .file
            .metadata()
            .map_err(|e| RouteError::io(&self.path, e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| RouteError::io(&dir, e))?;
        tmp.write_all(content).map_err(|e| RouteError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| RouteError::io(tmp.path(), e))?;
        std::fs::set_permissions(tmp.path(), metadata.permissions())
            .map_err(|e| RouteError::io(tmp.path(), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            // Only root may hand the file to another owner.
            let owner = std::os::unix::fs::chown(tmp.path(), Some(metadata.uid()), Some(metadata.gid()));
            if let Err(e) = owner {
                tracing::warn!("Could not keep owner of {}: {}", self.target.display(), e);
            }
        }

        tmp.persist(&self.target).map_err(|e| RouteError::Persist {
            path: self.target.clone(),
            source: e,
        })?;

        #[cfg(unix)]
        {
            if let Ok(parent) = File::open(&dir) {
                let _ = parent.sync_all();
            }
        }

        tracing::debug!("Replaced {} atomically", self.target.display());
        Ok(())
    }
}

pub fn open_storage(path: &Path, mode: WriteMode) -> Result<Box<dyn Storage>> {
    Ok(match mode {
        WriteMode::Atomic => Box::new(AtomicFile::open(path)?),
        WriteMode::InPlace => Box::new(InPlaceFile::open(path)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn read_all(storage: &mut dyn Storage) -> String {
        let mut content = String::new();
        storage.reader().unwrap().read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_in_place_replace_shrinks_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nginx.conf");
        std::fs::write(&path, "a much longer original content\n").unwrap();

        let mut storage = InPlaceFile::open(&path).unwrap();
        assert_eq!(read_all(&mut storage), "a much longer original content\n");
        storage.replace(b"short\n").unwrap();
        drop(storage);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "short\n");
    }

    #[test]
    fn test_atomic_replace() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nginx.conf");
        std::fs::write(&path, "old\n").unwrap();

        let mut storage = AtomicFile::open(&path).unwrap();
        assert_eq!(read_all(&mut storage), "old\n");
        storage.replace(b"new\n").unwrap();
        drop(storage);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_replace_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nginx.conf");
        std::fs::write(&path, "old\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        let mut storage = AtomicFile::open(&path).unwrap();
        storage.replace(b"new\n").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.conf");
        for mode in [WriteMode::Atomic, WriteMode::InPlace] {
            assert!(matches!(
                open_storage(&path, mode),
                Err(RouteError::Io { .. })
            ));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_replace_follows_symlink() {
        let dir = TempDir::new().unwrap();
        let available = dir.path().join("sites-available.conf");
        let enabled = dir.path().join("enabled.conf");
        std::fs::write(&available, "old\n").unwrap();
        std::os::unix::fs::symlink(&available, &enabled).unwrap();

        let mut storage = AtomicFile::open(&enabled).unwrap();
        assert_eq!(storage.path(), enabled.as_path());
        assert_eq!(read_all(&mut storage), "old\n");
        storage.replace(b"new\n").unwrap();

        let link = std::fs::symlink_metadata(&enabled).unwrap();
        assert!(link.file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&available).unwrap(), "new\n");
        assert_eq!(std::fs::read_to_string(&enabled).unwrap(), "new\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_replace_keeps_owner() {
        use std::os::unix::fs::MetadataExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nginx.conf");
        std::fs::write(&path, "old\n").unwrap();
        let before = std::fs::metadata(&path).unwrap();

        let mut storage = AtomicFile::open(&path).unwrap();
        storage.replace(b"new\n").unwrap();

        let after = std::fs::metadata(&path).unwrap();
        assert_eq!(after.uid(), before.uid());
        assert_eq!(after.gid(), before.gid());
    }
}
