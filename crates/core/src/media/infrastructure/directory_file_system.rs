use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::media::domain::file_system::FileSystem;
use crate::shared::media_asset::MediaAsset;

/// Resolves resource paths against a base directory and reads them with
/// `std::fs`. Absolute paths are used as-is.
pub struct DirectoryFileSystem {
    root: PathBuf,
}

impl DirectoryFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File system rooted at the current working directory.
    pub fn current_dir() -> Self {
        Self::new(PathBuf::from("."))
    }
}

impl FileSystem for DirectoryFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<MediaAsset> {
        let resolved = self.resolve(path);
        let bytes = fs::read(&resolved)?;
        log::debug!("Loaded {} ({} bytes)", resolved.display(), bytes.len());
        Ok(MediaAsset::new(bytes))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("video")).unwrap();
        fs::write(dir.path().join("video/intro.mkv"), b"abc").unwrap();

        let fs = DirectoryFileSystem::new(dir.path());
        let asset = fs.read_file(Path::new("video/intro.mkv")).unwrap();
        assert_eq!(asset.bytes(), b"abc");
    }

    #[test]
    fn test_absolute_path_ignores_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        fs::write(&path, [1, 2]).unwrap();

        let fs = DirectoryFileSystem::new("/does/not/matter");
        assert_eq!(fs.resolve(&path), path);
        assert_eq!(fs.read_file(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_file_is_error() {
        let fs = DirectoryFileSystem::current_dir();
        let err = fs.read_file(Path::new("/nonexistent/intro.mkv")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
