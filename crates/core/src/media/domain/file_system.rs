use std::io;
use std::path::{Path, PathBuf};

use crate::shared::media_asset::MediaAsset;

/// Host file system as seen by the cinematic player.
pub trait FileSystem {
    /// Loads the whole file into memory.
    fn read_file(&self, path: &Path) -> io::Result<MediaAsset>;

    /// Returns a buffer obtained from `read_file`. Called exactly once per
    /// successful read.
    fn free_file(&self, asset: MediaAsset) {
        drop(asset);
    }

    /// Maps a resource path to the location the engine can open directly.
    fn resolve(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}
