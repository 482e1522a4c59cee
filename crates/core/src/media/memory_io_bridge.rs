use crate::shared::constants::{MAX_IO_BUFFER_SIZE, MIN_IO_BUFFER_SIZE};
use crate::shared::media_asset::MediaAsset;

/// Pull-read adapter over an in-memory asset, fed to a demuxer that asks
/// for bytes through a read callback.
///
/// The cursor only moves forward; there is no seek. `staging_size` is the
/// size of the intermediate buffer the engine reads into.
pub struct MemoryIoBridge {
    asset: MediaAsset,
    cursor: usize,
    staging_size: usize,
}

impl MemoryIoBridge {
    pub fn new(asset: MediaAsset, staging_size: usize) -> Self {
        Self {
            asset,
            cursor: 0,
            staging_size: staging_size.clamp(MIN_IO_BUFFER_SIZE, MAX_IO_BUFFER_SIZE),
        }
    }

    /// Copies up to `out.len()` bytes from the cursor and advances it.
    ///
    /// Returns 0 once the asset is exhausted.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let available = &self.asset.bytes()[self.cursor..];
        let to_copy = available.len().min(out.len());
        out[..to_copy].copy_from_slice(&available[..to_copy]);
        self.cursor += to_copy;
        to_copy
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.asset.len() - self.cursor
    }

    pub fn len(&self) -> usize {
        self.asset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.asset.is_empty()
    }

    pub fn staging_size(&self) -> usize {
        self.staging_size
    }
}
