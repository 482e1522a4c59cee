use std::sync::Arc;

/// Whole-file contents of a cinematic, loaded once at open time.
///
/// Cloning shares the same bytes: the session owns one handle and the I/O
/// bridge reads through another. The bytes are never mutated after load.
#[derive(Clone, Debug)]
pub struct MediaAsset {
    bytes: Arc<Vec<u8>>,
}

impl MediaAsset {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::new(bytes),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of live handles onto the same bytes.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.bytes)
    }

    /// Recovers the buffer if this is the last handle.
    pub fn into_inner(self) -> Option<Vec<u8>> {
        Arc::try_unwrap(self.bytes).ok()
    }
}

impl From<Vec<u8>> for MediaAsset {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}
