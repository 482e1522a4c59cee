use std::io;

use thiserror::Error;

use crate::media::domain::decode_engine::{CodecId, EngineError};

/// Coarse failure category, stable across the detailed variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    AssetLoad,
    DemuxOpen,
    DecoderOpen,
    Decode,
}

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("failed to load {path}: {source}")]
    AssetLoad {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to open container: {0}")]
    DemuxOpen(#[source] EngineError),
    #[error("container has no streams")]
    NoStreams,
    #[error("no decoder for codec {0}")]
    UnsupportedCodec(CodecId),
    #[error("failed to open decoder: {0}")]
    DecoderOpen(#[source] EngineError),
    #[error("decode failed: {0}")]
    Decode(#[source] EngineError),
    #[error("decoder made no progress with {remaining} bytes pending")]
    DecoderStalled { remaining: usize },
    #[error("plane {plane} holds {actual} bytes, needs {needed} (stride {stride})")]
    InvalidPlane {
        plane: usize,
        stride: usize,
        needed: usize,
        actual: usize,
    },
    #[error("no stream is open")]
    NotOpen,
}

impl PlaybackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AssetLoad { .. } => ErrorKind::AssetLoad,
            Self::DemuxOpen(_) | Self::NoStreams => ErrorKind::DemuxOpen,
            Self::UnsupportedCodec(_) | Self::DecoderOpen(_) => ErrorKind::DecoderOpen,
            Self::Decode(_)
            | Self::DecoderStalled { .. }
            | Self::InvalidPlane { .. }
            | Self::NotOpen => ErrorKind::Decode,
        }
    }
}
