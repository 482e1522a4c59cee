use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::media::memory_io_bridge::MemoryIoBridge;
use crate::shared::decoded_frame::DecodedFrame;

/// Failure reported by a demux/decode engine. `status` is the engine's
/// native (negative) error code when it has one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("engine not initialized")]
    NotInitialized,
    #[error("failed to open input (status {status}): {message}")]
    Open { status: i32, message: String },
    #[error("failed to probe stream info (status {status}): {message}")]
    Probe { status: i32, message: String },
    #[error("failed to open decoder (status {status}): {message}")]
    DecoderOpen { status: i32, message: String },
    #[error("failed to read packet (status {status}): {message}")]
    Read { status: i32, message: String },
    #[error("failed to decode packet (status {status}): {message}")]
    Decode { status: i32, message: String },
}

/// Where the demuxer pulls its bytes from.
pub enum InputSource {
    Memory(MemoryIoBridge),
    File(PathBuf),
}

impl fmt::Debug for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Memory(bridge) => write!(f, "Memory({} bytes)", bridge.len()),
            InputSource::File(path) => write!(f, "File({})", path.display()),
        }
    }
}

/// Codec identifier as named by the engine (e.g. "mpeg4", "bink").
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CodecId(pub String);

impl CodecId {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rational {
    pub numerator: i32,
    pub denominator: i32,
}

impl Rational {
    pub fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// The value as a float, or `None` when the denominator is zero.
    pub fn to_f32(self) -> Option<f32> {
        if self.denominator == 0 {
            None
        } else {
            Some(self.numerator as f32 / self.denominator as f32)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamInfo {
    pub index: usize,
    pub codec: CodecId,
    pub avg_frame_rate: Rational,
}

/// A decoder the engine can open, with the capabilities that drive its flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderDescriptor {
    pub codec: CodecId,
    /// The decoder can render straight into caller-provided buffers.
    pub direct_rendering: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecoderFlags {
    /// Decoded pictures must tolerate reads past the visible edges.
    ///
    /// Advisory: engines whose decoders always pad their pictures may
    /// ignore it.
    pub emulate_edge: bool,
    /// Trade conformance for speed.
    pub fast: bool,
}

impl DecoderFlags {
    pub fn for_decoder(descriptor: &DecoderDescriptor, fast: bool) -> Self {
        Self {
            emulate_edge: descriptor.direct_rendering,
            fast,
        }
    }
}

/// Compressed bytes read from the container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    pub stream_index: usize,
    pub pts: Option<i64>,
    pub data: Vec<u8>,
}

/// Result of one decode call: how many input bytes were used and, if a
/// picture completed, the picture.
#[derive(Debug, PartialEq, Eq)]
pub struct DecodeOutput {
    pub consumed: usize,
    pub frame: Option<DecodedFrame>,
}

/// Entry point of the external demux/decode engine.
pub trait DecodeEngine {
    fn open_input(&self, source: InputSource) -> Result<Box<dyn Demuxer>, EngineError>;

    fn find_decoder(&self, codec: &CodecId) -> Option<DecoderDescriptor>;
}

/// An opened container.
pub trait Demuxer {
    fn find_stream_info(&mut self) -> Result<(), EngineError>;

    fn streams(&self) -> Vec<StreamInfo>;

    /// Container duration in microseconds, if known.
    fn duration_us(&self) -> Option<i64>;

    fn open_decoder(
        &mut self,
        stream_index: usize,
        descriptor: &DecoderDescriptor,
        flags: DecoderFlags,
    ) -> Result<Box<dyn Decoder>, EngineError>;

    /// Reads the next packet, `Ok(None)` at end of input.
    fn read_packet(&mut self) -> Result<Option<Packet>, EngineError>;
}

/// An opened per-stream decoder.
pub trait Decoder {
    /// Feeds `data` (the unconsumed tail of a packet) to the decoder.
    fn decode(&mut self, data: &[u8], pts: Option<i64>) -> Result<DecodeOutput, EngineError>;

    /// Feeds an empty packet to release pictures held back by decoder delay.
    fn flush(&mut self) -> Result<Option<DecodedFrame>, EngineError>;
}
