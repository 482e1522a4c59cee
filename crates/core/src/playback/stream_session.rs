use std::path::PathBuf;

use crate::media::domain::decode_engine::{
    CodecId, DecodeEngine, DecodeOutput, Decoder, DecoderFlags, Demuxer, EngineError, InputSource,
    Packet, StreamInfo,
};
use crate::media::memory_io_bridge::MemoryIoBridge;
use crate::shared::config::PlayerConfig;
use crate::shared::decoded_frame::DecodedFrame;
use crate::shared::media_asset::MediaAsset;

use super::error::PlaybackError;

/// What a session is opened from.
#[derive(Debug)]
pub enum AssetSource {
    /// Bytes already loaded by the host file system.
    Memory(MediaAsset),
    /// A path the engine opens on its own.
    File(PathBuf),
}

/// An opened container plus the decoder of its selected stream.
///
/// Only the first stream is ever decoded. `close` tears down the decoder
/// and demuxer and hands back the loaded asset so the caller can return it
/// to the file system; a second `close` is a no-op.
pub struct StreamSession {
    demuxer: Option<Box<dyn Demuxer>>,
    decoder: Option<Box<dyn Decoder>>,
    asset: Option<MediaAsset>,
    stream: Option<StreamInfo>,
    stream_count: usize,
    good: bool,
    closed: bool,
}

impl StreamSession {
    pub fn new() -> Self {
        Self {
            demuxer: None,
            decoder: None,
            asset: None,
            stream: None,
            stream_count: 0,
            good: false,
            closed: true,
        }
    }

    /// Opens the container, probes it, and opens a decoder for stream 0.
    ///
    /// On failure the session keeps whatever was acquired so far; the caller
    /// releases it with [`close`](Self::close).
    pub fn open(
        &mut self,
        engine: &dyn DecodeEngine,
        source: AssetSource,
        config: &PlayerConfig,
    ) -> Result<(), PlaybackError> {
        if !self.closed {
            log::warn!("Reopening a session that was not closed");
            drop(self.close());
        }
        self.closed = false;

        let input = match source {
            AssetSource::Memory(asset) => {
                self.asset = Some(asset.clone());
                InputSource::Memory(MemoryIoBridge::new(
                    asset,
                    config.effective_io_buffer_size(),
                ))
            }
            AssetSource::File(path) => InputSource::File(path),
        };
        log::debug!("Opening {input:?}");

        let demuxer = self
            .demuxer
            .insert(engine.open_input(input).map_err(PlaybackError::DemuxOpen)?);
        demuxer
            .find_stream_info()
            .map_err(PlaybackError::DemuxOpen)?;

        let streams = demuxer.streams();
        self.stream_count = streams.len();
        let stream = streams
            .into_iter()
            .next()
            .ok_or(PlaybackError::NoStreams)?;
        if self.stream_count > 1 {
            log::warn!(
                "Container has {} streams, decoding stream {} only",
                self.stream_count,
                stream.index
            );
        }

        let descriptor = engine
            .find_decoder(&stream.codec)
            .ok_or_else(|| PlaybackError::UnsupportedCodec(stream.codec.clone()))?;
        let flags = DecoderFlags::for_decoder(&descriptor, config.fast_decode);
        self.decoder = Some(
            demuxer
                .open_decoder(stream.index, &descriptor, flags)
                .map_err(PlaybackError::DecoderOpen)?,
        );

        log::debug!(
            "Opened stream {} ({}, emulate_edge={}, fast={})",
            stream.index,
            stream.codec,
            flags.emulate_edge,
            flags.fast
        );
        self.stream = Some(stream);
        self.good = true;
        Ok(())
    }

    /// Releases the decoder, the demuxer and its I/O bridge, in that order,
    /// and returns the asset the session was holding.
    pub fn close(&mut self) -> Option<MediaAsset> {
        if self.closed {
            return None;
        }
        self.good = false;
        self.decoder = None;
        self.demuxer = None;
        self.stream = None;
        self.stream_count = 0;
        self.closed = true;
        self.asset.take()
    }

    pub fn is_good(&self) -> bool {
        self.good
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Container duration in whole milliseconds, 0 when unknown.
    pub fn duration_ms(&self) -> i64 {
        if !self.good {
            return 0;
        }
        self.demuxer
            .as_ref()
            .and_then(|demuxer| demuxer.duration_us())
            .map(|us| us / 1000)
            .unwrap_or(0)
    }

    /// Average frame rate of the selected stream, 0 when there is none.
    pub fn frame_rate(&self) -> f32 {
        self.stream
            .as_ref()
            .and_then(|stream| stream.avg_frame_rate.to_f32())
            .unwrap_or(0.0)
    }

    pub fn selected_stream(&self) -> Option<usize> {
        self.stream.as_ref().map(|stream| stream.index)
    }

    pub fn stream_info(&self) -> Option<&StreamInfo> {
        self.stream.as_ref()
    }

    pub fn codec(&self) -> Option<&CodecId> {
        self.stream.as_ref().map(|stream| &stream.codec)
    }

    pub fn stream_count(&self) -> usize {
        self.stream_count
    }

    /// Next packet from the container, `Ok(None)` once there is nothing
    /// left or no container is open.
    pub(crate) fn read_packet(&mut self) -> Result<Option<Packet>, EngineError> {
        match self.demuxer.as_mut() {
            Some(demuxer) => demuxer.read_packet(),
            None => Ok(None),
        }
    }

    pub(crate) fn decode(
        &mut self,
        data: &[u8],
        pts: Option<i64>,
    ) -> Result<DecodeOutput, PlaybackError> {
        let decoder = self.decoder.as_mut().ok_or(PlaybackError::NotOpen)?;
        decoder.decode(data, pts).map_err(PlaybackError::Decode)
    }

    pub(crate) fn flush(&mut self) -> Result<Option<DecodedFrame>, PlaybackError> {
        let decoder = self.decoder.as_mut().ok_or(PlaybackError::NotOpen)?;
        decoder.flush().map_err(PlaybackError::Decode)
    }
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}
