use std::path::{Path, PathBuf};

use crate::media::domain::decode_engine::DecodeEngine;
use crate::media::domain::file_system::FileSystem;
use crate::rendering::domain::renderer_image::ImageFactory;
use crate::shared::config::{AssetMode, PlayerConfig};
use crate::shared::constants::{DEFAULT_FRAME_RATE, START_TIME_UNSET};
use crate::shared::frame_payload::{FramePayload, FrameStatus};

use super::error::PlaybackError;
use super::frame_decoder::{FetchOutcome, FrameDecoder};
use super::plane_image_publisher::PlaneImagePublisher;
use super::playback_state::PlaybackState;
use super::stream_session::{AssetSource, StreamSession};

/// Plays one video file as a sequence of Y/Cb/Cr renderer images.
///
/// Frames are pulled, not pushed: each [`image_for_time`](Self::image_for_time)
/// decodes exactly one picture regardless of the time passed in, so the
/// caller's clock controls the pace.
pub struct CinematicPlayer {
    engine: Box<dyn DecodeEngine>,
    file_system: Box<dyn FileSystem>,
    config: PlayerConfig,
    session: Option<StreamSession>,
    frame_decoder: FrameDecoder,
    publisher: PlaneImagePublisher,
    state: PlaybackState,
    good: bool,
    looping: bool,
    start_time: i32,
    frame_count: u32,
    source: Option<PathBuf>,
    last_error: Option<PlaybackError>,
}

impl CinematicPlayer {
    pub fn new(
        engine: Box<dyn DecodeEngine>,
        file_system: Box<dyn FileSystem>,
        image_factory: &dyn ImageFactory,
        config: PlayerConfig,
    ) -> Self {
        Self {
            engine,
            file_system,
            config,
            session: None,
            frame_decoder: FrameDecoder::new(),
            publisher: PlaneImagePublisher::new(image_factory),
            state: PlaybackState::Closed,
            good: false,
            looping: false,
            start_time: START_TIME_UNSET,
            frame_count: 0,
            source: None,
            last_error: None,
        }
    }

    /// Opens `path` for playback, returning false on any failure.
    ///
    /// The failure itself is kept in [`last_error`](Self::last_error).
    pub fn init_from_file(&mut self, path: &Path, looping: bool) -> bool {
        match self.open(path, looping) {
            Ok(()) => true,
            Err(e) => {
                self.last_error = Some(e);
                false
            }
        }
    }

    /// Opens `path` for playback, closing whatever was open before.
    pub fn open(&mut self, path: &Path, looping: bool) -> Result<(), PlaybackError> {
        self.close();
        self.looping = looping;
        self.last_error = None;
        self.state = PlaybackState::Opening;

        if let Err(e) = self.open_session(path) {
            log::warn!("Failed to open cinematic {}: {e}", path.display());
            self.release_session();
            self.state = PlaybackState::Closed;
            return Err(e);
        }

        self.frame_decoder.reset();
        self.publisher.prime();
        self.frame_count = 0;
        self.start_time = START_TIME_UNSET;
        self.good = true;
        self.state = PlaybackState::Ready;
        self.source = Some(path.to_path_buf());
        log::info!(
            "Opened cinematic {} ({} ms at {:.2} fps, {} mode)",
            path.display(),
            self.animation_length(),
            self.frame_rate(),
            self.config.asset_mode
        );
        Ok(())
    }

    fn open_session(&mut self, path: &Path) -> Result<(), PlaybackError> {
        let session = self.session.get_or_insert_with(StreamSession::new);
        let source = match self.config.asset_mode {
            AssetMode::Memory => {
                let asset =
                    self.file_system
                        .read_file(path)
                        .map_err(|source| PlaybackError::AssetLoad {
                            path: path.display().to_string(),
                            source,
                        })?;
                AssetSource::Memory(asset)
            }
            AssetMode::File => AssetSource::File(self.file_system.resolve(path)),
        };
        session.open(self.engine.as_ref(), source, &self.config)
    }

    /// Closes the session and hands the asset back to the file system.
    fn release_session(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(asset) = session.close() {
            self.file_system.free_file(asset);
        }
    }

    /// Length in milliseconds, 0 unless a file is open.
    pub fn animation_length(&self) -> i32 {
        if !self.good {
            return 0;
        }
        let ms = self
            .session
            .as_ref()
            .map(StreamSession::duration_ms)
            .unwrap_or(0);
        i32::try_from(ms).unwrap_or(i32::MAX)
    }

    /// Average frame rate of the open stream.
    ///
    /// Reports 30 before any file was ever opened, and 0 when the last
    /// open found no usable stream.
    pub fn frame_rate(&self) -> f32 {
        match &self.session {
            Some(session) => session.frame_rate(),
            None => DEFAULT_FRAME_RATE,
        }
    }

    /// Records the caller's start time; playback position is unaffected.
    pub fn reset_time(&mut self, milliseconds: i32) {
        self.start_time = milliseconds;
    }

    pub fn start_time(&self) -> i32 {
        self.start_time
    }

    /// Decodes and publishes the next picture.
    ///
    /// `milliseconds` is accepted for interface compatibility and ignored.
    /// After a decode failure every call returns an `Error` payload until
    /// the player is closed.
    pub fn image_for_time(&mut self, _milliseconds: i32) -> FramePayload<'_> {
        match self.state {
            PlaybackState::Error => return FramePayload::empty(FrameStatus::Error),
            PlaybackState::Closed | PlaybackState::Opening => {
                return FramePayload::empty(FrameStatus::Idle)
            }
            PlaybackState::Ready | PlaybackState::ReadingFrame => {}
        }
        let Some(session) = self.session.as_mut() else {
            return FramePayload::empty(FrameStatus::Idle);
        };

        self.state = PlaybackState::ReadingFrame;
        let frame = match self.frame_decoder.fetch_frame(session) {
            Ok(FetchOutcome::Frame(frame)) => frame,
            Ok(FetchOutcome::EndOfStream) => {
                self.state = PlaybackState::Ready;
                if self.looping {
                    log::debug!("End of looping cinematic; playback does not restart");
                }
                return FramePayload::empty(FrameStatus::EndOfFile);
            }
            Err(e) => return self.fail(e),
        };

        if let Err(e) = self.publisher.publish(&frame) {
            return self.fail(e);
        }
        self.frame_count += 1;
        self.state = PlaybackState::Ready;
        self.publisher.payload()
    }

    fn fail(&mut self, error: PlaybackError) -> FramePayload<'static> {
        log::error!(
            "Cinematic playback failed after {} frames: {error}",
            self.frame_count
        );
        self.state = PlaybackState::Error;
        self.last_error = Some(error);
        FramePayload::empty(FrameStatus::Error)
    }

    /// Releases the decoder, the container and the loaded asset. Idempotent.
    pub fn close(&mut self) {
        let was_open = self.state != PlaybackState::Closed;
        self.release_session();
        self.frame_decoder.reset();
        self.publisher.prime();
        self.good = false;
        self.state = PlaybackState::Closed;
        if was_open {
            if let Some(source) = self.source.take() {
                log::debug!(
                    "Closed cinematic {} after {} frames",
                    source.display(),
                    self.frame_count
                );
            }
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_good(&self) -> bool {
        self.good
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn last_error(&self) -> Option<&PlaybackError> {
        self.last_error.as_ref()
    }
}

impl Drop for CinematicPlayer {
    fn drop(&mut self) {
        self.close();
    }
}
