use std::path::Path;

use crate::shared::constants::{INDEFINITE_LENGTH, WAVEFORM_RESOURCE};
use crate::shared::frame_payload::FramePayload;

/// Renders the sound system's current output as an image.
pub trait WaveformImageProvider {
    fn image_for_time(&mut self, milliseconds: i32, waveform: bool) -> FramePayload<'_>;
}

/// A cinematic that shows what the sound system is playing instead of a
/// video. Opening the special resource `waveform` selects waveform mode;
/// any other name shows the plain audio image.
pub struct SoundWindow {
    provider: Box<dyn WaveformImageProvider>,
    show_waveform: bool,
}

impl SoundWindow {
    pub fn new(provider: Box<dyn WaveformImageProvider>) -> Self {
        Self {
            provider,
            show_waveform: false,
        }
    }

    /// Always succeeds.
    pub fn init_from_file(&mut self, path: &Path, _looping: bool) -> bool {
        self.show_waveform = path
            .to_str()
            .is_some_and(|name| name.eq_ignore_ascii_case(WAVEFORM_RESOURCE));
        true
    }

    pub fn image_for_time(&mut self, milliseconds: i32) -> FramePayload<'_> {
        self.provider.image_for_time(milliseconds, self.show_waveform)
    }

    pub fn animation_length(&self) -> i32 {
        INDEFINITE_LENGTH
    }

    pub fn shows_waveform(&self) -> bool {
        self.show_waveform
    }
}
