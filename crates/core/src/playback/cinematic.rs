use std::path::Path;

use crate::shared::constants::{DEFAULT_FRAME_RATE, START_TIME_UNSET};
use crate::shared::frame_payload::FramePayload;

use super::cinematic_player::CinematicPlayer;
use super::sound_window::SoundWindow;

/// Anything a material can play: a decoded video or the sound window.
pub enum Cinematic {
    Video(CinematicPlayer),
    AudioWaveform(SoundWindow),
}

impl Cinematic {
    pub fn init_from_file(&mut self, path: &Path, looping: bool) -> bool {
        match self {
            Self::Video(player) => player.init_from_file(path, looping),
            Self::AudioWaveform(window) => window.init_from_file(path, looping),
        }
    }

    pub fn image_for_time(&mut self, milliseconds: i32) -> FramePayload<'_> {
        match self {
            Self::Video(player) => player.image_for_time(milliseconds),
            Self::AudioWaveform(window) => window.image_for_time(milliseconds),
        }
    }

    pub fn animation_length(&self) -> i32 {
        match self {
            Self::Video(player) => player.animation_length(),
            Self::AudioWaveform(window) => window.animation_length(),
        }
    }

    pub fn frame_rate(&self) -> f32 {
        match self {
            Self::Video(player) => player.frame_rate(),
            Self::AudioWaveform(_) => DEFAULT_FRAME_RATE,
        }
    }

    pub fn reset_time(&mut self, milliseconds: i32) {
        if let Self::Video(player) = self {
            player.reset_time(milliseconds);
        }
    }

    pub fn start_time(&self) -> i32 {
        match self {
            Self::Video(player) => player.start_time(),
            Self::AudioWaveform(_) => START_TIME_UNSET,
        }
    }

    pub fn close(&mut self) {
        if let Self::Video(player) = self {
            player.close();
        }
    }

    pub fn as_video(&self) -> Option<&CinematicPlayer> {
        match self {
            Self::Video(player) => Some(player),
            Self::AudioWaveform(_) => None,
        }
    }
}
