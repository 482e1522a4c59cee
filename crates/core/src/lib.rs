//! Cinematic playback core.
//!
//! Bridges a media asset to a demux/decode engine, pulls decoded frames on
//! demand and republishes their color planes as renderer images. Playback is
//! driven by a caller-supplied clock, never by wall time.

pub mod media;
pub mod playback;
pub mod rendering;
pub mod shared;

#[cfg(test)]
mod test_support;
