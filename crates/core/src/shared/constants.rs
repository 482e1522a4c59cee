/// Staging buffer handed to the demuxer for memory-backed reads.
pub const DEFAULT_IO_BUFFER_SIZE: usize = 32 * 1024;

/// Smallest staging buffer accepted from configuration.
pub const MIN_IO_BUFFER_SIZE: usize = 4 * 1024;

/// Largest staging buffer accepted from configuration. Fits a C `int`.
pub const MAX_IO_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Frame rate reported before any session has been constructed.
pub const DEFAULT_FRAME_RATE: f32 = 30.0;

/// Start time reported before the first `reset_time`.
pub const START_TIME_UNSET: i32 = -1;

/// Animation length reported by players without a finite length.
pub const INDEFINITE_LENGTH: i32 = -1;

/// Resource name that switches the sound window into waveform mode.
pub const WAVEFORM_RESOURCE: &str = "waveform";

/// Number of color planes in a published frame (Y, Cb, Cr).
pub const PLANE_COUNT: usize = 3;

pub const PLANE_LABELS: [&str; PLANE_COUNT] = ["cinematic-luma", "cinematic-cb", "cinematic-cr"];
