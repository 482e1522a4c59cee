/// Lifecycle of a [`CinematicPlayer`](super::cinematic_player::CinematicPlayer).
///
/// `Error` is sticky: once a decode fails, every frame request reports an
/// error until the player is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Closed,
    Opening,
    Ready,
    ReadingFrame,
    Error,
}

impl PlaybackState {
    pub fn is_open(self) -> bool {
        matches!(self, Self::Ready | Self::ReadingFrame | Self::Error)
    }
}
