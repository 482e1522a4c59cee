pub mod cinematic;
pub mod cinematic_player;
pub mod error;
pub mod frame_decoder;
pub mod plane_image_publisher;
pub mod playback_state;
pub mod sound_window;
pub mod stream_session;
