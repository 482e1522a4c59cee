pub mod config;
pub mod constants;
pub mod decoded_frame;
pub mod frame_payload;
pub mod media_asset;
