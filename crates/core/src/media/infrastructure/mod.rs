pub mod directory_file_system;
pub mod ffmpeg_engine;
