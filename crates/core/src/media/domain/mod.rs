pub mod decode_engine;
pub mod file_system;
