pub mod domain;
pub mod infrastructure;
pub mod memory_io_bridge;
pub mod subsystem;
