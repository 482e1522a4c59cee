pub mod cpu_plane_image;
pub mod gpu_context;
pub mod image_factory;
pub mod wgpu_plane_image;
