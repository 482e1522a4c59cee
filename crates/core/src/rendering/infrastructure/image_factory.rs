use std::sync::Arc;

use crate::rendering::domain::renderer_image::ImageFactory;

use super::cpu_plane_image::CpuImageFactory;
use super::gpu_context::GpuContext;
use super::wgpu_plane_image::WgpuImageFactory;

/// Image backend preference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageBackend {
    /// GPU when an adapter is available, host memory otherwise.
    Auto,
    Cpu,
}

/// Creates the best available image factory, preferring GPU when available.
///
/// Probes for a wgpu adapter. If one is found, plane images are textures on
/// that device; otherwise they live in host memory. Logs which backend is
/// selected.
pub fn create_image_factory(backend: ImageBackend) -> Box<dyn ImageFactory> {
    if backend == ImageBackend::Auto {
        if let Some(ctx) = GpuContext::new() {
            log::info!("Using GPU backend for cinematic plane images");
            return Box::new(WgpuImageFactory::new(Arc::new(ctx)));
        }
        log::info!("No GPU available, using CPU backend for cinematic plane images");
    }
    Box::new(CpuImageFactory)
}
