use std::sync::Arc;

use crate::rendering::domain::renderer_image::{
    ImageFactory, ImageFilter, ImageUsage, ImageWrap, RendererImage,
};

use super::gpu_context::GpuContext;

/// Single-channel `R8Unorm` texture plus the sampler the hints ask for.
///
/// The texture is reused across uploads and only recreated when the
/// dimensions change.
pub struct WgpuPlaneImage {
    ctx: Arc<GpuContext>,
    label: String,
    texture: Option<wgpu::Texture>,
    sampler: Option<wgpu::Sampler>,
    hints: Option<(ImageFilter, ImageWrap)>,
    usage: Option<ImageUsage>,
    width: u32,
    height: u32,
    generation: u32,
}

impl WgpuPlaneImage {
    pub fn new(ctx: Arc<GpuContext>, label: &str) -> Self {
        Self {
            ctx,
            label: label.to_string(),
            texture: None,
            sampler: None,
            hints: None,
            usage: None,
            width: 0,
            height: 0,
            generation: 0,
        }
    }

    /// Number of textures allocated so far.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn sampler(&self) -> Option<&wgpu::Sampler> {
        self.sampler.as_ref()
    }

    pub fn texture(&self) -> Option<&wgpu::Texture> {
        self.texture.as_ref()
    }

    pub fn usage(&self) -> Option<ImageUsage> {
        self.usage
    }

    fn release_texture(&mut self) {
        self.texture = None;
        self.width = 0;
        self.height = 0;
    }

    fn ensure_texture(&mut self, width: u32, height: u32) {
        if self.texture.is_some() && self.width == width && self.height == height {
            return;
        }
        let texture = self.ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&self.label),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.texture = Some(texture);
        self.width = width;
        self.height = height;
        self.generation += 1;
    }

    fn ensure_sampler(&mut self, filter: ImageFilter, wrap: ImageWrap) {
        if self.sampler.is_some() && self.hints == Some((filter, wrap)) {
            return;
        }
        let filter_mode = match filter {
            ImageFilter::Linear => wgpu::FilterMode::Linear,
            ImageFilter::Nearest => wgpu::FilterMode::Nearest,
        };
        let address_mode = match wrap {
            ImageWrap::Clamp => wgpu::AddressMode::ClampToEdge,
            ImageWrap::Repeat => wgpu::AddressMode::Repeat,
        };
        self.sampler = Some(self.ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&self.label),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: filter_mode,
            min_filter: filter_mode,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        }));
        self.hints = Some((filter, wrap));
    }
}

impl RendererImage for WgpuPlaneImage {
    fn generate_image(
        &mut self,
        bytes: &[u8],
        width: u32,
        height: u32,
        filter: ImageFilter,
        wrap: ImageWrap,
        usage: ImageUsage,
    ) {
        if width == 0 || height == 0 {
            self.release_texture();
            return;
        }
        let max = self.ctx.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            log::warn!(
                "{}: {width}x{height} exceeds the device texture limit of {max}, skipped",
                self.label
            );
            self.release_texture();
            return;
        }
        let expected = width as usize * height as usize;
        if bytes.len() < expected {
            log::warn!(
                "{}: upload of {} bytes is short for {width}x{height}, skipped",
                self.label,
                bytes.len()
            );
            return;
        }

        self.ensure_texture(width, height);
        self.ensure_sampler(filter, wrap);
        self.usage = Some(usage);

        if let Some(texture) = &self.texture {
            self.ctx.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &bytes[..expected],
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(width),
                    rows_per_image: Some(height),
                },
                extent(width, height),
            );
        }
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

pub struct WgpuImageFactory {
    ctx: Arc<GpuContext>,
}

impl WgpuImageFactory {
    pub fn new(ctx: Arc<GpuContext>) -> Self {
        Self { ctx }
    }
}

impl ImageFactory for WgpuImageFactory {
    fn create_image(&self, label: &str) -> Box<dyn RendererImage> {
        Box::new(WgpuPlaneImage::new(self.ctx.clone(), label))
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}
