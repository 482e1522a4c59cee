use crate::rendering::domain::renderer_image::{
    ImageFactory, ImageFilter, ImageUsage, ImageWrap, RendererImage,
};

/// Host-memory image used when no GPU is available (headless probes, tests).
///
/// Keeps the last upload and its sampling hints so callers can read the
/// pixels back.
pub struct CpuPlaneImage {
    label: String,
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    hints: Option<(ImageFilter, ImageWrap, ImageUsage)>,
    uploads: usize,
}

impl CpuPlaneImage {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            pixels: Vec::new(),
            width: 0,
            height: 0,
            hints: None,
            uploads: 0,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn hints(&self) -> Option<(ImageFilter, ImageWrap, ImageUsage)> {
        self.hints
    }

    pub fn uploads(&self) -> usize {
        self.uploads
    }
}

impl RendererImage for CpuPlaneImage {
    fn generate_image(
        &mut self,
        bytes: &[u8],
        width: u32,
        height: u32,
        filter: ImageFilter,
        wrap: ImageWrap,
        usage: ImageUsage,
    ) {
        self.pixels.clear();
        self.pixels.extend_from_slice(bytes);
        self.width = width;
        self.height = height;
        self.hints = Some((filter, wrap, usage));
        self.uploads += 1;
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

pub struct CpuImageFactory;

impl ImageFactory for CpuImageFactory {
    fn create_image(&self, label: &str) -> Box<dyn RendererImage> {
        Box::new(CpuPlaneImage::new(label))
    }
}
