/// Texture sampling filter requested for an uploaded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFilter {
    Linear,
    Nearest,
}

/// Texture addressing outside the [0, 1] range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageWrap {
    Clamp,
    Repeat,
}

/// Tells the renderer what the pixels are for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageUsage {
    /// Display-ready video data, sampled as-is with no further processing.
    Video,
    /// Generic color data that may be processed (mipmaps, color space).
    Diffuse,
}

/// A renderer-owned image that accepts raw single-channel pixel uploads.
///
/// Uploads are fire-and-forget; the renderer decides when the pixels reach
/// the GPU. `bytes` is tightly packed: `width * height` bytes, row-major.
pub trait RendererImage {
    fn generate_image(
        &mut self,
        bytes: &[u8],
        width: u32,
        height: u32,
        filter: ImageFilter,
        wrap: ImageWrap,
        usage: ImageUsage,
    );

    fn width(&self) -> u32;

    fn height(&self) -> u32;
}

/// Creates the image slots a publisher uploads into.
pub trait ImageFactory {
    fn create_image(&self, label: &str) -> Box<dyn RendererImage>;
}
