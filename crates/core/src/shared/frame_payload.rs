use std::fmt;

use crate::rendering::domain::renderer_image::RendererImage;
use crate::shared::constants::PLANE_COUNT;

/// Outcome of a frame request, as seen by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FrameStatus {
    /// Nothing has been published yet.
    #[default]
    Idle,
    Ready,
    EndOfFile,
    Error,
}

/// Composite frame handed to the renderer: picture size, status and the
/// three plane images (Y, Cb, Cr).
///
/// The images are borrowed from the publisher's reusable slots, so a payload
/// cannot outlive the next frame request.
#[derive(Clone, Copy)]
pub struct FramePayload<'a> {
    pub width: u32,
    pub height: u32,
    pub status: FrameStatus,
    images: Option<[&'a dyn RendererImage; PLANE_COUNT]>,
}

impl<'a> FramePayload<'a> {
    pub fn ready(width: u32, height: u32, images: [&'a dyn RendererImage; PLANE_COUNT]) -> Self {
        Self {
            width,
            height,
            status: FrameStatus::Ready,
            images: Some(images),
        }
    }

    /// A payload without images, e.g. for end of file or errors.
    pub fn empty(status: FrameStatus) -> Self {
        Self {
            width: 0,
            height: 0,
            status,
            images: None,
        }
    }

    pub fn images(&self) -> Option<&[&'a dyn RendererImage; PLANE_COUNT]> {
        self.images.as_ref()
    }

    pub fn luma(&self) -> Option<&'a dyn RendererImage> {
        self.images.map(|images| images[0])
    }

    pub fn chroma_blue(&self) -> Option<&'a dyn RendererImage> {
        self.images.map(|images| images[1])
    }

    pub fn chroma_red(&self) -> Option<&'a dyn RendererImage> {
        self.images.map(|images| images[2])
    }

    pub fn has_images(&self) -> bool {
        self.images.is_some()
    }
}

impl Default for FramePayload<'_> {
    fn default() -> Self {
        Self::empty(FrameStatus::Idle)
    }
}

impl fmt::Debug for FramePayload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramePayload")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("status", &self.status)
            .field("has_images", &self.has_images())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::domain::renderer_image::{ImageFilter, ImageUsage, ImageWrap};

    struct FixedImage {
        width: u32,
        height: u32,
    }

    impl RendererImage for FixedImage {
        fn generate_image(
            &mut self,
            _bytes: &[u8],
            width: u32,
            height: u32,
            _filter: ImageFilter,
            _wrap: ImageWrap,
            _usage: ImageUsage,
        ) {
            self.width = width;
            self.height = height;
        }

        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }
    }

    #[test]
    fn test_default_is_idle_and_empty() {
        let payload = FramePayload::default();
        assert_eq!(payload.status, FrameStatus::Idle);
        assert_eq!(payload.width, 0);
        assert!(!payload.has_images());
        assert!(payload.luma().is_none());
    }

    #[test]
    fn test_ready_exposes_planes_in_order() {
        let y = FixedImage { width: 8, height: 6 };
        let cb = FixedImage { width: 4, height: 3 };
        let cr = FixedImage { width: 4, height: 3 };
        let payload = FramePayload::ready(8, 6, [&y, &cb, &cr]);

        assert_eq!(payload.status, FrameStatus::Ready);
        assert_eq!(payload.luma().unwrap().width(), 8);
        assert_eq!(payload.chroma_blue().unwrap().height(), 3);
        assert_eq!(payload.chroma_red().unwrap().width(), 4);
    }

    #[test]
    fn test_debug_omits_image_contents() {
        let text = format!("{:?}", FramePayload::empty(FrameStatus::EndOfFile));
        assert!(text.contains("EndOfFile"));
        assert!(text.contains("has_images: false"));
    }
}
