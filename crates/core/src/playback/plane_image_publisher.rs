use crate::rendering::domain::renderer_image::{
    ImageFactory, ImageFilter, ImageUsage, ImageWrap, RendererImage,
};
use crate::shared::constants::{PLANE_COUNT, PLANE_LABELS};
use crate::shared::decoded_frame::{plane_dimensions, DecodedFrame, Plane};
use crate::shared::frame_payload::{FramePayload, FrameStatus};

use super::error::PlaybackError;

/// Owns the three renderer images of a player and re-uploads them from each
/// decoded picture. Chroma planes are half the luma size in both directions.
pub struct PlaneImagePublisher {
    images: [Box<dyn RendererImage>; PLANE_COUNT],
    scratch: Vec<u8>,
    width: u32,
    height: u32,
    status: FrameStatus,
    published: usize,
}

impl PlaneImagePublisher {
    pub fn new(factory: &dyn ImageFactory) -> Self {
        Self {
            images: PLANE_LABELS.map(|label| factory.create_image(label)),
            scratch: Vec::new(),
            width: 0,
            height: 0,
            status: FrameStatus::Idle,
            published: 0,
        }
    }

    /// Forgets the last published picture.
    pub fn prime(&mut self) {
        self.width = 0;
        self.height = 0;
        self.status = FrameStatus::Idle;
    }

    /// Uploads the Y, Cb and Cr planes of `frame`, tightly packed.
    pub fn publish(&mut self, frame: &DecodedFrame) -> Result<(), PlaybackError> {
        for (index, plane) in frame.planes().iter().enumerate() {
            let (width, height) = plane_dimensions(index, frame.width(), frame.height());
            pack_rows(index, plane, width, height, &mut self.scratch)?;
            self.images[index].generate_image(
                &self.scratch,
                width,
                height,
                ImageFilter::Linear,
                ImageWrap::Clamp,
                ImageUsage::Video,
            );
        }

        self.width = frame.width();
        self.height = frame.height();
        self.status = FrameStatus::Ready;
        self.published += 1;
        Ok(())
    }

    /// The last published picture, or an empty payload before the first one.
    pub fn payload(&self) -> FramePayload<'_> {
        match self.status {
            FrameStatus::Ready => FramePayload::ready(
                self.width,
                self.height,
                [&*self.images[0], &*self.images[1], &*self.images[2]],
            ),
            status => FramePayload::empty(status),
        }
    }

    pub fn published(&self) -> usize {
        self.published
    }
}

/// Copies `height` rows of `width` bytes out of a plane whose rows are
/// `stride` bytes apart.
fn pack_rows(
    index: usize,
    plane: &Plane,
    width: u32,
    height: u32,
    out: &mut Vec<u8>,
) -> Result<(), PlaybackError> {
    let (width, height) = (width as usize, height as usize);
    out.clear();
    if width == 0 || height == 0 {
        return Ok(());
    }

    let stride = plane.stride();
    let needed = stride * (height - 1) + width;
    if stride < width || plane.data().len() < needed {
        return Err(PlaybackError::InvalidPlane {
            plane: index,
            stride,
            needed,
            actual: plane.data().len(),
        });
    }

    out.reserve(width * height);
    for row in plane.data().chunks(stride).take(height) {
        out.extend_from_slice(&row[..width]);
    }
    Ok(())
}
