use crate::shared::constants::PLANE_COUNT;

/// One color plane as handed back by a decoder.
///
/// Rows are `stride` bytes apart; only the first `width` bytes of each row
/// carry pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plane {
    data: Vec<u8>,
    stride: usize,
}

impl Plane {
    pub fn new(data: Vec<u8>, stride: usize) -> Self {
        Self { data, stride }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn stride(&self) -> usize {
        self.stride
    }
}

/// A decoded picture in planar YUV 4:2:0: luma, chroma-blue, chroma-red.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedFrame {
    width: u32,
    height: u32,
    pts: Option<i64>,
    planes: [Plane; PLANE_COUNT],
}

impl DecodedFrame {
    pub fn new(width: u32, height: u32, pts: Option<i64>, planes: [Plane; PLANE_COUNT]) -> Self {
        Self {
            width,
            height,
            pts,
            planes,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pts(&self) -> Option<i64> {
        self.pts
    }

    pub fn planes(&self) -> &[Plane; PLANE_COUNT] {
        &self.planes
    }

    pub fn plane(&self, index: usize) -> &Plane {
        &self.planes[index]
    }
}

/// Dimensions of plane `index` for a 4:2:0 picture of `width` x `height`.
///
/// Chroma planes are half resolution in both axes, rounded down.
pub fn plane_dimensions(index: usize, width: u32, height: u32) -> (u32, u32) {
    if index == 0 {
        (width, height)
    } else {
        (width / 2, height / 2)
    }
}
