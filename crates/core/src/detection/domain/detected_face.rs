use crate::detection::domain::face_descriptor::FaceDescriptor;

/// Axis-aligned face box in source-image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub score: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

/// One face found in an image, with its identity descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedFace {
    pub descriptor: FaceDescriptor,
    pub bbox: BoundingBox,
}
