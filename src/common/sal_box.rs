use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel coordinates, `(x1, y1)` the min vertex.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, PartialOrd)]
pub struct SalBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl SalBox {
    /// Builds a box from two corners. Corners are reordered so that `(x1, y1)` is the min vertex.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    pub fn min_vertex(&self) -> (f32, f32) {
        (self.x1, self.y1)
    }

    pub fn max_vertex(&self) -> (f32, f32) {
        (self.x2, self.y2)
    }

    /// Coordinates in detection-matrix column order: min vertex then max vertex.
    pub fn to_row(&self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

impl From<[f32; 4]> for SalBox {
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        SalBox::new(x1, y1, x2, y2)
    }
}
