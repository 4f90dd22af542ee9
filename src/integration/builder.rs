//! Builder for creating Detection objects from various input formats.

use crate::tracker::{BoundingBox, Detection};

/// Builder for creating `Detection` objects from various input formats.
#[derive(Debug, Clone, Copy)]
pub struct DetectionBuilder {
    bbox: BoundingBox,
    score: f32,
}

impl Default for DetectionBuilder {
    fn default() -> Self {
        Self {
            bbox: BoundingBox::default(),
            score: 1.0,
        }
    }
}

impl DetectionBuilder {
    /// Create a new detection builder with full confidence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = BoundingBox::from_tlbr(x1, y1, x2, y2);
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = BoundingBox::from_xywh(cx, cy, w, h);
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.bbox = BoundingBox::new(x, y, w, h);
        self
    }

    /// Set the confidence score.
    pub fn score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Build the final `Detection`.
    pub fn build(self) -> Detection {
        Detection::from_bbox(self.bbox, self.score)
    }
}
