use serde::{Deserialize, Serialize};
use crate::common::{ClassLabel, ClassScores, SalBox};

/// One detector output: a box, its per-class scores and an optional objectness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalDetection<L> {
    pub bbox: SalBox,
    pub scores: ClassScores<L>,
    /// Detector confidence that the box holds any object at all, independent of class.
    pub objectness: Option<f32>,
}

impl<L> Default for SalDetection<L> {
    fn default() -> Self {
        Self {
            bbox: SalBox::default(),
            scores: ClassScores::default(),
            objectness: None,
        }
    }
}

impl<L: ClassLabel> SalDetection<L> {
    pub fn new(bbox: SalBox, scores: ClassScores<L>) -> Self {
        Self {
            bbox,
            scores,
            objectness: None,
        }
    }

    /// Sets the bounding box's coordinates using `(x1, y1, x2, y2)`.
    ///
    /// # Arguments
    ///
    /// * `x1` - The x-coordinate of the top-left corner.
    /// * `y1` - The y-coordinate of the top-left corner.
    /// * `x2` - The x-coordinate of the bottom-right corner.
    /// * `y2` - The y-coordinate of the bottom-right corner.
    ///
    /// # Returns
    ///
    /// A `SalDetection` instance with updated coordinates.
    pub fn with_x1y1_x2y2(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = SalBox::new(x1, y1, x2, y2);
        self
    }

    /// Sets the score of a single class, appending the class if it is new.
    pub fn with_score(mut self, label: L, score: f32) -> Self {
        self.scores.insert(label, score);
        self
    }

    /// Replaces the whole score map.
    pub fn with_scores(mut self, scores: ClassScores<L>) -> Self {
        self.scores = scores;
        self
    }

    /// Sets the objectness of the detection.
    ///
    /// # Arguments
    ///
    /// * `objectness` - Confidence that the box contains an object of any class.
    ///
    /// # Returns
    ///
    /// A `SalDetection` instance with updated objectness.
    pub fn with_objectness(mut self, objectness: f32) -> Self {
        self.objectness = Some(objectness);
        self
    }

}
