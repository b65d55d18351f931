use ndarray::{concatenate, Array1, Array2, ArrayView1, ArrayView2, Axis};
use crate::error::{Result, SalError};

/// Columns before the class scores: four bbox coordinates and the objectness.
pub const DET_PREFIX_COLS: usize = 5;

/// Column holding the objectness.
pub const OBJECTNESS_COL: usize = 4;

/// Combines one image's detections into a `D x (4 + 1 + C)` matrix.
///
/// Columns are `[x1, y1, x2, y2, objectness, score_0 .. score_C]`. Without `objectness` every
/// detection is assumed to be a real object and gets 1.0.
///
/// # Arguments
///
/// * `bboxes` - `D x 4` boxes as min vertex then max vertex.
/// * `scores` - `D x C` class scores, `C` may be zero.
/// * `objectness` - Optional `D` objectness values.
pub fn format_detection(
    bboxes: ArrayView2<f32>,
    scores: ArrayView2<f32>,
    objectness: Option<ArrayView1<f32>>,
) -> Result<Array2<f32>> {
    let num_dets = bboxes.nrows();
    if bboxes.ncols() != 4 {
        return Err(SalError::ShapeMismatch(format!(
            "bboxes must have 4 columns, got {}",
            bboxes.ncols()
        )));
    }
    if scores.nrows() != num_dets {
        return Err(SalError::ShapeMismatch(format!(
            "{num_dets} bboxes but {} score rows",
            scores.nrows()
        )));
    }

    let objectness = match objectness {
        Some(obj) if obj.len() != num_dets => {
            return Err(SalError::ShapeMismatch(format!(
                "{num_dets} bboxes but {} objectness values",
                obj.len()
            )))
        }
        Some(obj) => obj.to_owned(),
        None => Array1::ones(num_dets),
    };

    let objectness = objectness.insert_axis(Axis(1));
    concatenate(Axis(1), &[bboxes.view(), objectness.view(), scores.view()])
        .map_err(|e| SalError::ShapeMismatch(e.to_string()))
}
