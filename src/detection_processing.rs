pub mod align;
pub mod format;

pub use align::{
    align_detections, align_with_labels, is_padding_row, normalize_dominant_class, pad_row,
    AlignedDetections, LabelOrder,
};
pub use format::{format_detection, DET_PREFIX_COLS, OBJECTNESS_COL};
