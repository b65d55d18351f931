mod class_scores;
mod sal_box;
mod sal_detection;
mod sal_image;

pub use class_scores::*;
pub use sal_box::*;
pub use sal_detection::*;
pub use sal_image::*;
