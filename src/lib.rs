mod utils;
pub mod common;
pub mod data;
pub mod detection_processing;
pub mod error;
pub mod interfaces;
pub mod occlusion;
pub mod pipeline;

use crate::common::SalImage;
use crate::data::{ConfigOcclusion, ExecutionType, Fill};
use crate::interfaces::{Detector, MaskGenerator, SaliencyGenerator, SaliencyMap};
use crate::pipeline::PerturbationOcclusion;

pub use crate::error::{Result, SalError};

/// Explains `detector` on `image` in one call.
///
/// # Arguments
///
/// * `image` - Reference image.
/// * `detector` - Black-box detector, run on the reference and on every occluded image.
/// * `mask_generator` - Source of the occlusion masks.
/// * `saliency_generator` - Scores the masks from the aligned detections.
/// * `fill` - Color of occluded pixels, zero when `None`.
/// * `execution` - Run mask application inline or on a pool of workers.
pub fn explain<D, M, G>(
    image: &SalImage,
    detector: &mut D,
    mask_generator: &M,
    saliency_generator: &G,
    fill: Option<Fill>,
    execution: ExecutionType,
) -> anyhow::Result<SaliencyMap>
where
    D: Detector,
    M: MaskGenerator + ?Sized,
    G: SaliencyGenerator + ?Sized,
{
    let mut config = ConfigOcclusion::new().with_execution(execution);
    config.fill = fill;

    log::info!("Running occlusion saliency with:\n{}", config.to_string());
    PerturbationOcclusion::new(mask_generator, saliency_generator, config).explain(image, detector)
}
