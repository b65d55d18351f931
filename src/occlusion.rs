//! Rendering of occluded image variants.
//!
//! A mask value is the occlusion coverage of a pixel: 0 keeps the reference pixel, 1 replaces it
//! with the fill color, anything in between blends the two linearly.

use ndarray::{Array3, ArrayView2, ArrayView3, Axis, Zip};
use rayon::prelude::*;
use crate::common::SalImage;
use crate::data::{ExecutionType, Fill, FillPolicy};
use crate::error::{Result, SalError};

/// Converts boolean masks, `true` meaning occluded, to coverage masks.
pub fn masks_from_bool(masks: ArrayView3<bool>) -> Array3<f32> {
    masks.mapv(|occluded| if occluded { 1.0 } else { 0.0 })
}

fn check_mask(reference: &SalImage, index: usize, mask: (usize, usize)) -> Result<()> {
    let expected = reference.spatial_shape();
    if mask != expected {
        return Err(SalError::InvalidMask {
            index,
            expected,
            got: mask,
        });
    }
    Ok(())
}

/// Fill values for `reference` from `policy`, one per channel.
fn resolve_fill(reference: &SalImage, policy: &dyn FillPolicy) -> Result<Vec<f32>> {
    let fill = policy.fill_values(reference)?;
    if fill.len() != reference.channels() {
        return Err(SalError::InvalidFill {
            expected: reference.channels(),
            got: fill.len(),
        });
    }
    Ok(fill)
}

/// Blends `fill` into a copy of `reference` wherever `mask` is non-zero.
fn blend(reference: &SalImage, mask: ArrayView2<f32>, fill: &[f32]) -> SalImage {
    let mut out = reference.data().clone();
    Zip::from(out.lanes_mut(Axis(2)))
        .and(mask)
        .for_each(|mut pixel, &m| {
            if m != 0.0 {
                pixel
                    .iter_mut()
                    .zip(fill)
                    .for_each(|(v, &f)| *v = *v * (1.0 - m) + f * m);
            }
        });
    SalImage::from(out)
}

/// Occludes a single copy of `reference`.
pub fn occlude_image(reference: &SalImage, mask: ArrayView2<f32>, fill: &dyn FillPolicy) -> Result<SalImage> {
    check_mask(reference, 0, mask.dim())?;
    let fill = resolve_fill(reference, fill)?;
    Ok(blend(reference, mask, &fill))
}

/// Produces one occluded copy of `reference` per mask, in mask order.
///
/// # Arguments
///
/// * `reference` - Image to occlude. Never modified.
/// * `masks` - `N x H x W` coverage masks.
/// * `fill` - Explicit fill color, `None` to use `default_fill`.
/// * `default_fill` - Policy computing the fill color from the reference when none is given.
/// * `execution` - Run inline, or spread the masks over a pool of workers.
///
/// # Returns
///
/// * `Vec<SalImage>` - Occluded images, entry `i` made with mask `i` whatever the execution.
pub fn occlude_image_batch(
    reference: &SalImage,
    masks: ArrayView3<f32>,
    fill: Option<&Fill>,
    default_fill: &dyn FillPolicy,
    execution: ExecutionType,
) -> Result<Vec<SalImage>> {
    let (num_masks, h, w) = masks.dim();
    if num_masks > 0 {
        check_mask(reference, 0, (h, w))?;
    }

    let fill = match fill {
        Some(fill) => resolve_fill(reference, fill)?,
        None => resolve_fill(reference, default_fill)?,
    };

    let occluded: Vec<SalImage> = match execution.workers() {
        None => masks
            .outer_iter()
            .map(|mask| blend(reference, mask, &fill))
            .collect(),
        Some(n) => {
            log::debug!("Occluding {} images on {} workers", num_masks, n);
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            // indexed collect writes result i into slot i regardless of completion order
            pool.install(|| {
                (0..num_masks)
                    .into_par_iter()
                    .map(|i| blend(reference, masks.index_axis(Axis(0), i), &fill))
                    .collect()
            })
        }
    };

    Ok(occluded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DefaultFill;
    use ndarray::{array, Array2};

    fn ramp() -> SalImage {
        SalImage::from(Array2::from_shape_fn((4, 4), |(y, x)| (y * 4 + x) as f32))
    }

    #[test]
    fn full_coverage_replaces_pixels() {
        let reference = ramp();
        let mut mask = Array2::<f32>::zeros((4, 4));
        mask.row_mut(0).fill(1.0);

        let out = occlude_image(&reference, mask.view(), &Fill::Scalar(-1.)).unwrap();
        assert!(out.index_axis(Axis(0), 0).iter().all(|&v| v == -1.));
        assert_eq!(out.index_axis(Axis(0), 1), reference.index_axis(Axis(0), 1));
    }

    #[test]
    fn partial_coverage_blends() {
        let reference = SalImage::from(array![[10., 20.]]);
        let mask = array![[0.5, 0.25]];
        let out = occlude_image(&reference, mask.view(), &Fill::Scalar(0.)).unwrap();
        assert_eq!(out.data(), &array![[[5.], [15.]]]);
    }

    #[test]
    fn per_channel_fill() {
        let reference = SalImage::new(Array3::from_elem((2, 2, 3), 9.));
        let masks = masks_from_bool(array![[[true, false], [false, false]]].view());
        let out = occlude_image_batch(
            &reference,
            masks.view(),
            Some(&Fill::from([1.0_f32, 2., 3.])),
            &DefaultFill::Zero,
            ExecutionType::Sequential,
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].slice(ndarray::s![0, 0, ..]).to_vec(), vec![1., 2., 3.]);
        assert_eq!(out[0].slice(ndarray::s![1, 1, ..]).to_vec(), vec![9., 9., 9.]);
    }

    #[test]
    fn default_fill_used_without_explicit_fill() {
        let reference = ramp();
        let masks = Array3::<f32>::ones((1, 4, 4));
        let out = occlude_image_batch(&reference, masks.view(), None, &DefaultFill::Mean, ExecutionType::Sequential)
            .unwrap();
        assert!(out[0].iter().all(|&v| v == 7.5));
    }

    #[test]
    fn wrong_mask_shape_fails() {
        let reference = ramp();
        let masks = Array3::<f32>::zeros((2, 3, 4));
        let err = occlude_image_batch(&reference, masks.view(), None, &DefaultFill::Zero, ExecutionType::Threads(2))
            .unwrap_err();
        assert!(matches!(err, SalError::InvalidMask { index: 0, expected: (4, 4), got: (3, 4) }));
    }

    #[test]
    fn wrong_fill_length_fails() {
        let reference = ramp();
        let masks = Array3::<f32>::zeros((1, 4, 4));
        let fill = Fill::from(vec![1.0_f32, 2.]);
        let err = occlude_image_batch(&reference, masks.view(), Some(&fill), &DefaultFill::Zero, ExecutionType::Sequential)
            .unwrap_err();
        assert!(matches!(err, SalError::InvalidFill { expected: 1, got: 2 }));
    }

    struct TwoValues;

    impl FillPolicy for TwoValues {
        fn fill_values(&self, _image: &SalImage) -> Result<Vec<f32>> {
            Ok(vec![1., 2.])
        }
    }

    #[test]
    fn single_occlusion_checks_policy_length() {
        let mask = Array2::<f32>::ones((4, 4));
        let err = occlude_image(&ramp(), mask.view(), &TwoValues).unwrap_err();
        assert!(matches!(err, SalError::InvalidFill { expected: 1, got: 2 }));

        let masks = Array3::<f32>::ones((1, 4, 4));
        let err = occlude_image_batch(&ramp(), masks.view(), None, &TwoValues, ExecutionType::Sequential).unwrap_err();
        assert!(matches!(err, SalError::InvalidFill { expected: 1, got: 2 }));
    }

    #[test]
    fn zero_workers_match_sequential() {
        let reference = ramp();
        let masks = Array3::from_shape_fn((5, 4, 4), |(i, y, x)| ((i + y + x) % 3) as f32 / 2.);
        let run = |execution| {
            occlude_image_batch(&reference, masks.view(), Some(&Fill::Scalar(-2.)), &DefaultFill::Zero, execution)
                .unwrap()
        };
        assert_eq!(run(ExecutionType::Threads(0)), run(ExecutionType::Sequential));
    }

    #[test]
    fn no_masks_no_images() {
        let masks = Array3::<f32>::zeros((0, 4, 4));
        let out = occlude_image_batch(&ramp(), masks.view(), None, &DefaultFill::Zero, ExecutionType::Threads(3)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn reference_is_untouched() {
        let reference = ramp();
        let before = reference.clone();
        let masks = Array3::<f32>::ones((3, 4, 4));
        occlude_image_batch(&reference, masks.view(), Some(&Fill::Scalar(0.)), &DefaultFill::Zero, ExecutionType::Threads(2))
            .unwrap();
        assert_eq!(reference, before);
    }
}
