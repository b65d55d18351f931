//! Contracts of the black-box algorithms the pipeline drives.
//!
//! Concrete detectors, mask generators and saliency generators live outside this crate.

use ndarray::{Array3, ArrayView2, ArrayView3};
use crate::common::{ClassLabel, SalDetection, SalImage};

/// Saliency of every reference detection, `detections x height x width`.
pub type SaliencyMap = Array3<f32>;

/// Object detector under explanation.
pub trait Detector {
    type Label: ClassLabel;

    /// Detections of a single image.
    fn detect(&mut self, image: &SalImage) -> anyhow::Result<Vec<SalDetection<Self::Label>>>;

    /// Detections of several images, one set per image in input order.
    ///
    /// Detectors able to batch should override this.
    fn detect_batch(&mut self, images: &[SalImage]) -> anyhow::Result<Vec<Vec<SalDetection<Self::Label>>>> {
        images.iter().map(|image| self.detect(image)).collect()
    }
}

/// Produces the occlusion masks for an image, `masks x height x width`, values in [0, 1].
pub trait MaskGenerator {
    fn generate(&self, image: &SalImage) -> anyhow::Result<Array3<f32>>;
}

/// Turns aligned detections and the masks that produced them into saliency maps.
pub trait SaliencyGenerator {
    /// # Arguments
    ///
    /// * `reference` - `D x (5 + C)` detections of the unmodified image.
    /// * `occluded` - `N x max_detections x (5 + C)` detections of the occluded images.
    /// * `masks` - `N x H x W` masks, row `i` produced occluded image `i`.
    fn generate(
        &self,
        reference: ArrayView2<f32>,
        occluded: ArrayView3<f32>,
        masks: ArrayView3<f32>,
    ) -> anyhow::Result<SaliencyMap>;
}

impl<D: Detector + ?Sized> Detector for &mut D {
    type Label = D::Label;

    fn detect(&mut self, image: &SalImage) -> anyhow::Result<Vec<SalDetection<Self::Label>>> {
        (**self).detect(image)
    }

    fn detect_batch(&mut self, images: &[SalImage]) -> anyhow::Result<Vec<Vec<SalDetection<Self::Label>>>> {
        (**self).detect_batch(images)
    }
}

impl<M: MaskGenerator + ?Sized> MaskGenerator for &M {
    fn generate(&self, image: &SalImage) -> anyhow::Result<Array3<f32>> {
        (**self).generate(image)
    }
}

impl<M: MaskGenerator + ?Sized> MaskGenerator for Box<M> {
    fn generate(&self, image: &SalImage) -> anyhow::Result<Array3<f32>> {
        (**self).generate(image)
    }
}

impl<G: SaliencyGenerator + ?Sized> SaliencyGenerator for &G {
    fn generate(
        &self,
        reference: ArrayView2<f32>,
        occluded: ArrayView3<f32>,
        masks: ArrayView3<f32>,
    ) -> anyhow::Result<SaliencyMap> {
        (**self).generate(reference, occluded, masks)
    }
}

impl<G: SaliencyGenerator + ?Sized> SaliencyGenerator for Box<G> {
    fn generate(
        &self,
        reference: ArrayView2<f32>,
        occluded: ArrayView3<f32>,
        masks: ArrayView3<f32>,
    ) -> anyhow::Result<SaliencyMap> {
        (**self).generate(reference, occluded, masks)
    }
}

/// Mask generator backed by a closure.
pub struct FnMasks<F>(pub F);

impl<F> MaskGenerator for FnMasks<F>
where
    F: Fn(&SalImage) -> anyhow::Result<Array3<f32>>,
{
    fn generate(&self, image: &SalImage) -> anyhow::Result<Array3<f32>> {
        (self.0)(image)
    }
}

/// Saliency generator backed by a closure.
pub struct FnSaliency<F>(pub F);

impl<F> SaliencyGenerator for FnSaliency<F>
where
    F: Fn(ArrayView2<f32>, ArrayView3<f32>, ArrayView3<f32>) -> anyhow::Result<SaliencyMap>,
{
    fn generate(
        &self,
        reference: ArrayView2<f32>,
        occluded: ArrayView3<f32>,
        masks: ArrayView3<f32>,
    ) -> anyhow::Result<SaliencyMap> {
        (self.0)(reference, occluded, masks)
    }
}
