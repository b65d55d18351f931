//! Occlusion-based saliency for black-box object detectors.

use std::iter;
use std::time::{Duration, Instant};
use anyhow::Result;
use ndarray::{Array3, ArrayView1, ArrayView2, Axis};
use crate::common::{SalDetection, SalImage};
use crate::data::{ConfigOcclusion, FillPolicy, TimeCalc};
use crate::detection_processing::{align_detections, align_with_labels, format_detection, LabelOrder};
use crate::error::SalError;
use crate::interfaces::{Detector, MaskGenerator, SaliencyGenerator, SaliencyMap};
use crate::occlusion::occlude_image_batch;
use crate::utils;

/// Saliency generator built from a mask generator and a detection-based saliency algorithm.
///
/// Each run occludes the image once per mask, runs the detector on every occluded copy, aligns
/// all detections into one tensor and lets the saliency algorithm score the masks.
pub struct PerturbationOcclusion<M, G> {
    perturber: M,
    generator: G,
    config: ConfigOcclusion,
    default_fill: Box<dyn FillPolicy>,
    pub infer_time: TimeCalc,
}

/// Masks, and the detections of the images they occluded, in mask order.
struct Perturbed<L> {
    masks: Array3<f32>,
    detections: Vec<Vec<SalDetection<L>>>,
}

impl<M, G> PerturbationOcclusion<M, G>
where
    M: MaskGenerator,
    G: SaliencyGenerator,
{
    pub fn new(perturber: M, generator: G, config: ConfigOcclusion) -> Self {
        let default_fill = Box::new(config.default_fill);
        Self {
            perturber,
            generator,
            config,
            default_fill,
            infer_time: TimeCalc::default(),
        }
    }

    /// Replaces the policy used for occluded pixels when the config has no explicit fill.
    pub fn with_default_fill_policy(mut self, policy: impl FillPolicy + 'static) -> Self {
        self.default_fill = Box::new(policy);
        self
    }

    pub fn get_config(&self) -> &ConfigOcclusion {
        &self.config
    }

    pub fn perturber(&self) -> &M {
        &self.perturber
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Explains the detector's output on `image`.
    ///
    /// The reference detections come from running `detector` on the unmodified image.
    pub fn explain<D: Detector>(&mut self, image: &SalImage, detector: &mut D) -> Result<SaliencyMap> {
        self.infer_time.clear();
        let start = Instant::now();

        let reference = detector.detect(image)?;
        utils::trace(&mut self.infer_time, "reference detection", start, Duration::ZERO);

        self.run(image, &reference, detector)
    }

    /// Explains already known detections of `image`.
    ///
    /// Class columns are ordered jointly over the reference and the occluded detections, so the
    /// reference matrix and the occluded tensor always agree.
    pub fn explain_with_reference<D: Detector>(
        &mut self,
        image: &SalImage,
        reference: &[SalDetection<D::Label>],
        detector: &mut D,
    ) -> Result<SaliencyMap> {
        self.infer_time.clear();
        self.run(image, reference, detector)
    }

    fn run<D: Detector>(
        &mut self,
        image: &SalImage,
        reference: &[SalDetection<D::Label>],
        detector: &mut D,
    ) -> Result<SaliencyMap> {
        log::info!(
            "Explaining {} reference detections on a {}x{}x{} image",
            reference.len(),
            image.height(),
            image.width(),
            image.channels()
        );
        let perturbed = self.perturb_and_detect(image, detector)?;

        let start = Instant::now();
        let labels = LabelOrder::discover(
            iter::once(reference).chain(perturbed.detections.iter().map(Vec::as_slice)),
        );
        let ref_dets = labels.format_detections(reference)?;
        let aligned = align_with_labels(&perturbed.detections, labels)?;
        utils::trace(&mut self.infer_time, "alignment", start, Duration::ZERO);

        self.score(ref_dets.view(), aligned.tensor, &perturbed.masks)
    }

    /// Explains reference detections given as raw arrays.
    ///
    /// # Arguments
    ///
    /// * `bboxes` - `D x 4` reference boxes.
    /// * `scores` - `D x C` reference class scores, columns in the order the detector reports them.
    /// * `objectness` - Optional `D` reference objectness, 1.0 when omitted.
    pub fn explain_with_reference_arrays<D: Detector>(
        &mut self,
        image: &SalImage,
        bboxes: ArrayView2<f32>,
        scores: ArrayView2<f32>,
        objectness: Option<ArrayView1<f32>>,
        detector: &mut D,
    ) -> Result<SaliencyMap> {
        self.infer_time.clear();
        let ref_dets = format_detection(bboxes, scores, objectness)?;
        let perturbed = self.perturb_and_detect(image, detector)?;

        let start = Instant::now();
        let aligned = align_detections(&perturbed.detections)?;
        let (num_images, max_dets, width) = aligned.tensor.dim();
        let occluded = if width == ref_dets.ncols() {
            aligned.tensor
        } else if max_dets == 0 {
            // nothing detected anywhere, only the class count has to follow the reference
            Array3::zeros((num_images, 0, ref_dets.ncols()))
        } else {
            return Err(SalError::ShapeMismatch(format!(
                "reference detections have {} columns, occluded detections {}",
                ref_dets.ncols(),
                width
            ))
            .into());
        };
        utils::trace(&mut self.infer_time, "alignment", start, Duration::ZERO);

        self.score(ref_dets.view(), occluded, &perturbed.masks)
    }

    fn perturb_and_detect<D: Detector>(&mut self, image: &SalImage, detector: &mut D) -> Result<Perturbed<D::Label>> {
        let start = Instant::now();
        let mut elapsed = start.elapsed();

        let masks = self.perturber.generate(image)?;
        elapsed = utils::trace(&mut self.infer_time, "mask generation", start, elapsed);
        if masks.len_of(Axis(0)) == 0 {
            log::warn!("Mask generator returned no masks");
        }

        let occluded = occlude_image_batch(
            image,
            masks.view(),
            self.config.fill.as_ref(),
            &*self.default_fill,
            self.config.execution(),
        )?;
        elapsed = utils::trace(&mut self.infer_time, "occlusion", start, elapsed);

        let detections = detector.detect_batch(&occluded)?;
        if detections.len() != occluded.len() {
            return Err(SalError::ShapeMismatch(format!(
                "detector returned {} detection sets for {} images",
                detections.len(),
                occluded.len()
            ))
            .into());
        }
        utils::trace(&mut self.infer_time, "occluded detection", start, elapsed);
        log::debug!(
            "{} masks ({} execution), {} occluded detections",
            masks.len_of(Axis(0)),
            self.config.execution().as_str_lowercase(),
            detections.iter().map(Vec::len).sum::<usize>()
        );

        Ok(Perturbed { masks, detections })
    }

    fn score(
        &mut self,
        ref_dets: ArrayView2<f32>,
        occluded: Array3<f32>,
        masks: &Array3<f32>,
    ) -> Result<SaliencyMap> {
        let start = Instant::now();
        let saliency = self.generator.generate(ref_dets, occluded.view(), masks.view())?;
        utils::trace(&mut self.infer_time, "saliency", start, Duration::ZERO);

        if self.config.profile {
            log::info!("> {} | Total: {:?}", self.infer_time.summary(), self.infer_time.total());
        }
        Ok(saliency)
    }
}
