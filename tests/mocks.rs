#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use anyhow::anyhow;
use ndarray::{Array3, ArrayView2, ArrayView3, Axis};
use occlusion_saliency::common::{ClassScores, SalDetection, SalImage};
use occlusion_saliency::interfaces::{Detector, MaskGenerator, SaliencyGenerator, SaliencyMap};

pub type Det = SalDetection<&'static str>;

pub fn det(bbox: [f32; 4], scores: &[(&'static str, f32)]) -> Det {
    SalDetection::new(bbox.into(), scores.iter().copied().collect::<ClassScores<_>>())
}

/// Answers the reference image first, then each occluded image, from a script.
pub struct ScriptedDetector {
    pub script: VecDeque<Vec<Det>>,
    pub seen: Vec<SalImage>,
}

impl ScriptedDetector {
    pub fn new(script: Vec<Vec<Det>>) -> Self {
        Self {
            script: script.into(),
            seen: Vec::new(),
        }
    }
}

impl Detector for ScriptedDetector {
    type Label = &'static str;

    fn detect(&mut self, image: &SalImage) -> anyhow::Result<Vec<Det>> {
        self.seen.push(image.clone());
        self.script.pop_front().ok_or_else(|| anyhow!("script exhausted"))
    }
}

/// Reports one box whose "bright" score is the image mean divided by `scale`.
pub struct BrightnessDetector {
    pub scale: f32,
}

impl Detector for BrightnessDetector {
    type Label = String;

    fn detect(&mut self, image: &SalImage) -> anyhow::Result<Vec<SalDetection<String>>> {
        let mean = image.mean().unwrap_or(0.0) / self.scale;
        Ok(vec![SalDetection::default()
            .with_x1y1_x2y2(0., 0., image.width() as f32, image.height() as f32)
            .with_score("bright".to_string(), mean)
            .with_score("dark".to_string(), 1.0 - mean)])
    }
}

/// Returns a batch with one set too few.
pub struct ShortBatchDetector;

impl Detector for ShortBatchDetector {
    type Label = &'static str;

    fn detect(&mut self, _image: &SalImage) -> anyhow::Result<Vec<Det>> {
        Ok(vec![])
    }

    fn detect_batch(&mut self, images: &[SalImage]) -> anyhow::Result<Vec<Vec<Det>>> {
        Ok(vec![vec![]; images.len().saturating_sub(1)])
    }
}

#[derive(Debug, thiserror::Error)]
#[error("detector offline")]
pub struct DetectorOffline;

pub struct OfflineDetector;

impl Detector for OfflineDetector {
    type Label = &'static str;

    fn detect(&mut self, _image: &SalImage) -> anyhow::Result<Vec<Det>> {
        Err(DetectorOffline.into())
    }
}

/// Occludes the left half, then the right half.
pub struct HalvesMasks;

impl MaskGenerator for HalvesMasks {
    fn generate(&self, image: &SalImage) -> anyhow::Result<Array3<f32>> {
        let (h, w) = image.spatial_shape();
        Ok(Array3::from_shape_fn((2, h, w), |(i, _, x)| {
            let left = x < w / 2;
            if (i == 0) == left { 1.0 } else { 0.0 }
        }))
    }
}

/// Returns masks of a fixed, possibly wrong, spatial shape.
pub struct FixedMasks(pub Array3<f32>);

impl MaskGenerator for FixedMasks {
    fn generate(&self, _image: &SalImage) -> anyhow::Result<Array3<f32>> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Received {
    pub reference: ndarray::Array2<f32>,
    pub occluded: Array3<f32>,
    pub masks: Array3<f32>,
}

/// Keeps what it was given and weights every mask by the objectness it left behind.
#[derive(Default)]
pub struct RecordingSaliency {
    pub received: Mutex<Option<Received>>,
}

impl RecordingSaliency {
    pub fn take(&self) -> Received {
        self.received
            .lock()
            .unwrap()
            .take()
            .expect("saliency generator was not called")
    }
}

impl SaliencyGenerator for RecordingSaliency {
    fn generate(
        &self,
        reference: ArrayView2<f32>,
        occluded: ArrayView3<f32>,
        masks: ArrayView3<f32>,
    ) -> anyhow::Result<SaliencyMap> {
        *self.received.lock().unwrap() = Some(Received {
            reference: reference.to_owned(),
            occluded: occluded.to_owned(),
            masks: masks.to_owned(),
        });

        let (_, h, w) = masks.dim();
        let mut saliency = Array3::zeros((reference.nrows(), h, w));
        for (i, mask) in masks.axis_iter(Axis(0)).enumerate() {
            let kept = if occluded.dim().1 > 0 { occluded[[i, 0, 4]] } else { 0.0 };
            for mut map in saliency.axis_iter_mut(Axis(0)) {
                map.scaled_add(1.0 - kept, &mask);
            }
        }
        Ok(saliency)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("saliency diverged")]
pub struct Diverged;

pub struct DivergingSaliency;

impl SaliencyGenerator for DivergingSaliency {
    fn generate(
        &self,
        _reference: ArrayView2<f32>,
        _occluded: ArrayView3<f32>,
        _masks: ArrayView3<f32>,
    ) -> anyhow::Result<SaliencyMap> {
        Err(Diverged.into())
    }
}
