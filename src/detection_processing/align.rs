use std::collections::HashMap;
use ndarray::{s, Array1, Array2, Array3, ArrayView1};
use crate::common::{ClassLabel, SalDetection};
use crate::detection_processing::format::{format_detection, DET_PREFIX_COLS, OBJECTNESS_COL};
use crate::error::{Result, SalError};

/// Row used to pad images with fewer detections than the largest one in the batch.
///
/// Every field is 1 except the objectness, which is 0.
pub fn pad_row(num_classes: usize) -> Array1<f32> {
    let mut row = Array1::ones(DET_PREFIX_COLS + num_classes);
    row[OBJECTNESS_COL] = 0.0;
    row
}

/// True if `row` matches the padding pattern.
///
/// A real detection with box `(1, 1, 1, 1)`, zero objectness and all scores at 1 is
/// indistinguishable from padding. Prefer [`AlignedDetections::counts`] when exactness matters.
pub fn is_padding_row(row: ArrayView1<f32>) -> bool {
    row.len() >= DET_PREFIX_COLS
        && row
            .indexed_iter()
            .all(|(i, &v)| if i == OBJECTNESS_COL { v == 0.0 } else { v == 1.0 })
}

/// Folds a lone positive class score into the objectness.
///
/// When exactly one score is strictly positive, that score becomes the objectness and the class
/// score becomes 1.0. Detectors that only report a top-1 confidence end up with a one-hot class
/// vector. A lone score already at 1.0 is left alone, so applying this twice changes nothing.
///
/// Returns whether the detection was rewritten.
pub fn normalize_dominant_class(objectness: &mut f32, scores: &mut [f32]) -> bool {
    let mut positive = scores.iter().enumerate().filter(|(_, s)| **s > 0.0);
    let (idx, conf) = match (positive.next(), positive.next()) {
        (Some((i, &s)), None) => (i, s),
        _ => return false,
    };
    if conf == 1.0 {
        return false;
    }
    *objectness = conf;
    scores[idx] = 1.0;
    true
}

/// Class-label column order shared by every detection matrix of a batch.
#[derive(Debug, Clone)]
pub struct LabelOrder<L> {
    labels: Vec<L>,
    index: HashMap<L, usize>,
}

impl<L: PartialEq> PartialEq for LabelOrder<L> {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels
    }
}

impl<L: ClassLabel> LabelOrder<L> {
    pub fn from_labels(labels: Vec<L>) -> Self {
        let index = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();
        Self { labels, index }
    }

    /// Takes the score keys of the first detection of the first non-empty set.
    ///
    /// No detections anywhere gives an empty order.
    pub fn discover<'a, I>(sets: I) -> Self
    where
        I: IntoIterator<Item = &'a [SalDetection<L>]>,
        L: 'a,
    {
        let labels = sets
            .into_iter()
            .find_map(|dets| dets.first())
            .map(|det| det.scores.labels().cloned().collect())
            .unwrap_or_default();
        Self::from_labels(labels)
    }

    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn position(&self, label: &L) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Detection matrix width for this order.
    pub fn width(&self) -> usize {
        DET_PREFIX_COLS + self.labels.len()
    }

    /// Objectness and class scores of one detection in this column order, normalized.
    ///
    /// Labels the detection does not report score 0. Labels outside the order are ignored.
    pub fn detection_row(&self, det: &SalDetection<L>) -> (f32, Vec<f32>) {
        let mut scores = vec![0.0; self.labels.len()];
        let mut found = 0;
        for (label, score) in det.scores.iter() {
            match self.position(label) {
                Some(i) => {
                    scores[i] = score;
                    found += 1;
                }
                None => log::debug!("Ignoring label {:?} outside of the class order", label),
            }
        }
        if found < self.labels.len() {
            log::trace!(
                "Detection reports {} of {} classes, missing scores set to 0",
                found,
                self.labels.len()
            );
        }

        let mut objectness = det.objectness.unwrap_or(1.0);
        normalize_dominant_class(&mut objectness, &mut scores);
        (objectness, scores)
    }

    /// Detection matrix of one image, `D x (5 + C)`, without padding.
    pub fn format_detections(&self, dets: &[SalDetection<L>]) -> Result<Array2<f32>> {
        let num_dets = dets.len();
        let num_classes = self.labels.len();

        let mut bboxes = Vec::with_capacity(num_dets * 4);
        let mut scores = Vec::with_capacity(num_dets * num_classes);
        let mut objectness = Vec::with_capacity(num_dets);
        for det in dets {
            let (obj, row) = self.detection_row(det);
            bboxes.extend_from_slice(&det.bbox.to_row());
            scores.extend(row);
            objectness.push(obj);
        }

        let bboxes = Array2::from_shape_vec((num_dets, 4), bboxes)
            .map_err(|e| SalError::ShapeMismatch(e.to_string()))?;
        let scores = Array2::from_shape_vec((num_dets, num_classes), scores)
            .map_err(|e| SalError::ShapeMismatch(e.to_string()))?;
        let objectness = Array1::from(objectness);

        format_detection(bboxes.view(), scores.view(), Some(objectness.view()))
    }
}

/// Detections of a whole batch in one rectangular tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedDetections<L> {
    /// Column order of the class scores.
    pub labels: LabelOrder<L>,
    /// `images x max_detections x (5 + C)`, padded with [`pad_row`].
    pub tensor: Array3<f32>,
    /// Real detection count of each image, the rest of its rows are padding.
    pub counts: Vec<usize>,
}

impl<L> AlignedDetections<L> {
    pub fn num_images(&self) -> usize {
        self.tensor.dim().0
    }

    pub fn max_detections(&self) -> usize {
        self.tensor.dim().1
    }
}

/// Aligns the detections of several images, discovering the class order from the batch itself.
pub fn align_detections<L, S>(sets: &[S]) -> Result<AlignedDetections<L>>
where
    L: ClassLabel,
    S: AsRef<[SalDetection<L>]>,
{
    let labels = LabelOrder::discover(sets.iter().map(|dets| AsRef::<[SalDetection<L>]>::as_ref(dets)));
    align_with_labels(sets, labels)
}

/// Aligns the detections of several images on a class order fixed beforehand.
pub fn align_with_labels<L, S>(sets: &[S], labels: LabelOrder<L>) -> Result<AlignedDetections<L>>
where
    L: ClassLabel,
    S: AsRef<[SalDetection<L>]>,
{
    if sets.is_empty() {
        return Err(SalError::EmptyBatch);
    }

    let mats = sets
        .iter()
        .map(|dets| labels.format_detections(dets.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    let counts: Vec<usize> = mats.iter().map(|m| m.nrows()).collect();
    let max_dets = counts.iter().copied().max().unwrap_or(0);

    let mut tensor = Array3::<f32>::ones((mats.len(), max_dets, labels.width()));
    tensor.slice_mut(s![.., .., OBJECTNESS_COL]).fill(0.0);
    for (i, mat) in mats.iter().enumerate() {
        tensor.slice_mut(s![i, ..mat.nrows(), ..]).assign(mat);
    }

    log::debug!(
        "Aligned {} images: {} classes, up to {} detections per image",
        mats.len(),
        labels.len(),
        max_dets
    );

    Ok(AlignedDetections { labels, tensor, counts })
}
