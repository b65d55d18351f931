use serde::{Deserialize, Serialize};
use crate::common::SalImage;
use crate::error::{Result, SalError};

/// Produces the per-channel color written into occluded pixels of an image.
pub trait FillPolicy: Send + Sync {
    /// One value per channel of `image`.
    fn fill_values(&self, image: &SalImage) -> Result<Vec<f32>>;
}

/// Explicit fill color: a scalar for every channel, or one value per channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fill {
    Scalar(f32),
    Channels(Vec<f32>),
}

impl FillPolicy for Fill {
    fn fill_values(&self, image: &SalImage) -> Result<Vec<f32>> {
        match self {
            Fill::Scalar(v) => Ok(vec![*v; image.channels()]),
            Fill::Channels(values) if values.len() == image.channels() => Ok(values.clone()),
            Fill::Channels(values) => Err(SalError::InvalidFill {
                expected: image.channels(),
                got: values.len(),
            }),
        }
    }
}

impl From<f32> for Fill {
    fn from(v: f32) -> Self {
        Fill::Scalar(v)
    }
}

impl From<Vec<f32>> for Fill {
    fn from(values: Vec<f32>) -> Self {
        Fill::Channels(values)
    }
}

impl<const N: usize> From<[f32; N]> for Fill {
    fn from(values: [f32; N]) -> Self {
        Fill::Channels(values.to_vec())
    }
}

/// Fill used when no explicit color was configured.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultFill {
    /// Occluded pixels fade to black.
    #[default] Zero,
    /// Occluded pixels take the mean color of the reference image.
    Mean,
}

impl FillPolicy for DefaultFill {
    fn fill_values(&self, image: &SalImage) -> Result<Vec<f32>> {
        match self {
            DefaultFill::Zero => Ok(vec![0.0; image.channels()]),
            DefaultFill::Mean => Ok(image.channel_means()),
        }
    }
}

impl DefaultFill {
    pub fn from_str(fill: &str) -> Option<Self> {
        match fill.to_lowercase().as_str() {
            "zero" => Some(DefaultFill::Zero),
            "mean" => Some(DefaultFill::Mean),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultFill::Zero => "zero",
            DefaultFill::Mean => "mean",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn rgb() -> SalImage {
        SalImage::new(Array3::from_shape_fn((2, 2, 3), |(_, _, c)| (c * 10) as f32))
    }

    #[test]
    fn scalar_fill_spreads_over_channels() {
        assert_eq!(Fill::Scalar(7.).fill_values(&rgb()).unwrap(), vec![7., 7., 7.]);
    }

    #[test]
    fn channel_fill_must_match_image() {
        assert_eq!(Fill::from([1.0_f32, 2., 3.]).fill_values(&rgb()).unwrap(), vec![1., 2., 3.]);
        let err = Fill::from(vec![1.0_f32, 2.]).fill_values(&rgb()).unwrap_err();
        assert!(matches!(err, SalError::InvalidFill { expected: 3, got: 2 }));
    }

    #[test]
    fn default_fills() {
        assert_eq!(DefaultFill::Zero.fill_values(&rgb()).unwrap(), vec![0., 0., 0.]);
        assert_eq!(DefaultFill::Mean.fill_values(&rgb()).unwrap(), vec![0., 10., 20.]);
        assert_eq!(DefaultFill::from_str("MEAN"), Some(DefaultFill::Mean));
    }

    #[test]
    fn fill_json_is_scalar_or_list() {
        assert_eq!(serde_json::from_str::<Fill>("128").unwrap(), Fill::Scalar(128.));
        assert_eq!(serde_json::from_str::<Fill>("[1, 2, 3]").unwrap(), Fill::Channels(vec![1., 2., 3.]));
    }
}
