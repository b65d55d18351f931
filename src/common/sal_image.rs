use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use ndarray::{Array2, Array3, ArrayView3, Axis};
use crate::error::{Result, SalError};

/// Immutable `height x width x channels` image used throughout the occlusion pipeline.
///
/// Pixel values keep the scale of the source (0-255 for `image` buffers).
#[derive(Debug, Clone, PartialEq)]
pub struct SalImage {
    data: Array3<f32>,
}

impl std::ops::Deref for SalImage {
    type Target = Array3<f32>;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl From<Array3<f32>> for SalImage {
    fn from(data: Array3<f32>) -> Self {
        Self { data }
    }
}

impl From<Array2<f32>> for SalImage {
    fn from(data: Array2<f32>) -> Self {
        Self {
            data: data.insert_axis(Axis(2)),
        }
    }
}

impl From<GrayImage> for SalImage {
    fn from(image: GrayImage) -> Self {
        let (w, h) = image.dimensions();
        let data = Array3::from_shape_fn((h as usize, w as usize, 1), |(y, x, _)| {
            image.get_pixel(x as u32, y as u32)[0] as f32
        });
        Self { data }
    }
}

impl From<RgbImage> for SalImage {
    fn from(image: RgbImage) -> Self {
        let (w, h) = image.dimensions();
        let data = Array3::from_shape_fn((h as usize, w as usize, 3), |(y, x, c)| {
            image.get_pixel(x as u32, y as u32)[c] as f32
        });
        Self { data }
    }
}

impl From<RgbaImage> for SalImage {
    fn from(image: RgbaImage) -> Self {
        let (w, h) = image.dimensions();
        let data = Array3::from_shape_fn((h as usize, w as usize, 4), |(y, x, c)| {
            image.get_pixel(x as u32, y as u32)[c] as f32
        });
        Self { data }
    }
}

impl From<DynamicImage> for SalImage {
    fn from(image: DynamicImage) -> Self {
        match image.color().channel_count() {
            1 | 2 => image.to_luma8().into(),
            4 => image.to_rgba8().into(),
            _ => image.to_rgb8().into(),
        }
    }
}

impl SalImage {
    pub fn new(data: Array3<f32>) -> Self {
        Self { data }
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// `(height, width)`, the shape every occlusion mask must have.
    pub fn spatial_shape(&self) -> (usize, usize) {
        let (h, w, _) = self.data.dim();
        (h, w)
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    pub fn into_array(self) -> Array3<f32> {
        self.data
    }

    /// Mean value of each channel. Empty images report zeros.
    pub fn channel_means(&self) -> Vec<f32> {
        let pixels = self.height() * self.width();
        if pixels == 0 {
            return vec![0.0; self.channels()];
        }
        self.data
            .axis_iter(Axis(2))
            .map(|channel| channel.sum() / pixels as f32)
            .collect()
    }

    /// Converts back to an 8-bit `image` buffer, clamping values to 0-255.
    pub fn to_dyn(&self) -> Result<DynamicImage> {
        let (h, w, c) = self.data.dim();
        let px = |x: u32, y: u32, c: usize| self.data[[y as usize, x as usize, c]].round().clamp(0., 255.) as u8;

        let image = match c {
            1 => DynamicImage::from(GrayImage::from_fn(w as u32, h as u32, |x, y| Luma([px(x, y, 0)]))),
            3 => DynamicImage::from(RgbImage::from_fn(w as u32, h as u32, |x, y| {
                Rgb([px(x, y, 0), px(x, y, 1), px(x, y, 2)])
            })),
            4 => DynamicImage::from(RgbaImage::from_fn(w as u32, h as u32, |x, y| {
                Rgba([px(x, y, 0), px(x, y, 1), px(x, y, 2), px(x, y, 3)])
            })),
            _ => {
                return Err(SalError::ShapeMismatch(format!(
                    "cannot convert a {c}-channel image to an 8-bit buffer"
                )))
            }
        };
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn gray_array_gets_one_channel() {
        let image = SalImage::from(array![[1., 2., 3.], [4., 5., 6.]]);
        assert_eq!(image.spatial_shape(), (2, 3));
        assert_eq!(image.channels(), 1);
        assert_eq!(image[[1, 2, 0]], 6.);
        assert_eq!(image.channel_means(), vec![3.5]);
    }

    #[test]
    fn rgb_buffer_round_trips() {
        let rgb = RgbImage::from_fn(4, 2, |x, y| Rgb([x as u8, y as u8, 200]));
        let image = SalImage::from(DynamicImage::from(rgb.clone()));
        assert_eq!(image.shape(), &[2, 4, 3]);
        assert_eq!(image[[1, 3, 0]], 3.);
        assert_eq!(image[[1, 3, 1]], 1.);

        let back = image.to_dyn().unwrap().to_rgb8();
        assert_eq!(back, rgb);
    }

    #[test]
    fn two_channel_image_cannot_be_exported() {
        let image = SalImage::new(Array3::zeros((2, 2, 2)));
        assert!(matches!(image.to_dyn(), Err(SalError::ShapeMismatch(_))));
    }
}
