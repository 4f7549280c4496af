use crate::error::{Result, WorldError};
use image::{DynamicImage, GenericImageView};
use std::path::Path;

/// Row-major grid of normalised height samples in `[0, 1]`.
///
/// Rows run along Z and columns along X, so the sample for grid column
/// `(x, z)` lives at `z * resolution_x + x`, matching the pixel layout of the
/// height image it was decoded from.
#[derive(Clone, Debug)]
pub struct HeightSamples {
    resolution_x: usize,
    resolution_z: usize,
    samples: Vec<f32>,
}

impl HeightSamples {
    pub fn from_raw(resolution_x: usize, resolution_z: usize, samples: Vec<f32>) -> Result<Self> {
        let expected = resolution_x * resolution_z;
        if samples.len() != expected {
            return Err(WorldError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            resolution_x,
            resolution_z,
            samples,
        })
    }

    /// Decodes a greyscale height image; the red channel divided by 255 is the sample.
    pub fn from_image(
        img: &DynamicImage,
        resolution_x: usize,
        resolution_z: usize,
    ) -> Result<Self> {
        let (width, height) = img.dimensions();
        if width as usize != resolution_x || height as usize != resolution_z {
            return Err(WorldError::ImageDimensionMismatch {
                width,
                height,
                resolution_x,
                resolution_z,
            });
        }

        let rgb = img.to_rgb8();
        let samples = rgb.pixels().map(|p| p.0[0] as f32 / 255.0).collect();
        Self::from_raw(resolution_x, resolution_z, samples)
    }

    pub fn from_image_path<P: AsRef<Path>>(
        path: P,
        resolution_x: usize,
        resolution_z: usize,
    ) -> Result<Self> {
        let img = image::open(path.as_ref())?;
        log::info!(
            "loaded height image {} ({}x{})",
            path.as_ref().display(),
            img.width(),
            img.height()
        );
        Self::from_image(&img, resolution_x, resolution_z)
    }

    /// Rolling hills used when no height image is configured.
    pub fn procedural(resolution_x: usize, resolution_z: usize) -> Self {
        let mut samples = Vec::with_capacity(resolution_x * resolution_z);
        for z in 0..resolution_z {
            for x in 0..resolution_x {
                let h1 = (x as f32 * 0.1).sin() * (z as f32 * 0.1).cos();
                let h2 = (x as f32 * 0.05).sin() * (z as f32 * 0.05).cos();

                // h1 + h2 lies in [-2, 2]
                samples.push(((h1 + h2 + 2.0) * 0.25).clamp(0.0, 1.0));
            }
        }
        Self {
            resolution_x,
            resolution_z,
            samples,
        }
    }

    pub fn resolution_x(&self) -> usize {
        self.resolution_x
    }

    pub fn resolution_z(&self) -> usize {
        self.resolution_z
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at grid column `(x, z)`, or `None` outside the grid.
    pub fn get(&self, x: usize, z: usize) -> Option<f32> {
        if x >= self.resolution_x || z >= self.resolution_z {
            return None;
        }
        self.samples.get(z * self.resolution_x + x).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn raw_samples_must_match_resolution() {
        let err = HeightSamples::from_raw(4, 4, vec![0.0; 15]).unwrap_err();
        assert!(matches!(
            err,
            WorldError::SampleCountMismatch {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn image_red_channel_becomes_sample() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 1, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([51, 51, 51]));
        let samples = HeightSamples::from_image(&DynamicImage::ImageRgb8(img), 3, 2).unwrap();

        assert_eq!(samples.get(2, 1), Some(1.0));
        assert!((samples.get(1, 0).unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(samples.get(0, 0), Some(0.0));
    }

    #[test]
    fn greyscale_image_is_accepted() {
        let img = GrayImage::from_pixel(2, 2, Luma([128]));
        let samples = HeightSamples::from_image(&DynamicImage::ImageLuma8(img), 2, 2).unwrap();
        assert!((samples.get(1, 1).unwrap() - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn image_dimensions_must_match() {
        let img = RgbImage::new(5, 4);
        let err = HeightSamples::from_image(&DynamicImage::ImageRgb8(img), 4, 4).unwrap_err();
        assert!(matches!(err, WorldError::ImageDimensionMismatch { width: 5, .. }));
    }

    #[test]
    fn procedural_samples_stay_normalised() {
        let samples = HeightSamples::procedural(64, 48);
        assert_eq!(samples.len(), 64 * 48);
        for z in 0..48 {
            for x in 0..64 {
                let s = samples.get(x, z).unwrap();
                assert!((0.0..=1.0).contains(&s));
            }
        }
        assert_eq!(samples.get(64, 0), None);
    }
}
