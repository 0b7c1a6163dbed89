use image::{GrayImage, RgbaImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr, VariantNames};

use crate::{
    error::{GlyphError, Result},
    traits::MaskClassifier,
    types::InkMask,
};

/// Channel layout of a raw pixel buffer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, IntoStaticStr, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PixelLayout {
    /// Four bytes per pixel; alpha is ignored
    #[default]
    Rgba,
    /// One luminance byte per pixel
    Luma,
}

impl PixelLayout {
    pub fn channels(self) -> usize {
        match self {
            Self::Rgba => 4,
            Self::Luma => 1,
        }
    }
}

/// Fixed-threshold ink classifier.
///
/// A pixel is ink when its average colour intensity is strictly below
/// `threshold`.
#[derive(Debug, Clone)]
pub struct LuminanceClassifier {
    pub threshold: u8,
    pub layout: PixelLayout,
}

impl Default for LuminanceClassifier {
    fn default() -> Self {
        Self {
            threshold: 160,
            layout: PixelLayout::Rgba,
        }
    }
}

impl LuminanceClassifier {
    pub fn new(threshold: u8, layout: PixelLayout) -> Self {
        Self { threshold, layout }
    }

    /// Classify a single pixel sample laid out as `layout`
    pub fn is_ink_sample(&self, sample: &[u8], layout: PixelLayout) -> bool {
        match layout {
            // avg(r, g, b) < t  <=>  r + g + b < 3t, without float rounding
            PixelLayout::Rgba => {
                let sum: u32 = sample[..3].iter().map(|&c| u32::from(c)).sum();
                sum < 3 * u32::from(self.threshold)
            }
            PixelLayout::Luma => sample[0] < self.threshold,
        }
    }

    fn classify_with(
        &self,
        pixels: &[u8],
        layout: PixelLayout,
        width: u32,
        height: u32,
    ) -> Result<InkMask> {
        let expected = width as usize * height as usize * layout.channels();
        if pixels.len() != expected {
            return Err(GlyphError::InputShape {
                expected,
                actual: pixels.len(),
                width,
                height,
            });
        }

        let cells = pixels
            .chunks_exact(layout.channels())
            .map(|sample| self.is_ink_sample(sample, layout))
            .collect();
        InkMask::new(width, height, cells)
    }

    pub fn classify_rgba_image(&self, image: &RgbaImage) -> Result<InkMask> {
        self.classify_with(image.as_raw(), PixelLayout::Rgba, image.width(), image.height())
    }

    pub fn classify_gray_image(&self, image: &GrayImage) -> Result<InkMask> {
        self.classify_with(image.as_raw(), PixelLayout::Luma, image.width(), image.height())
    }
}

impl MaskClassifier for LuminanceClassifier {
    fn classify(&self, pixels: &[u8], width: u32, height: u32) -> Result<InkMask> {
        self.classify_with(pixels, self.layout, width, height)
    }

    fn classify_rgba(&self, image: &RgbaImage) -> Result<InkMask> {
        self.classify_rgba_image(image)
    }
}
