use image::RgbaImage;

use crate::{
    error::Result,
    types::{Contour, FontBuild, InkMask, SimplifiedContour},
};

/// Trait for turning raw pixel samples into an ink mask
pub trait MaskClassifier: Send + Sync {
    /// Classify a row-major pixel buffer of the given dimensions
    fn classify(&self, pixels: &[u8], width: u32, height: u32) -> Result<InkMask>;

    /// Classify a decoded RGBA image
    fn classify_rgba(&self, image: &RgbaImage) -> Result<InkMask> {
        self.classify(image.as_raw(), image.width(), image.height())
    }
}

/// Trait for boundary tracing algorithms
pub trait ContourTracer: Send + Sync {
    /// Trace every boundary region of the mask into pixel-space contours
    fn trace(&self, mask: &InkMask) -> Vec<Contour>;
}

/// Trait for polyline simplification algorithms
pub trait ContourSimplifier: Send + Sync {
    /// Reduce the contour's vertex count, keeping its first and last point
    fn simplify(&self, contour: &Contour) -> SimplifiedContour;
}

/// Error type returned by font assemblers
pub type AssemblyFailure = Box<dyn std::error::Error + Send + Sync>;

/// Trait for the external font-assembly collaborator.
///
/// Implementations own table layout and binary encoding; they receive a
/// finished [`FontBuild`] and return the serialized font.
pub trait FontAssembler: Send + Sync {
    fn assemble(&self, build: &FontBuild) -> std::result::Result<Vec<u8>, AssemblyFailure>;
}
