pub mod builder;

use image::RgbaImage;
use tracing::debug;

use crate::{
    algorithms::LuminanceClassifier,
    config::PipelineConfig,
    error::{GlyphError, Result},
    mapping::CoordinateMapper,
    metrics::MetricsEstimator,
    traits::{ContourSimplifier, ContourTracer, MaskClassifier},
    types::{GlyphMetrics, GlyphOutline, InkMask},
};

/// Outline and metrics for one glyph canvas
#[derive(Debug, Clone, PartialEq)]
pub struct VectorizedGlyph {
    pub outline: GlyphOutline,
    pub metrics: GlyphMetrics,
    /// Closed traces kept by the tracer
    pub traced_contours: usize,
    /// Traces dropped after simplification for enclosing no area
    pub discarded_contours: usize,
}

/// Per-glyph raster-to-vector pipeline: classify, trace, simplify, map, measure
pub struct GlyphPipeline {
    config: PipelineConfig,
    classifier: Box<dyn MaskClassifier>,
    tracer: Box<dyn ContourTracer>,
    simplifier: Box<dyn ContourSimplifier>,
    mapper: CoordinateMapper,
    metrics: MetricsEstimator,
}

impl GlyphPipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::GlyphPipelineBuilder {
        builder::GlyphPipelineBuilder::new()
    }

    /// Create a new pipeline with the given stages; mapping and metrics follow `config`
    pub fn new(
        config: PipelineConfig,
        classifier: Box<dyn MaskClassifier>,
        tracer: Box<dyn ContourTracer>,
        simplifier: Box<dyn ContourSimplifier>,
    ) -> Self {
        Self {
            mapper: CoordinateMapper::from_config(&config),
            metrics: MetricsEstimator::from_config(&config),
            config,
            classifier,
            tracer,
            simplifier,
        }
    }

    /// Build a pipeline whose every stage follows `config`
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::builder().with_config(config.clone()).build()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Classify a raw square canvas buffer into an ink mask
    pub fn classify_pixels(&self, pixels: &[u8]) -> Result<InkMask> {
        let size = self.config.canvas_size;
        self.classifier.classify(pixels, size, size)
    }

    /// Run the whole pipeline on a raw square canvas buffer
    pub fn process_pixels(&self, pixels: &[u8]) -> Result<VectorizedGlyph> {
        let mask = self.classify_pixels(pixels)?;
        self.process_mask(&mask)
    }

    /// Run the whole pipeline on a decoded RGBA canvas image
    pub fn process_image(&self, image: &RgbaImage) -> Result<VectorizedGlyph> {
        self.check_canvas(image.width(), image.height())?;
        let mask = self.classifier.classify_rgba(image)?;
        self.process_mask(&mask)
    }

    /// Trace, simplify, map and measure an already classified mask
    pub fn process_mask(&self, mask: &InkMask) -> Result<VectorizedGlyph> {
        self.check_canvas(mask.width(), mask.height())?;

        let contours = self.tracer.trace(mask);
        let simplified: Vec<_> = contours
            .iter()
            .map(|contour| self.simplifier.simplify(contour))
            .collect();

        let outline = self.mapper.map_contours(&simplified);
        let metrics = self.metrics.estimate(mask);
        let discarded_contours = simplified.len() - outline.paths.len();

        debug!(
            ink_pixels = mask.ink_count(),
            traced = contours.len(),
            paths = outline.paths.len(),
            points = outline.point_count(),
            advance_width = metrics.advance_width,
            "vectorized glyph"
        );

        Ok(VectorizedGlyph {
            outline,
            metrics,
            traced_contours: contours.len(),
            discarded_contours,
        })
    }

    fn check_canvas(&self, width: u32, height: u32) -> Result<()> {
        let expected = self.config.canvas_size;
        if width != expected || height != expected {
            return Err(GlyphError::CanvasMismatch {
                expected,
                width,
                height,
            });
        }
        Ok(())
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: {}px canvas -> {} units/em, threshold {}, {} tracer, {} simplification (tolerance {}), {} winding",
            self.config.canvas_size,
            self.config.units_per_em,
            self.config.ink_threshold,
            self.config.tracer,
            self.config.simplification,
            self.config.tolerance,
            self.config.winding,
        )
    }
}

impl Default for GlyphPipeline {
    fn default() -> Self {
        let config = PipelineConfig::default();
        let classifier = LuminanceClassifier::new(config.ink_threshold, config.pixel_layout);
        let tracer = config.tracer.tracer();
        let simplifier = config.simplification.simplifier(config.tolerance);
        Self::new(config, Box::new(classifier), tracer, simplifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;
    use image::Rgba;

    const PAPER: Rgba<u8> = Rgba([250, 248, 244, 255]);
    const INK: Rgba<u8> = Rgba([26, 24, 22, 255]);

    fn canvas_with_square(left: u32, side: u32) -> RgbaImage {
        RgbaImage::from_fn(300, 300, |x, y| {
            if (left..left + side).contains(&x) && (left..left + side).contains(&y) {
                INK
            } else {
                PAPER
            }
        })
    }

    #[test]
    fn test_blank_canvas_yields_empty_outline_and_floor() {
        let pipeline = GlyphPipeline::from_config(&PipelineConfig::default()).expect("valid config");
        let glyph = pipeline
            .process_image(&RgbaImage::from_pixel(300, 300, PAPER))
            .expect("blank canvas is not an error");
        assert!(glyph.outline.is_empty());
        assert_eq!(glyph.metrics.advance_width, 100);
        assert_eq!(glyph.traced_contours, 0);
    }

    #[test]
    fn test_small_blob_end_to_end() {
        let pipeline = GlyphPipeline::from_config(&PipelineConfig::default()).expect("valid config");
        let glyph = pipeline
            .process_image(&canvas_with_square(148, 4))
            .expect("process");

        assert_eq!(glyph.outline.paths.len(), 1);
        assert!(glyph.metrics.advance_width > 100);
        for point in &glyph.outline.paths[0].points {
            assert!(point.y > 0 && point.y < 800, "y = {} outside (0, ascender)", point.y);
        }
    }

    #[test]
    fn test_square_bounding_box_survives_round_trip() {
        let pipeline = GlyphPipeline::from_config(&PipelineConfig::default()).expect("valid config");
        let (left, side) = (120u32, 40u32);
        let glyph = pipeline
            .process_image(&canvas_with_square(left, side))
            .expect("process");

        let (min, max) = glyph.outline.bounding_box().expect("one path");
        let mapper = pipeline.mapper();
        // y flips, so the font-space minimum is the pixel-space maximum
        let (min_x, max_y) = mapper.to_pixel(min);
        let (max_x, min_y) = mapper.to_pixel(max);

        let tolerance = pipeline.config().tolerance + 1.0;
        let right = f64::from(left + side - 1);
        assert!((min_x - f64::from(left)).abs() <= tolerance);
        assert!((min_y - f64::from(left)).abs() <= tolerance);
        assert!((max_x - right).abs() <= tolerance);
        assert!((max_y - right).abs() <= tolerance);
    }

    #[test]
    fn test_raw_buffer_shape_is_checked() {
        let pipeline = GlyphPipeline::from_config(&PipelineConfig::default()).expect("valid config");
        let err = pipeline.process_pixels(&[255u8; 300 * 300 * 4 - 1]).unwrap_err();
        assert!(matches!(err, GlyphError::InputShape { .. }));
    }

    #[test]
    fn test_wrong_canvas_size_is_rejected() {
        let pipeline = GlyphPipeline::from_config(&PipelineConfig::default()).expect("valid config");
        let err = pipeline
            .process_image(&RgbaImage::from_pixel(200, 200, PAPER))
            .unwrap_err();
        assert!(matches!(err, GlyphError::CanvasMismatch { expected: 300, width: 200, .. }));
    }

    #[test]
    fn test_process_pixels_matches_process_image() {
        let pipeline = GlyphPipeline::from_config(&PipelineConfig::default()).expect("valid config");
        let image = canvas_with_square(60, 30);
        let from_image = pipeline.process_image(&image).expect("image");
        let from_pixels = pipeline.process_pixels(image.as_raw()).expect("pixels");
        assert_eq!(from_image, from_pixels);
        assert_eq!(
            from_image.outline.paths[0].points[0],
            pipeline.mapper().map_point(Point::new(60, 60))
        );
    }
}
