use crate::{
    algorithms::{LuminanceClassifier, SimplificationMethod, TracerKind},
    config::PipelineConfig,
    error::Result,
    mapping::WindingPolicy,
    pipeline::GlyphPipeline,
    traits::{ContourSimplifier, ContourTracer, MaskClassifier},
};

/// Builder for creating glyph pipelines with a fluent API
pub struct GlyphPipelineBuilder {
    config: PipelineConfig,
    classifier: Option<Box<dyn MaskClassifier>>,
    tracer: Option<Box<dyn ContourTracer>>,
    simplifier: Option<Box<dyn ContourSimplifier>>,
}

impl GlyphPipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            classifier: None,
            tracer: None,
            simplifier: None,
        }
    }

    /// Replace the whole configuration; stages not set explicitly follow it
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the classifier (replaces any existing one)
    pub fn set_classifier<C>(mut self, classifier: C) -> Self
    where
        C: MaskClassifier + 'static,
    {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Set the tracer (replaces any existing one)
    pub fn set_tracer<T>(mut self, tracer: T) -> Self
    where
        T: ContourTracer + 'static,
    {
        self.tracer = Some(Box::new(tracer));
        self
    }

    /// Set the simplifier (replaces any existing one)
    pub fn set_simplifier<S>(mut self, simplifier: S) -> Self
    where
        S: ContourSimplifier + 'static,
    {
        self.simplifier = Some(Box::new(simplifier));
        self
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.config.ink_threshold = threshold;
        self
    }

    /// Simplification tolerance in pixels
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    pub fn with_simplification_method(mut self, method: SimplificationMethod) -> Self {
        self.config.simplification = method;
        self
    }

    pub fn with_tracer_kind(mut self, kind: TracerKind) -> Self {
        self.config.tracer = kind;
        self
    }

    pub fn with_winding(mut self, winding: WindingPolicy) -> Self {
        self.config.winding = winding;
        self
    }

    /// Validate the configuration and build, filling unset stages from it
    pub fn build(self) -> Result<GlyphPipeline> {
        self.config.validate()?;

        let config = self.config;
        let classifier = self.classifier.unwrap_or_else(|| {
            Box::new(LuminanceClassifier::new(config.ink_threshold, config.pixel_layout))
        });
        let tracer = self.tracer.unwrap_or_else(|| config.tracer.tracer());
        let simplifier = self
            .simplifier
            .unwrap_or_else(|| config.simplification.simplifier(config.tolerance));

        Ok(GlyphPipeline::new(config, classifier, tracer, simplifier))
    }

    /// Build the default drawing-canvas pipeline
    pub fn build_default() -> Result<GlyphPipeline> {
        Self::new().build()
    }

    /// Build a pipeline that keeps every traced vertex
    pub fn build_unsimplified() -> Result<GlyphPipeline> {
        Self::new().with_tolerance(0.0).build()
    }

    /// Build a pipeline that tags holes and winds paths for TrueType
    pub fn build_with_holes(tolerance: f64) -> Result<GlyphPipeline> {
        Self::new()
            .with_tracer_kind(TracerKind::BorderFollowing)
            .with_winding(WindingPolicy::TrueType)
            .with_tolerance(tolerance)
            .build()
    }
}

impl Default for GlyphPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algorithms::{DouglasPeuckerSimplifier, MooreTracer},
        error::GlyphError,
        types::{ContourRole, InkMask},
    };

    fn ring() -> InkMask {
        InkMask::from_fn(300, 300, |x, y| {
            let inside_outer = (100..200).contains(&x) && (100..200).contains(&y);
            let inside_hole = (130..170).contains(&x) && (130..170).contains(&y);
            inside_outer && !inside_hole
        })
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let result = GlyphPipelineBuilder::new().with_tolerance(-3.0).build();
        assert!(matches!(result, Err(GlyphError::InvalidConfig(_))));
    }

    #[test]
    fn test_fluent_settings_reach_config() {
        let pipeline = GlyphPipelineBuilder::new()
            .with_threshold(100)
            .with_tolerance(1.0)
            .with_winding(WindingPolicy::TrueType)
            .build()
            .expect("valid");
        assert_eq!(pipeline.config().ink_threshold, 100);
        assert_eq!(pipeline.config().tolerance, 1.0);
        assert!(pipeline.info().contains("true_type"));
    }

    #[test]
    fn test_explicit_stages_override_config() {
        let pipeline = GlyphPipelineBuilder::new()
            .with_tracer_kind(TracerKind::BorderFollowing)
            .set_tracer(MooreTracer)
            .set_simplifier(DouglasPeuckerSimplifier { tolerance: 0.0 })
            .build()
            .expect("valid");

        // Moore tags every trace as outer; border following would report the hole
        let glyph = pipeline.process_mask(&ring()).expect("process");
        assert!(!glyph.outline.is_empty());
        assert!(glyph.outline.paths.iter().all(|p| p.role == ContourRole::Outer));
    }

    #[test]
    fn test_hole_preset_tags_holes() {
        let pipeline = GlyphPipelineBuilder::build_with_holes(1.0).expect("valid");
        let glyph = pipeline.process_mask(&ring()).expect("process");
        let roles: Vec<_> = glyph.outline.paths.iter().map(|p| p.role).collect();
        assert!(roles.contains(&ContourRole::Outer));
        assert!(roles.contains(&ContourRole::Hole));
    }

    #[test]
    fn test_unsimplified_preset_drops_three_pixel_specks() {
        let speck = [(150, 150), (150, 151), (151, 151)];
        let mask = InkMask::from_fn(300, 300, |x, y| speck.contains(&(x, y)));
        let glyph = GlyphPipelineBuilder::build_unsimplified()
            .expect("valid")
            .process_mask(&mask)
            .expect("process");
        assert_eq!(glyph.traced_contours, 0);
        assert!(glyph.outline.is_empty());
    }

    #[test]
    fn test_unsimplified_preset_keeps_more_points() {
        let mask = InkMask::from_fn(300, 300, |x, y| {
            let (dx, dy) = (f64::from(x) - 150.0, f64::from(y) - 150.0);
            dx.hypot(dy) < 40.0
        });
        let raw = GlyphPipelineBuilder::build_unsimplified()
            .expect("valid")
            .process_mask(&mask)
            .expect("process");
        let simplified = GlyphPipelineBuilder::build_default()
            .expect("valid")
            .process_mask(&mask)
            .expect("process");
        assert!(simplified.outline.point_count() < raw.outline.point_count());
    }
}
