use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    algorithms::{PixelLayout, SimplificationMethod, TracerKind},
    error::{GlyphError, Result},
    mapping::WindingPolicy,
};

/// Tunables for the raster-to-vector pipeline.
///
/// Every field has a default, so a partial TOML/JSON table is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PipelineConfig {
    /// Average channel intensity below which a pixel counts as ink (0-255)
    pub ink_threshold: u8,
    pub pixel_layout: PixelLayout,
    /// Side of the square drawing canvas in pixels
    #[schemars(range(min = 1))]
    pub canvas_size: u32,
    #[schemars(range(min = 1))]
    pub units_per_em: u32,
    /// Baseline position as a fraction of canvas height, measured from the top
    #[schemars(range(min = 0.0, max = 1.0))]
    pub baseline_fraction: f64,
    /// Maximum deviation in pixels for simplification; 0 disables it
    #[schemars(range(min = 0.0))]
    pub tolerance: f64,
    pub simplification: SimplificationMethod,
    pub tracer: TracerKind,
    pub winding: WindingPolicy,
    /// Right-hand spacing in pixels added after the last ink column
    pub right_margin: u32,
    /// Advance width floor in font units
    pub min_advance: u32,
    pub notdef_advance_fraction: f64,
    pub space_advance_fraction: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ink_threshold: 160,
            pixel_layout: PixelLayout::Rgba,
            canvas_size: 300,
            units_per_em: 1000,
            baseline_fraction: 0.8,
            tolerance: 2.0,
            simplification: SimplificationMethod::DouglasPeucker,
            tracer: TracerKind::Moore,
            winding: WindingPolicy::Preserve,
            right_margin: 20,
            min_advance: 100,
            notdef_advance_fraction: 0.5,
            space_advance_fraction: 0.35,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.canvas_size == 0 {
            return Err(GlyphError::InvalidConfig("canvas_size must be positive".into()));
        }
        if self.units_per_em == 0 {
            return Err(GlyphError::InvalidConfig("units_per_em must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.baseline_fraction) {
            return Err(GlyphError::InvalidConfig(format!(
                "baseline_fraction {} is outside [0, 1]",
                self.baseline_fraction
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(GlyphError::InvalidConfig(format!(
                "tolerance {} must be a finite non-negative number",
                self.tolerance
            )));
        }
        for (name, fraction) in [
            ("notdef_advance_fraction", self.notdef_advance_fraction),
            ("space_advance_fraction", self.space_advance_fraction),
        ] {
            if !fraction.is_finite() || fraction < 0.0 {
                return Err(GlyphError::InvalidConfig(format!(
                    "{name} {fraction} must be a finite non-negative number"
                )));
            }
        }
        Ok(())
    }

    /// Pixel-to-font-unit scale factor
    pub fn scale(&self) -> f64 {
        f64::from(self.units_per_em) / f64::from(self.canvas_size)
    }
}

/// Family name used when none, or only whitespace, is given
pub const DEFAULT_FAMILY_NAME: &str = "Handscript";

/// Font-level metadata handed to the assembler alongside the glyphs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FontMetadata {
    pub family_name: String,
    pub style_name: String,
    pub units_per_em: u32,
    pub ascender: i32,
    pub descender: i32,
}

impl Default for FontMetadata {
    fn default() -> Self {
        Self::for_em(1000)
    }
}

impl FontMetadata {
    /// Default metadata with ascender at 80% and descender at -20% of the em
    pub fn for_em(units_per_em: u32) -> Self {
        let em = f64::from(units_per_em);
        Self {
            family_name: DEFAULT_FAMILY_NAME.to_string(),
            style_name: "Regular".to_string(),
            units_per_em,
            ascender: (em * 0.8).round() as i32,
            descender: (-em * 0.2).round() as i32,
        }
    }

    /// Set the family name, trimmed; a blank name keeps the default
    pub fn with_family_name(mut self, family_name: impl AsRef<str>) -> Self {
        let trimmed = family_name.as_ref().trim();
        self.family_name = if trimmed.is_empty() {
            DEFAULT_FAMILY_NAME.to_string()
        } else {
            trimmed.to_string()
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_drawing_canvas() {
        let config = PipelineConfig::default();
        assert_eq!(config.ink_threshold, 160);
        assert_eq!(config.canvas_size, 300);
        assert!((config.scale() - 1000.0 / 300.0).abs() < 1e-9);
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = PipelineConfig { baseline_fraction: 1.5, ..Default::default() };
        assert!(matches!(config.validate(), Err(GlyphError::InvalidConfig(_))));

        let config = PipelineConfig { tolerance: -1.0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = PipelineConfig { canvas_size: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{ "tolerance": 1.5 }"#)
            .expect("partial config should parse");
        assert_eq!(config.tolerance, 1.5);
        assert_eq!(config.units_per_em, 1000);
    }

    #[test]
    fn test_font_metadata_defaults() {
        let metadata = FontMetadata::default();
        assert_eq!(metadata.family_name, "Handscript");
        assert_eq!(metadata.style_name, "Regular");
        assert_eq!(metadata.ascender, 800);
        assert_eq!(metadata.descender, -200);
        assert_eq!(FontMetadata::for_em(2048).ascender, 1638);
    }

    #[test]
    fn test_family_name_is_trimmed_with_fallback() {
        let metadata = FontMetadata::default().with_family_name("  My Hand \n");
        assert_eq!(metadata.family_name, "My Hand");

        for blank in ["", "   ", "\t\n"] {
            let metadata = FontMetadata::default().with_family_name(blank);
            assert_eq!(metadata.family_name, DEFAULT_FAMILY_NAME);
        }
    }
}
