use std::path::Path;

use image::RgbaImage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::{
    assembly::GlyphRecordAssembler,
    config::{FontMetadata, PipelineConfig},
    error::{GlyphError, Result},
    glyph_set::GlyphSet,
    io::JsonFontAssembler,
    naming::{coverage, Coverage},
    pipeline::{builder::GlyphPipelineBuilder, GlyphPipeline},
    types::GlyphRecord,
};

#[derive(
    Debug, Clone,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq
)]
#[serde(tag = "type", content = "params")]
#[strum(serialize_all = "snake_case")]
pub enum GlyphCommand {
    /// Vectorize one loaded glyph with the manager's pipeline
    #[serde(rename = "vectorize_glyph")]
    VectorizeGlyph { character: char },

    /// Vectorize one loaded glyph with a one-off simplification tolerance
    #[serde(rename = "vectorize_glyph_with_tolerance")]
    VectorizeGlyphWithTolerance {
        character: char,
        #[schemars(range(min = 0.0, max = 20.0))]
        tolerance: f64,
    },

    /// Assemble every loaded glyph into a font build
    #[serde(rename = "build_font")]
    BuildFont {
        #[schemars(length(min = 1, max = 63))]
        family_name: String,
    },

    /// Report which supported characters have been drawn
    #[serde(rename = "coverage")]
    Coverage,
}

impl GlyphCommand {
    /// Get the JSON schema for all commands
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(GlyphCommand)
    }

    /// Get a list of all available command names
    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::VectorizeGlyph { .. } => "Trace, simplify and map one glyph into font units",
            Self::VectorizeGlyphWithTolerance { .. } => {
                "Vectorize one glyph with a custom Douglas-Peucker tolerance in pixels"
            }
            Self::BuildFont { .. } => "Assemble .notdef, space and every loaded glyph into font JSON",
            Self::Coverage => "List saved and missing characters of the supported set",
        }
    }

    /// Get parameter requirements for the command
    pub fn parameters_info(&self) -> Vec<(&'static str, &'static str, bool)> {
        match self {
            Self::VectorizeGlyph { .. } => vec![("character", "Character whose glyph to vectorize", true)],
            Self::VectorizeGlyphWithTolerance { .. } => vec![
                ("character", "Character whose glyph to vectorize", true),
                ("tolerance", "Maximum deviation in pixels (0 keeps every point)", true),
            ],
            Self::BuildFont { .. } => vec![("family_name", "Font family name, up to 63 printable characters; blank uses Handscript", true)],
            Self::Coverage => vec![],
        }
    }
}

/// Result of executing a [`GlyphCommand`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CommandOutput {
    Glyph(GlyphRecord),
    Font(serde_json::Value),
    Coverage(Coverage),
}

/// Owns a session's drawn glyphs and runs commands against them
#[derive(Clone)]
pub struct GlyphManager {
    glyphs: GlyphSet,
    assembler: GlyphRecordAssembler,
}

impl GlyphManager {
    pub fn new() -> Self {
        Self::with_pipeline(GlyphPipeline::default())
    }

    pub fn with_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self::with_pipeline(GlyphPipeline::from_config(config)?))
    }

    /// Create a new GlyphManager with a custom pipeline
    pub fn with_pipeline(pipeline: GlyphPipeline) -> Self {
        Self {
            glyphs: GlyphSet::new(),
            assembler: GlyphRecordAssembler::new(pipeline),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        self.assembler.pipeline().config()
    }

    pub fn glyphs(&self) -> &GlyphSet {
        &self.glyphs
    }

    /// Load a glyph image from file
    pub fn load_image<P: AsRef<Path>>(&mut self, character: char, path: P) -> Result<()> {
        self.glyphs.load_image(character, path)
    }

    /// Load a glyph image from encoded bytes
    pub fn load_image_from_bytes(&mut self, character: char, bytes: &[u8]) -> Result<()> {
        self.glyphs.load_image_from_bytes(character, bytes)
    }

    /// Set a glyph image directly
    pub fn set_image(&mut self, character: char, image: RgbaImage) {
        self.glyphs.insert(character, image);
    }

    pub fn remove(&mut self, character: char) -> Option<RgbaImage> {
        self.glyphs.remove(character)
    }

    fn image(&self, character: char) -> Result<&RgbaImage> {
        self.glyphs
            .get(character)
            .ok_or(GlyphError::NoGlyphLoaded(character))
    }

    pub fn execute(&self, command: GlyphCommand) -> Result<CommandOutput> {
        match command {
            GlyphCommand::VectorizeGlyph { character } => {
                let record = self.assembler.glyph_record(character, self.image(character)?)?;
                Ok(CommandOutput::Glyph(record))
            }
            GlyphCommand::VectorizeGlyphWithTolerance { character, tolerance } => {
                let image = self.image(character)?;
                let pipeline = GlyphPipelineBuilder::new()
                    .with_config(self.config().clone())
                    .with_tolerance(tolerance)
                    .build()?;
                let record = GlyphRecordAssembler::new(pipeline).glyph_record(character, image)?;
                Ok(CommandOutput::Glyph(record))
            }
            GlyphCommand::BuildFont { family_name } => {
                let metadata =
                    FontMetadata::for_em(self.config().units_per_em).with_family_name(family_name);
                let bytes =
                    self.assembler
                        .build_font(&self.glyphs, metadata, &JsonFontAssembler::new())?;
                Ok(CommandOutput::Font(serde_json::from_slice(&bytes)?))
            }
            GlyphCommand::Coverage => Ok(CommandOutput::Coverage(coverage(&self.glyphs))),
        }
    }
}

impl Default for GlyphManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use strum::IntoEnumIterator;

    fn bar_canvas() -> RgbaImage {
        RgbaImage::from_fn(300, 300, |x, y| {
            if (140..160).contains(&x) && (60..240).contains(&y) {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        })
    }

    #[test]
    fn test_command_serde_shape() {
        let command = GlyphCommand::VectorizeGlyphWithTolerance { character: 'a', tolerance: 1.5 };
        let json = serde_json::to_value(&command).expect("serialize");
        assert_eq!(json["type"], "vectorize_glyph_with_tolerance");
        assert_eq!(json["params"]["character"], "a");

        let parsed: GlyphCommand =
            serde_json::from_str(r#"{ "type": "coverage" }"#).expect("unit variant");
        assert_eq!(parsed, GlyphCommand::Coverage);
    }

    #[test]
    fn test_command_names_and_descriptions() {
        assert_eq!(
            GlyphCommand::command_names(),
            ["vectorize_glyph", "vectorize_glyph_with_tolerance", "build_font", "coverage"]
        );
        for command in GlyphCommand::iter() {
            assert!(!command.description().is_empty());
        }
        let schema = serde_json::to_value(GlyphCommand::schema()).expect("schema");
        assert!(schema.to_string().contains("vectorize_glyph"));
    }

    #[test]
    fn test_missing_glyph() {
        let manager = GlyphManager::new();
        let err = manager
            .execute(GlyphCommand::VectorizeGlyph { character: 'A' })
            .unwrap_err();
        assert!(matches!(err, GlyphError::NoGlyphLoaded('A')));
    }

    #[test]
    fn test_vectorize_and_tolerance() {
        let mut manager = GlyphManager::new();
        manager.set_image('l', bar_canvas());

        let Ok(CommandOutput::Glyph(record)) =
            manager.execute(GlyphCommand::VectorizeGlyph { character: 'l' })
        else {
            panic!("expected glyph output");
        };
        assert_eq!(record.name, "l");
        assert_eq!(record.outline.paths.len(), 1);

        let Ok(CommandOutput::Glyph(raw)) = manager.execute(GlyphCommand::VectorizeGlyphWithTolerance {
            character: 'l',
            tolerance: 0.0,
        }) else {
            panic!("expected glyph output");
        };
        assert!(raw.outline.point_count() > record.outline.point_count());
    }

    #[test]
    fn test_build_font_and_coverage() {
        let mut manager = GlyphManager::new();
        manager.set_image('l', bar_canvas());

        let Ok(CommandOutput::Font(font)) = manager.execute(GlyphCommand::BuildFont {
            family_name: "Test Hand".to_string(),
        }) else {
            panic!("expected font output");
        };
        assert_eq!(font["metadata"]["family_name"], "Test Hand");
        assert_eq!(font["glyphs"].as_array().map(Vec::len), Some(3));

        let Ok(CommandOutput::Coverage(report)) = manager.execute(GlyphCommand::Coverage) else {
            panic!("expected coverage output");
        };
        assert_eq!(report.saved, vec!['l']);
    }

    #[test]
    fn test_blank_family_name_falls_back_to_default() {
        let manager = GlyphManager::new();
        for family_name in ["", "   "] {
            let Ok(CommandOutput::Font(font)) = manager.execute(GlyphCommand::BuildFont {
                family_name: family_name.to_string(),
            }) else {
                panic!("expected font output");
            };
            assert_eq!(font["metadata"]["family_name"], "Handscript");
        }
    }

    #[test]
    fn test_padded_family_name_is_trimmed() {
        let Ok(CommandOutput::Font(font)) = GlyphManager::new().execute(GlyphCommand::BuildFont {
            family_name: "  Test Hand  ".to_string(),
        }) else {
            panic!("expected font output");
        };
        assert_eq!(font["metadata"]["family_name"], "Test Hand");
    }

    #[test]
    fn test_bad_family_name_is_assembly_error() {
        let manager = GlyphManager::new();
        let err = manager
            .execute(GlyphCommand::BuildFont { family_name: "x".repeat(64) })
            .unwrap_err();
        assert!(matches!(err, GlyphError::Assembly(_)));
    }
}
