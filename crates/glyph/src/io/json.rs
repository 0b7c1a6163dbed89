use std::collections::HashSet;

use thiserror::Error;

use crate::{
    traits::{AssemblyFailure, FontAssembler},
    types::FontBuild,
};

/// Longest family name most font tools accept in the name table
pub const MAX_FAMILY_NAME_LEN: usize = 63;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FontJsonError {
    #[error("family name is empty")]
    EmptyFamilyName,

    #[error("family name is longer than 63 characters")]
    FamilyNameTooLong,

    #[error("family name contains non-printable character {0:?}")]
    NonPrintableFamilyName(char),

    #[error("glyph name {0:?} appears more than once")]
    DuplicateGlyphName(String),
}

/// Serializes a [`FontBuild`] as JSON for an external font compiler.
///
/// Checks the family name and glyph-name uniqueness first, so a build an
/// encoder would reject fails here with the same single error.
#[derive(Debug, Clone)]
pub struct JsonFontAssembler {
    pub pretty: bool,
}

impl JsonFontAssembler {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn validate(build: &FontBuild) -> Result<(), FontJsonError> {
        let family = build.metadata.family_name.trim();
        if family.is_empty() {
            return Err(FontJsonError::EmptyFamilyName);
        }
        if family.chars().count() > MAX_FAMILY_NAME_LEN {
            return Err(FontJsonError::FamilyNameTooLong);
        }
        if let Some(c) = family.chars().find(|c| c.is_control()) {
            return Err(FontJsonError::NonPrintableFamilyName(c));
        }

        let mut names = HashSet::new();
        for glyph in &build.glyphs {
            if !names.insert(glyph.name.as_str()) {
                return Err(FontJsonError::DuplicateGlyphName(glyph.name.clone()));
            }
        }
        Ok(())
    }
}

impl Default for JsonFontAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FontAssembler for JsonFontAssembler {
    fn assemble(&self, build: &FontBuild) -> Result<Vec<u8>, AssemblyFailure> {
        Self::validate(build)?;
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(build)?
        } else {
            serde_json::to_vec(build)?
        };
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assembly::assemble_font,
        config::FontMetadata,
        error::GlyphError,
        types::{GlyphMetrics, GlyphOutline, GlyphRecord},
    };

    fn blank(name: &str) -> GlyphRecord {
        GlyphRecord {
            codepoint: None,
            name: name.to_string(),
            outline: GlyphOutline::empty(),
            metrics: GlyphMetrics { advance_width: 500 },
        }
    }

    fn build(family: &str, glyphs: Vec<GlyphRecord>) -> FontBuild {
        FontBuild {
            metadata: FontMetadata {
                family_name: family.to_string(),
                ..FontMetadata::default()
            },
            glyphs,
        }
    }

    #[test]
    fn test_serializes_build() {
        let font = build("Handscript", vec![blank(".notdef")]);
        let bytes = JsonFontAssembler::new().assemble(&font).expect("assemble");
        let parsed: FontBuild = serde_json::from_slice(&bytes).expect("valid json");
        assert_eq!(parsed, font);
    }

    #[test]
    fn test_family_name_rules() {
        assert_eq!(
            JsonFontAssembler::validate(&build("  ", vec![])),
            Err(FontJsonError::EmptyFamilyName)
        );
        assert_eq!(
            JsonFontAssembler::validate(&build(&"x".repeat(64), vec![])),
            Err(FontJsonError::FamilyNameTooLong)
        );
        assert_eq!(
            JsonFontAssembler::validate(&build("Hand\u{7}", vec![])),
            Err(FontJsonError::NonPrintableFamilyName('\u{7}'))
        );
        assert!(JsonFontAssembler::validate(&build("Ma Écriture", vec![])).is_ok());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let font = build("Handscript", vec![blank("A"), blank("A")]);
        assert_eq!(
            JsonFontAssembler::validate(&font),
            Err(FontJsonError::DuplicateGlyphName("A".to_string()))
        );
    }

    #[test]
    fn test_failure_surfaces_as_assembly_error() {
        let err = assemble_font(&build("", vec![]), &JsonFontAssembler::new()).unwrap_err();
        match err {
            GlyphError::Assembly(message) => assert_eq!(message, "family name is empty"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
