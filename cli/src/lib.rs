use glyph::{naming::glyph_name, FontMetadata, GlyphError, GlyphSet, PipelineConfig, SUPPORTED_CHARACTERS};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    GlyphError(#[from] GlyphError),
    #[error("Character {0:?} is listed more than once")]
    DuplicateCharacter(char),
    #[error("Failed to load glyph {character:?} from {path}: {source}")]
    GlyphImage {
        character: char,
        path: String,
        #[source]
        source: GlyphError,
    },
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// One drawn character and the image file holding its canvas
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct GlyphEntry {
    pub character: char,
    pub path: String,
}

/// A handwriting font project: metadata, pipeline settings and drawings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FontProject {
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_name: Option<String>,
    /// Where the assembled font JSON is written
    pub output: String,
    /// Directory for per-glyph GeoJSON previews
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geojson_dir: Option<String>,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub glyphs: Vec<GlyphEntry>,
}

impl FontProject {
    /// Skeleton listing every supported character under `glyphs/`
    pub fn skeleton(family_name: &str) -> Self {
        let family_name = FontMetadata::default().with_family_name(family_name).family_name;
        let glyphs = SUPPORTED_CHARACTERS
            .chars()
            .map(|character| GlyphEntry {
                character,
                path: format!("glyphs/{}.png", glyph_name(character)),
            })
            .collect();

        Self {
            output: format!("{}.json", family_name.replace(' ', "")),
            family_name,
            style_name: None,
            geojson_dir: None,
            pipeline: PipelineConfig::default(),
            glyphs,
        }
    }

    pub fn metadata(&self) -> FontMetadata {
        let mut metadata =
            FontMetadata::for_em(self.pipeline.units_per_em).with_family_name(&self.family_name);
        if let Some(style_name) = &self.style_name {
            metadata.style_name = style_name.clone();
        }
        metadata
    }

    pub fn validate(&self) -> Result<(), ProjectError> {
        self.pipeline.validate()?;
        let mut seen = HashSet::new();
        for entry in &self.glyphs {
            if !seen.insert(entry.character) {
                return Err(ProjectError::DuplicateCharacter(entry.character));
            }
        }
        Ok(())
    }

    /// Decode every listed image; relative paths resolve against `base_dir`
    pub fn load_glyphs(&self, base_dir: &Path) -> Result<GlyphSet, ProjectError> {
        self.validate()?;
        let mut glyphs = GlyphSet::new();
        for entry in &self.glyphs {
            let path = resolve(base_dir, &entry.path);
            glyphs
                .load_image(entry.character, &path)
                .map_err(|source| ProjectError::GlyphImage {
                    character: entry.character,
                    path: path.display().to_string(),
                    source,
                })?;
        }
        Ok(glyphs)
    }

    /// Copy of the project keeping only glyphs whose image file exists
    pub fn available(&self, base_dir: &Path) -> Self {
        let mut project = self.clone();
        project
            .glyphs
            .retain(|entry| resolve(base_dir, &entry.path).is_file());
        project
    }

    pub fn output_path(&self, base_dir: &Path) -> PathBuf {
        resolve(base_dir, &self.output)
    }

    pub fn geojson_dir(&self, base_dir: &Path) -> Option<PathBuf> {
        self.geojson_dir.as_deref().map(|dir| resolve(base_dir, dir))
    }

    /// Load FontProject configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ProjectError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ProjectError> {
        Ok(toml::from_str(content)?)
    }

    /// Load FontProject configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ProjectError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ProjectError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProjectError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(ProjectError::UnsupportedFileFormat),
        }
    }

    /// Auto-detect file format and save configuration
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ProjectError> {
        let path_ref = path.as_ref();
        let content = match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => self.to_toml()?,
            Some("json") => self.to_json()?,
            _ => return Err(ProjectError::UnsupportedFileFormat),
        };
        fs::write(path_ref, content)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ProjectError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }
}

fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Directory that relative paths in a project file resolve against
pub fn project_dir(project_path: &Path) -> PathBuf {
    project_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyph::algorithms::SimplificationMethod;

    const PROJECT_TOML: &str = r#"
family_name = "My Hand"
output = "out/MyHand.json"
geojson_dir = "out/geojson"

[pipeline]
tolerance = 1.5
simplification = "visvalingam_whyatt"

[[glyphs]]
character = "A"
path = "A.png"

[[glyphs]]
character = "."
path = "/abs/period.png"
"#;

    #[test]
    fn test_parse_toml_project() {
        let project = FontProject::from_toml(PROJECT_TOML).expect("parse");
        assert_eq!(project.family_name, "My Hand");
        assert_eq!(project.style_name, None);
        assert_eq!(project.pipeline.tolerance, 1.5);
        assert_eq!(project.pipeline.simplification, SimplificationMethod::VisvalingamWhyatt);
        assert_eq!(project.pipeline.canvas_size, 300);
        assert_eq!(project.glyphs[1].character, '.');

        let metadata = project.metadata();
        assert_eq!(metadata.family_name, "My Hand");
        assert_eq!(metadata.style_name, "Regular");
        assert_eq!(metadata.ascender, 800);
    }

    #[test]
    fn test_parse_json_project_with_defaults() {
        let project = FontProject::from_json(
            r#"{ "family_name": "Scrawl", "style_name": "Bold", "output": "scrawl.json" }"#,
        )
        .expect("parse");
        assert!(project.glyphs.is_empty());
        assert_eq!(project.pipeline, PipelineConfig::default());
        assert_eq!(project.metadata().style_name, "Bold");
    }

    #[test]
    fn test_paths_resolve_against_project_dir() {
        let project = FontProject::from_toml(PROJECT_TOML).expect("parse");
        let base = Path::new("/work/fonts");
        assert_eq!(project.output_path(base), Path::new("/work/fonts/out/MyHand.json"));
        assert_eq!(project.geojson_dir(base), Some(PathBuf::from("/work/fonts/out/geojson")));
        assert_eq!(resolve(base, "/abs/period.png"), PathBuf::from("/abs/period.png"));
        assert_eq!(project_dir(Path::new("project.toml")), PathBuf::from("."));
        assert_eq!(project_dir(Path::new("/work/fonts/project.toml")), PathBuf::from("/work/fonts"));
    }

    #[test]
    fn test_blank_family_name_uses_default() {
        let project = FontProject::from_json(r#"{ "family_name": "  ", "output": "out.json" }"#)
            .expect("parse");
        assert_eq!(project.metadata().family_name, "Handscript");
        assert_eq!(FontProject::skeleton(" ").output, "Handscript.json");
    }

    #[test]
    fn test_duplicate_characters_rejected() {
        let mut project = FontProject::skeleton("Dup");
        project.glyphs.push(GlyphEntry { character: 'A', path: "again.png".to_string() });
        assert!(matches!(project.validate(), Err(ProjectError::DuplicateCharacter('A'))));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            FontProject::from_file("project.yaml"),
            Err(ProjectError::UnsupportedFileFormat)
        ));
    }

    #[test]
    fn test_skeleton_round_trips_through_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let skeleton = FontProject::skeleton("Hand Script");
        assert_eq!(skeleton.output, "HandScript.json");
        assert_eq!(skeleton.glyphs.len(), SUPPORTED_CHARACTERS.chars().count());
        assert_eq!(skeleton.glyphs[52].path, "glyphs/uni0030.png");

        for name in ["project.toml", "project.json"] {
            let path = dir.path().join(name);
            skeleton.to_file(&path).expect("save");
            let loaded = FontProject::from_file(&path).expect("load");
            assert_eq!(loaded, skeleton);
        }
    }

    #[test]
    fn test_available_skips_undrawn_glyphs() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("glyphs")).expect("mkdir");
        std::fs::write(dir.path().join("glyphs/A.png"), b"not checked here").expect("write");

        let available = FontProject::skeleton("Partial").available(dir.path());
        assert_eq!(available.glyphs.len(), 1);
        assert_eq!(available.glyphs[0].character, 'A');
    }

    #[test]
    fn test_missing_image_names_the_glyph() {
        let dir = tempfile::tempdir().expect("tempdir");
        let project = FontProject::from_toml(PROJECT_TOML).expect("parse");
        match project.load_glyphs(dir.path()) {
            Err(ProjectError::GlyphImage { character, .. }) => assert_eq!(character, 'A'),
            other => panic!("unexpected result {other:?}"),
        }
    }
}
