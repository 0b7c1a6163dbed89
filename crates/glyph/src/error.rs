use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlyphError {
    #[error("Pixel buffer holds {actual} bytes but a {width}x{height} canvas needs {expected}")]
    InputShape {
        expected: usize,
        actual: usize,
        width: u32,
        height: u32,
    },

    #[error("Glyph is {width}x{height} but the session canvas is {expected}x{expected}")]
    CanvasMismatch { expected: u32, width: u32, height: u32 },

    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    #[error("Font assembly failed: {0}")]
    Assembly(String),

    #[error("Glyph {character:?} failed: {source}")]
    Glyph {
        character: char,
        #[source]
        source: Box<GlyphError>,
    },

    #[error("Glyph worker failed: {0}")]
    Worker(String),

    #[error("No glyph loaded for {0:?}")]
    NoGlyphLoaded(char),

    #[error("Failed to decode glyph payload: {0}")]
    Decode(String),

    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

pub type Result<T> = std::result::Result<T, GlyphError>;
