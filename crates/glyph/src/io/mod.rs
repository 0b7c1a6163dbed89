pub mod geojson;
pub mod json;

pub use json::JsonFontAssembler;
