//! # Handwritten Glyph Vectorization Library
//!
//! Turns hand-drawn character canvases into font-ready outlines. Each glyph
//! runs through a trait-based pipeline:
//!
//! - **Classification**: pixels to a binary ink mask
//! - **Tracing**: Moore-neighbourhood boundary following (or imageproc border following)
//! - **Simplification**: Douglas-Peucker or Visvalingam-Whyatt
//! - **Mapping**: pixel space to font units, with the baseline at 80% of the canvas
//! - **Metrics**: advance width from the rightmost ink column
//!
//! A [`GlyphRecordAssembler`] then adds `.notdef` and `space`, names every
//! glyph and hands the result to a [`FontAssembler`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use glyph::{FontMetadata, GlyphPipeline, GlyphRecordAssembler, GlyphSet, JsonFontAssembler};
//!
//! let mut glyphs = GlyphSet::new();
//! glyphs.load_image('A', "drawings/A.png")?;
//!
//! let assembler = GlyphRecordAssembler::new(GlyphPipeline::builder().with_tolerance(1.5).build()?);
//! let font_json = assembler.build_font(&glyphs, FontMetadata::default(), &JsonFontAssembler::new())?;
//! std::fs::write("Handscript.json", font_json)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use glyph::{algorithms::*, mapping::WindingPolicy, GlyphPipeline};
//!
//! let pipeline = GlyphPipeline::builder()
//!     .set_classifier(LuminanceClassifier::new(128, PixelLayout::Rgba))
//!     .set_tracer(BorderFollowingTracer)
//!     .set_simplifier(VisvalingamWhyattSimplifier { tolerance: 3.0 })
//!     .with_winding(WindingPolicy::TrueType)
//!     .build()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod config;
pub mod traits;
pub mod algorithms;
pub mod mapping;
pub mod metrics;
pub mod naming;
pub mod glyph_set;
pub mod assembly;
pub mod pipeline;
pub mod io;
pub mod manager;
pub mod mcp;
pub mod typed_geojson;

// Re-exports for convenience
pub use error::{GlyphError, Result};
pub use types::{
    Contour, ContourRole, FontBuild, GlyphMetrics, GlyphOutline, GlyphRecord, InkMask, Orientation,
    OutlinePath, PathCommand, Point, SimplifiedContour,
};
pub use config::{FontMetadata, PipelineConfig};
pub use traits::*;
pub use mapping::{CoordinateMapper, WindingPolicy};
pub use metrics::MetricsEstimator;
pub use naming::{coverage, glyph_name, CharClass, Coverage, SUPPORTED_CHARACTERS};
pub use glyph_set::GlyphSet;
pub use assembly::{assemble_font, GlyphRecordAssembler};
pub use pipeline::{builder::GlyphPipelineBuilder, GlyphPipeline, VectorizedGlyph};
pub use io::JsonFontAssembler;
pub use manager::{CommandOutput, GlyphCommand, GlyphManager};
