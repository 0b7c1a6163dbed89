//! Per-glyph records and whole-font builds.
//!
//! Every build starts with `.notdef` and `space`, whatever was drawn.
//! Drawn glyphs follow in the order of the [`GlyphSet`].

use std::sync::Arc;

use image::RgbaImage;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::{
    config::{FontMetadata, PipelineConfig},
    error::{GlyphError, Result},
    glyph_set::GlyphSet,
    naming::{glyph_name, NOTDEF_NAME, SPACE_NAME},
    pipeline::GlyphPipeline,
    traits::FontAssembler,
    types::{FontBuild, GlyphMetrics, GlyphOutline, GlyphRecord},
};

/// Turns a glyph set into the ordered records a font assembler consumes
#[derive(Clone)]
pub struct GlyphRecordAssembler {
    pipeline: Arc<GlyphPipeline>,
}

impl GlyphRecordAssembler {
    pub fn new(pipeline: GlyphPipeline) -> Self {
        Self::shared(Arc::new(pipeline))
    }

    pub fn shared(pipeline: Arc<GlyphPipeline>) -> Self {
        Self { pipeline }
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self::new(GlyphPipeline::from_config(config)?))
    }

    pub fn pipeline(&self) -> &GlyphPipeline {
        &self.pipeline
    }

    fn em_fraction(&self, fraction: f64) -> u32 {
        (f64::from(self.pipeline.config().units_per_em) * fraction).round() as u32
    }

    /// Empty fallback glyph with a half-em advance and no codepoint
    pub fn notdef_record(&self) -> GlyphRecord {
        GlyphRecord {
            codepoint: None,
            name: NOTDEF_NAME.to_string(),
            outline: GlyphOutline::empty(),
            metrics: GlyphMetrics {
                advance_width: self.em_fraction(self.pipeline.config().notdef_advance_fraction),
            },
        }
    }

    pub fn space_record(&self) -> GlyphRecord {
        GlyphRecord {
            codepoint: Some(' '),
            name: SPACE_NAME.to_string(),
            outline: GlyphOutline::empty(),
            metrics: GlyphMetrics {
                advance_width: self.em_fraction(self.pipeline.config().space_advance_fraction),
            },
        }
    }

    /// Vectorize one drawn character; failures name the character
    pub fn glyph_record(&self, character: char, image: &RgbaImage) -> Result<GlyphRecord> {
        record_for(&self.pipeline, character, image)
    }

    fn fixed_records(&self) -> Vec<GlyphRecord> {
        vec![self.notdef_record(), self.space_record()]
    }

    /// Build every record on the calling thread
    pub fn assemble(&self, glyphs: &GlyphSet) -> Result<Vec<GlyphRecord>> {
        let mut records = self.fixed_records();
        records.reserve(glyphs.len());

        for (character, image) in glyphs.iter() {
            if is_space(character) {
                continue;
            }
            records.push(self.glyph_record(character, image)?);
        }

        debug!(records = records.len(), "assembled glyph records");
        Ok(records)
    }

    /// Build every record with one blocking task per glyph.
    ///
    /// Results are merged back into glyph-set order, so the output matches
    /// [`Self::assemble`] exactly.
    pub async fn assemble_concurrently(&self, glyphs: Arc<GlyphSet>) -> Result<Vec<GlyphRecord>> {
        let mut tasks = JoinSet::new();

        for index in 0..glyphs.len() {
            let pipeline = Arc::clone(&self.pipeline);
            let glyphs = Arc::clone(&glyphs);
            tasks.spawn_blocking(move || {
                let record = match glyphs.get_index(index) {
                    Some((character, image)) if !is_space(character) => {
                        Some(record_for(&pipeline, character, image))
                    }
                    _ => None,
                };
                (index, record.transpose())
            });
        }

        let mut slots: Vec<Option<GlyphRecord>> = vec![None; glyphs.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, record) = joined.map_err(|e| GlyphError::Worker(e.to_string()))?;
            slots[index] = record?;
        }

        let mut records = self.fixed_records();
        records.extend(slots.into_iter().flatten());

        debug!(records = records.len(), "assembled glyph records concurrently");
        Ok(records)
    }

    /// Pair records with font metadata, checking the em sizes agree
    pub fn font_build(&self, glyphs: Vec<GlyphRecord>, metadata: FontMetadata) -> Result<FontBuild> {
        let units_per_em = self.pipeline.config().units_per_em;
        if metadata.units_per_em != units_per_em {
            return Err(GlyphError::InvalidConfig(format!(
                "font metadata uses {} units per em but glyphs were mapped to {}",
                metadata.units_per_em, units_per_em
            )));
        }
        Ok(FontBuild { metadata, glyphs })
    }

    /// Assemble every record and hand the result to `assembler`
    pub fn build_font(
        &self,
        glyphs: &GlyphSet,
        metadata: FontMetadata,
        assembler: &dyn FontAssembler,
    ) -> Result<Vec<u8>> {
        let records = self.assemble(glyphs)?;
        let build = self.font_build(records, metadata)?;
        assemble_font(&build, assembler)
    }
}

fn is_space(character: char) -> bool {
    if character == ' ' {
        warn!("ignoring drawn space glyph, space is generated automatically");
        return true;
    }
    false
}

fn record_for(pipeline: &GlyphPipeline, character: char, image: &RgbaImage) -> Result<GlyphRecord> {
    let glyph = pipeline
        .process_image(image)
        .map_err(|source| GlyphError::Glyph {
            character,
            source: Box::new(source),
        })?;

    Ok(GlyphRecord {
        codepoint: Some(character),
        name: glyph_name(character),
        outline: glyph.outline,
        metrics: glyph.metrics,
    })
}

/// Hand a finished build to the external assembler.
///
/// Any failure it reports comes back as one [`GlyphError::Assembly`]; no
/// partial output is returned.
pub fn assemble_font(build: &FontBuild, assembler: &dyn FontAssembler) -> Result<Vec<u8>> {
    let bytes = assembler
        .assemble(build)
        .map_err(|e| GlyphError::Assembly(e.to_string()))?;

    info!(
        family = %build.metadata.family_name,
        glyphs = build.glyphs.len(),
        bytes = bytes.len(),
        "assembled font"
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::AssemblyFailure;
    use image::Rgba;

    const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn canvas(ink: impl Fn(u32, u32) -> bool) -> RgbaImage {
        RgbaImage::from_fn(300, 300, |x, y| if ink(x, y) { INK } else { PAPER })
    }

    fn assembler() -> GlyphRecordAssembler {
        GlyphRecordAssembler::from_config(&PipelineConfig::default()).expect("valid config")
    }

    fn sample_set() -> GlyphSet {
        let mut glyphs = GlyphSet::new();
        glyphs.insert('I', canvas(|x, y| (140..160).contains(&x) && (60..240).contains(&y)));
        glyphs.insert('.', canvas(|x, y| (148..152).contains(&x) && (148..152).contains(&y)));
        glyphs.insert('7', canvas(|_, _| false));
        glyphs
    }

    struct RejectingAssembler;

    impl FontAssembler for RejectingAssembler {
        fn assemble(&self, _build: &FontBuild) -> std::result::Result<Vec<u8>, AssemblyFailure> {
            Err("name table overflow".into())
        }
    }

    struct CountingAssembler;

    impl FontAssembler for CountingAssembler {
        fn assemble(&self, build: &FontBuild) -> std::result::Result<Vec<u8>, AssemblyFailure> {
            Ok(vec![build.glyphs.len() as u8])
        }
    }

    #[test]
    fn test_empty_set_yields_fixed_records() {
        let records = assembler().assemble(&GlyphSet::new()).expect("assemble");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, ".notdef");
        assert_eq!(records[0].codepoint, None);
        assert_eq!(records[0].metrics.advance_width, 500);
        assert_eq!(records[1].name, "space");
        assert_eq!(records[1].unicode(), Some(32));
        assert_eq!(records[1].metrics.advance_width, 350);
        assert!(records.iter().all(|r| r.outline.is_empty()));
    }

    #[test]
    fn test_period_blob_end_to_end() {
        let mut glyphs = GlyphSet::new();
        glyphs.insert('.', canvas(|x, y| (148..152).contains(&x) && (148..152).contains(&y)));

        let records = assembler().assemble(&glyphs).expect("assemble");
        let period = &records[2];
        assert_eq!(period.name, "period");
        assert_eq!(period.outline.paths.len(), 1);
        assert_eq!(period.metrics.advance_width, 570);
        for point in &period.outline.paths[0].points {
            assert!(point.y > 0 && point.y < 800);
        }
    }

    #[test]
    fn test_blank_glyph_is_still_a_record() {
        let records = assembler().assemble(&sample_set()).expect("assemble");
        let seven = records.iter().find(|r| r.name == "uni0037").expect("seven");
        assert!(seven.outline.is_empty());
        assert_eq!(seven.metrics.advance_width, 100);
    }

    #[test]
    fn test_drawn_space_is_ignored() {
        let mut glyphs = GlyphSet::new();
        glyphs.insert(' ', canvas(|x, _| x == 10));
        let records = assembler().assemble(&glyphs).expect("assemble");
        assert_eq!(records.len(), 2);
        assert!(records[1].outline.is_empty());
    }

    #[test]
    fn test_failure_names_the_glyph() {
        let mut glyphs = GlyphSet::new();
        glyphs.insert('Q', RgbaImage::from_pixel(64, 64, PAPER));
        let err = assembler().assemble(&glyphs).unwrap_err();
        match err {
            GlyphError::Glyph { character, source } => {
                assert_eq!(character, 'Q');
                assert!(matches!(*source, GlyphError::CanvasMismatch { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let assembler = assembler();
        let glyphs = sample_set();
        let sequential = assembler.assemble(&glyphs).expect("sequential");
        let concurrent = assembler
            .assemble_concurrently(Arc::new(glyphs))
            .await
            .expect("concurrent");
        assert_eq!(sequential, concurrent);
        let names: Vec<_> = concurrent.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, [".notdef", "space", "I", "period", "uni0037"]);
    }

    #[tokio::test]
    async fn test_concurrent_empty_set() {
        let records = assembler()
            .assemble_concurrently(Arc::new(GlyphSet::new()))
            .await
            .expect("concurrent");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_assembler_failure_is_single_error() {
        let err = assembler()
            .build_font(&sample_set(), FontMetadata::default(), &RejectingAssembler)
            .unwrap_err();
        match err {
            GlyphError::Assembly(message) => assert!(message.contains("name table overflow")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_build_font_passes_every_record() {
        let bytes = assembler()
            .build_font(&sample_set(), FontMetadata::default(), &CountingAssembler)
            .expect("build");
        assert_eq!(bytes, vec![5]);
    }

    #[test]
    fn test_em_mismatch_is_rejected() {
        let err = assembler()
            .font_build(Vec::new(), FontMetadata::for_em(2048))
            .unwrap_err();
        assert!(matches!(err, GlyphError::InvalidConfig(_)));
    }
}
