use std::sync::Arc;

use glyph::{
    algorithms::{SimplificationMethod, TracerKind},
    manager::GlyphCommand,
    mapping::WindingPolicy,
    FontMetadata, GlyphPipeline, GlyphRecordAssembler, GlyphSet, JsonFontAssembler,
};
use image::{Rgba, RgbaImage};
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

const PAPER: Rgba<u8> = Rgba([250, 248, 244, 255]);
const INK: Rgba<u8> = Rgba([26, 24, 22, 255]);

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish()
        .init();

    println!("✍️  Handwritten Glyph Vectorization Demo");
    println!("========================================");

    let glyphs = Arc::new(create_demo_glyphs());

    demo_commands()?;
    demo_simplification(&glyphs)?;
    demo_winding(&glyphs)?;
    demo_font_build(Arc::clone(&glyphs)).await?;

    println!("✅ All demos completed successfully!");
    println!("📁 Generated files: demo_*.geojson, demo_font.json");

    Ok(())
}

fn canvas(ink: impl Fn(f64, f64) -> bool) -> RgbaImage {
    RgbaImage::from_fn(300, 300, |x, y| {
        if ink(f64::from(x), f64::from(y)) { INK } else { PAPER }
    })
}

/// A ring, a bar and a dot: one glyph with a counter, one tall stroke, one tiny mark
fn create_demo_glyphs() -> GlyphSet {
    let mut glyphs = GlyphSet::new();
    glyphs.insert(
        'O',
        canvas(|x, y| {
            let r = (x - 150.0).hypot((y - 150.0) * 0.8);
            (50.0..80.0).contains(&r)
        }),
    );
    glyphs.insert('l', canvas(|x, y| (140.0..158.0).contains(&x) && (40.0..240.0).contains(&y)));
    glyphs.insert('.', canvas(|x, y| (x - 150.0).hypot(y - 232.0) < 8.0));
    glyphs
}

fn demo_commands() -> color_eyre::Result<()> {
    println!("\n🔧 Demo: GlyphCommand with schemars & strum");
    println!("-------------------------------------------");

    for (i, name) in GlyphCommand::command_names().iter().enumerate() {
        println!("   {}. {}", i + 1, name);
    }

    let command = GlyphCommand::VectorizeGlyphWithTolerance { character: 'O', tolerance: 1.5 };
    let json = serde_json::to_string_pretty(&command)?;
    let parsed: GlyphCommand = serde_json::from_str(&json)?;
    println!("   Command: {}", command);
    println!("   Description: {}", command.description());
    println!("   JSON: {}", json);
    println!("   Parsed back: {}", parsed);
    Ok(())
}

fn demo_simplification(glyphs: &GlyphSet) -> color_eyre::Result<()> {
    println!("\n🔬 Demo 1: Simplification");
    println!("-------------------------");

    let Some(ring) = glyphs.get('O') else {
        return Ok(());
    };

    let raw = GlyphPipeline::builder().with_tolerance(0.0).build()?.process_image(ring)?;
    let original_points = raw.outline.point_count();
    println!("   📊 Traced points: {}", original_points);

    for (label, method, tolerance) in [
        ("Douglas-Peucker (ε=1.0)", SimplificationMethod::DouglasPeucker, 1.0),
        ("Douglas-Peucker (ε=2.0)", SimplificationMethod::DouglasPeucker, 2.0),
        ("Visvalingam-Whyatt (area=2.0)", SimplificationMethod::VisvalingamWhyatt, 2.0),
    ] {
        let glyph = GlyphPipeline::builder()
            .with_simplification_method(method)
            .with_tolerance(tolerance)
            .build()?
            .process_image(ring)?;
        let points = glyph.outline.point_count();
        println!(
            "   🔹 {}: {} points ({:.1}% reduction)",
            label,
            points,
            100.0 * (original_points - points) as f64 / original_points.max(1) as f64
        );
    }
    Ok(())
}

fn demo_winding(glyphs: &GlyphSet) -> color_eyre::Result<()> {
    println!("\n🍩 Demo 2: Counters and winding");
    println!("-------------------------------");

    let Some(ring) = glyphs.get('O') else {
        return Ok(());
    };

    for (label, tracer, winding) in [
        ("Moore, preserve", TracerKind::Moore, WindingPolicy::Preserve),
        ("Border following, TrueType", TracerKind::BorderFollowing, WindingPolicy::TrueType),
    ] {
        let pipeline = GlyphPipeline::builder()
            .with_tracer_kind(tracer)
            .with_winding(winding)
            .build()?;
        let glyph = pipeline.process_image(ring)?;
        println!("   🔹 {}: {} paths", label, glyph.outline.paths.len());
        for path in &glyph.outline.paths {
            println!("      {} {} ({} points)", path.role, path.orientation(), path.points.len());
        }
    }
    Ok(())
}

async fn demo_font_build(glyphs: Arc<GlyphSet>) -> color_eyre::Result<()> {
    println!("\n🔤 Demo 3: Font build");
    println!("---------------------");

    let assembler = GlyphRecordAssembler::new(GlyphPipeline::builder().build()?);
    let records = assembler.assemble_concurrently(glyphs).await?;

    for record in &records {
        println!(
            "   {:>8}  advance {:>4}  paths {}",
            record.name,
            record.metrics.advance_width,
            record.outline.paths.len()
        );
        if !record.outline.is_empty() {
            record.save_geojson(format!("demo_{}.geojson", record.name))?;
        }
    }

    let build = assembler.font_build(records, FontMetadata::default())?;
    let bytes = glyph::assembly::assemble_font(&build, &JsonFontAssembler::new())?;
    std::fs::write("demo_font.json", &bytes)?;
    println!("   💾 demo_font.json ({} bytes)", bytes.len());
    Ok(())
}
