use clap::{Parser, Subcommand};
use cli::{project_dir, FontProject};
use color_eyre::eyre::{eyre, Result};
use glyph::{
    assemble_font, coverage, GlyphPipeline, GlyphRecordAssembler, GlyphSet, JsonFontAssembler,
    PipelineConfig,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Vectorize every glyph of a project and write the font JSON
    Build {
        /// Path to the project file (.toml or .json)
        #[arg(short, long)]
        project: PathBuf,
    },
    /// Vectorize one canvas image and print its GeoJSON
    Vectorize {
        /// Path to the canvas image
        #[arg(short, long)]
        input: PathBuf,
        /// Character the drawing represents
        #[arg(short, long)]
        character: char,
        /// Simplification tolerance in pixels
        #[arg(short, long)]
        tolerance: Option<f64>,
    },
    /// Show which supported characters a project has drawn
    Coverage {
        /// Path to the project file (.toml or .json)
        #[arg(short, long)]
        project: PathBuf,
    },
    /// Write a skeleton project file listing every supported character
    Init {
        /// Path of the project file to create (.toml or .json)
        #[arg(short, long)]
        output: PathBuf,
        /// Font family name
        #[arg(long, default_value = "Handscript")]
        family_name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Build { project } => {
            build_font(project).await?;
        }
        Commands::Vectorize { input, character, tolerance } => {
            vectorize(input, *character, *tolerance)?;
        }
        Commands::Coverage { project } => {
            show_coverage(project)?;
        }
        Commands::Init { output, family_name } => {
            init_project(output, family_name)?;
        }
    }

    Ok(())
}

async fn build_font(project_path: &Path) -> Result<()> {
    let project = FontProject::from_file(project_path)?;
    let base_dir = project_dir(project_path);
    info!("Building '{}' from {} glyphs", project.family_name, project.glyphs.len());

    let glyphs = Arc::new(project.load_glyphs(&base_dir)?);
    let assembler = GlyphRecordAssembler::from_config(&project.pipeline)?;
    info!("{}", assembler.pipeline().info());

    let records = assembler.assemble_concurrently(glyphs).await?;

    if let Some(geojson_dir) = project.geojson_dir(&base_dir) {
        std::fs::create_dir_all(&geojson_dir)?;
        for record in records.iter().filter(|r| r.codepoint.is_some() && !r.outline.is_empty()) {
            let path = geojson_dir.join(format!("{}.geojson", record.name));
            record.save_geojson(&path)?;
        }
        info!("📁 GeoJSON previews written to {:?}", geojson_dir);
    }

    for record in records
        .iter()
        .filter(|r| r.codepoint.is_some_and(|c| c != ' ') && r.outline.is_empty())
    {
        warn!("Glyph '{}' has no ink and will be blank", record.name);
    }

    let build = assembler.font_build(records, project.metadata())?;
    let bytes = assemble_font(&build, &JsonFontAssembler::new())?;

    let output = project.output_path(&base_dir);
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, &bytes)?;

    info!("✅ Font JSON with {} glyphs saved to {:?}", build.glyphs.len(), output);
    Ok(())
}

fn vectorize(input: &Path, character: char, tolerance: Option<f64>) -> Result<()> {
    let mut config = PipelineConfig::default();
    if let Some(tolerance) = tolerance {
        config.tolerance = tolerance;
    }

    let mut glyphs = GlyphSet::new();
    glyphs.load_image(character, input)?;
    let image = glyphs
        .get(character)
        .ok_or_else(|| eyre!("glyph {character:?} was not loaded"))?;

    let assembler = GlyphRecordAssembler::new(GlyphPipeline::from_config(&config)?);
    let record = assembler.glyph_record(character, image)?;
    info!(
        "'{}': {} paths, {} points, advance {}",
        record.name,
        record.outline.paths.len(),
        record.outline.point_count(),
        record.metrics.advance_width
    );

    println!("{}", record.to_geojson_string()?);
    Ok(())
}

fn show_coverage(project_path: &Path) -> Result<()> {
    let project = FontProject::from_file(project_path)?;
    let base_dir = project_dir(project_path);
    let glyphs = project.available(&base_dir).load_glyphs(&base_dir)?;
    let report = coverage(&glyphs);

    println!(
        "{}/{} supported characters drawn ({:.0}%)",
        report.saved.len(),
        report.total(),
        report.fraction() * 100.0
    );
    if !report.missing.is_empty() {
        println!("Missing: {}", report.missing.iter().collect::<String>());
    }
    if !report.extra.is_empty() {
        println!("Extra: {}", report.extra.iter().collect::<String>());
    }
    Ok(())
}

fn init_project(output: &Path, family_name: &str) -> Result<()> {
    if output.exists() {
        return Err(eyre!("{:?} already exists", output));
    }
    let project = FontProject::skeleton(family_name);
    project.to_file(output)?;
    info!("📄 Skeleton project with {} glyph slots saved to {:?}", project.glyphs.len(), output);
    Ok(())
}
