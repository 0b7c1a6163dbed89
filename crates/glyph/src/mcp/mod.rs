use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rmcp::{
    handler::server::tool::IntoCallToolResult,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, Error as McpError, ServerHandler,
};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use ts_rs::TS;

use crate::{
    error::GlyphError,
    manager::{CommandOutput, GlyphCommand, GlyphManager},
    types::GlyphRecord,
};

/// Request for loading a glyph image from a file path
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LoadGlyphRequest {
    #[schemars(description = "The character this drawing represents", length(min = 1, max = 1))]
    pub character: String,
    #[schemars(description = "Path to the canvas image file")]
    pub path: String,
}

/// Request for loading a glyph image from base64 PNG data
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LoadGlyphBase64Request {
    #[schemars(description = "The character this drawing represents", length(min = 1, max = 1))]
    pub character: String,
    #[schemars(description = "Base64 encoded PNG, optionally as a data: URL")]
    pub data: String,
}

/// Request for vectorizing one loaded glyph
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct VectorizeRequest {
    #[schemars(description = "Character whose glyph to vectorize", length(min = 1, max = 1))]
    pub character: String,
    #[schemars(
        description = "Simplification tolerance in pixels; defaults to the pipeline setting",
        range(min = 0.0, max = 20.0)
    )]
    pub tolerance: Option<f64>,
}

/// Request for building the font
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BuildFontRequest {
    #[schemars(description = "Font family name; blank uses Handscript", length(max = 63))]
    pub family_name: String,
}

/// Response containing one vectorized glyph
#[derive(Debug, Serialize, schemars::JsonSchema, TS)]
#[ts(export)]
pub struct GlyphResponse {
    #[schemars(description = "Canonical glyph name")]
    pub glyph_name: String,
    #[schemars(description = "Horizontal advance in font units")]
    pub advance_width: u32,
    #[schemars(description = "Number of closed outline paths")]
    pub path_count: usize,
    #[schemars(description = "Total vertices across all paths")]
    pub point_count: usize,
    #[schemars(description = "GeoJSON representation of the outline in font units")]
    pub geojson: serde_json::Value,
}

impl GlyphResponse {
    fn from_record(record: &GlyphRecord) -> Self {
        let geojson = serde_json::to_value(record.to_typed_geojson())
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }));
        Self {
            glyph_name: record.name.clone(),
            advance_width: record.metrics.advance_width,
            path_count: record.outline.paths.len(),
            point_count: record.outline.point_count(),
            geojson,
        }
    }

    fn error(message: String) -> Self {
        Self {
            glyph_name: String::new(),
            advance_width: 0,
            path_count: 0,
            point_count: 0,
            geojson: serde_json::json!({ "error": message }),
        }
    }
}

impl IntoCallToolResult for GlyphResponse {
    fn into_call_tool_result(self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&self).unwrap_or_else(|_| format!("{:?}", self)),
        )]))
    }
}

fn parse_character(text: &str) -> Result<char, String> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(character), None) => Ok(character),
        _ => Err(format!("Expected exactly one character, got {text:?}")),
    }
}

/// Strips a `data:image/png;base64,` style prefix before decoding
fn decode_base64_image(data: &str) -> Result<Vec<u8>, GlyphError> {
    let payload = match data.split_once(',') {
        Some((header, payload)) if header.starts_with("data:") => payload,
        _ => data,
    };
    STANDARD
        .decode(payload.trim())
        .map_err(|e| GlyphError::Decode(e.to_string()))
}

fn to_pretty_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Failed to serialize result: {}", e))
}

/// MCP Server for handwritten glyph vectorization
#[derive(Clone)]
pub struct GlyphMcpServer {
    manager: Arc<RwLock<GlyphManager>>,
}

impl GlyphMcpServer {
    pub fn new() -> Self {
        Self::with_manager(GlyphManager::new())
    }

    pub fn with_manager(manager: GlyphManager) -> Self {
        Self {
            manager: Arc::new(RwLock::new(manager)),
        }
    }

    // A panicking tool call must not take the session's glyphs with it
    fn read_manager(&self) -> RwLockReadGuard<'_, GlyphManager> {
        self.manager.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_manager(&self) -> RwLockWriteGuard<'_, GlyphManager> {
        self.manager.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for GlyphMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool(tool_box)]
impl GlyphMcpServer {
    #[tool(description = "Load a glyph canvas image from a file path for one character")]
    fn load_glyph_image(
        &self,
        #[tool(aggr)] LoadGlyphRequest { character, path }: LoadGlyphRequest,
    ) -> String {
        let character = match parse_character(&character) {
            Ok(character) => character,
            Err(e) => return e,
        };
        match self.write_manager().load_image(character, &path) {
            Ok(()) => format!("Loaded glyph {:?} from {}", character, path),
            Err(e) => format!("Failed to load glyph {:?} from {}: {}", character, path, e),
        }
    }

    #[tool(description = "Load a glyph canvas image from base64 PNG data for one character")]
    fn load_glyph_base64(
        &self,
        #[tool(aggr)] LoadGlyphBase64Request { character, data }: LoadGlyphBase64Request,
    ) -> String {
        let character = match parse_character(&character) {
            Ok(character) => character,
            Err(e) => return e,
        };
        let loaded = decode_base64_image(&data)
            .and_then(|bytes| self.write_manager().load_image_from_bytes(character, &bytes));
        match loaded {
            Ok(()) => format!("Loaded glyph {:?} from base64 data", character),
            Err(e) => format!("Failed to load glyph {:?}: {}", character, e),
        }
    }

    #[tool(description = "Vectorize a loaded glyph into font-unit outline paths and advance width")]
    fn vectorize_glyph(
        &self,
        #[tool(aggr)] VectorizeRequest { character, tolerance }: VectorizeRequest,
    ) -> GlyphResponse {
        let character = match parse_character(&character) {
            Ok(character) => character,
            Err(e) => return GlyphResponse::error(e),
        };
        let command = match tolerance {
            Some(tolerance) => GlyphCommand::VectorizeGlyphWithTolerance { character, tolerance },
            None => GlyphCommand::VectorizeGlyph { character },
        };

        match self.read_manager().execute(command) {
            Ok(CommandOutput::Glyph(record)) => GlyphResponse::from_record(&record),
            Ok(_) => GlyphResponse::error("Unexpected command output".to_string()),
            Err(e) => GlyphResponse::error(format!("Vectorization failed: {}", e)),
        }
    }

    #[tool(description = "Build font JSON from .notdef, space and every loaded glyph")]
    fn build_font(
        &self,
        #[tool(aggr)] BuildFontRequest { family_name }: BuildFontRequest,
    ) -> String {
        match self.read_manager().execute(GlyphCommand::BuildFont { family_name }) {
            Ok(output) => to_pretty_json(&output),
            Err(e) => format!("Font build failed: {}", e),
        }
    }

    #[tool(description = "Report which supported characters have been loaded and which are missing")]
    fn coverage(&self) -> String {
        match self.read_manager().execute(GlyphCommand::Coverage) {
            Ok(output) => to_pretty_json(&output),
            Err(e) => format!("Coverage failed: {}", e),
        }
    }

    #[tool(description = "Get information about available commands and their parameters")]
    fn get_command_info(&self) -> String {
        let mut info = String::new();
        info.push_str("Available GlyphCommands:\n\n");

        for (i, name) in GlyphCommand::command_names().iter().enumerate() {
            info.push_str(&format!("{}. {}\n", i + 1, name));
        }

        info.push_str("\nCommand Details:\n");
        for cmd in GlyphCommand::iter() {
            info.push_str(&format!("\n- {}\n", cmd));
            info.push_str(&format!("  Description: {}\n", cmd.description()));

            let params = cmd.parameters_info();
            if !params.is_empty() {
                info.push_str("  Parameters:\n");
                for (name, desc, required) in params {
                    let req_marker = if required { " (required)" } else { " (optional)" };
                    info.push_str(&format!("    - {}{}: {}\n", name, req_marker, desc));
                }
            }
        }

        info
    }

    #[tool(description = "Get the JSON schema for GlyphCommand")]
    fn get_command_schema(&self) -> String {
        to_pretty_json(&GlyphCommand::schema())
    }
}

#[tool(tool_box)]
impl ServerHandler for GlyphMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Handwritten Glyph Vectorization Server - Load canvas drawings per character, trace them into font-unit outlines with advance widths, and assemble font JSON for an external font compiler.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
