use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr, VariantNames};
use tracing::trace;

use crate::{
    config::PipelineConfig,
    types::{ContourRole, GlyphOutline, Orientation, OutlinePath, Point, SimplifiedContour},
};

/// Paths with fewer simplified points than this cannot enclose area
pub const MIN_PATH_POINTS: usize = 3;

/// How the mapper treats path direction
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, IntoStaticStr, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WindingPolicy {
    /// Keep the tracer's direction. Moore traces run clockwise on screen and
    /// the y flip preserves the picture, so they stay clockwise.
    #[default]
    Preserve,
    /// Outer paths clockwise and hole paths counter-clockwise in font space
    TrueType,
}

/// Pixel space (top-left origin, y down) to font units (baseline origin, y up)
#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    canvas_size: u32,
    units_per_em: u32,
    baseline_fraction: f64,
    winding: WindingPolicy,
}

impl CoordinateMapper {
    pub fn new(canvas_size: u32, units_per_em: u32, baseline_fraction: f64) -> Self {
        Self {
            canvas_size,
            units_per_em,
            baseline_fraction,
            winding: WindingPolicy::Preserve,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.canvas_size, config.units_per_em, config.baseline_fraction)
            .with_winding(config.winding)
    }

    pub fn with_winding(mut self, winding: WindingPolicy) -> Self {
        self.winding = winding;
        self
    }

    /// Font units per pixel
    pub fn scale(&self) -> f64 {
        f64::from(self.units_per_em) / f64::from(self.canvas_size)
    }

    /// Baseline row measured in pixels from the top of the canvas
    pub fn baseline_px(&self) -> f64 {
        self.baseline_fraction * f64::from(self.canvas_size)
    }

    pub fn map_point(&self, point: Point) -> Point {
        let scale = self.scale();
        Point::new(
            (f64::from(point.x) * scale).round() as i32,
            ((self.baseline_px() - f64::from(point.y)) * scale).round() as i32,
        )
    }

    /// Inverse of [`Self::map_point`], up to rounding
    pub fn to_pixel(&self, point: Point) -> (f64, f64) {
        let scale = self.scale();
        (
            f64::from(point.x) / scale,
            self.baseline_px() - f64::from(point.y) / scale,
        )
    }

    /// Map one simplified contour, or `None` if it is too short to enclose area
    pub fn map_contour(&self, contour: &SimplifiedContour) -> Option<OutlinePath> {
        if contour.len() < MIN_PATH_POINTS {
            trace!(points = contour.len(), "dropping contour too short to enclose area");
            return None;
        }

        let points = contour.points.iter().map(|&p| self.map_point(p)).collect();
        let mut path = OutlinePath::new(points, contour.role);

        if self.winding == WindingPolicy::TrueType {
            let wanted = match path.role {
                ContourRole::Outer => Orientation::Clockwise,
                ContourRole::Hole => Orientation::CounterClockwise,
            };
            let current = path.orientation();
            if current != Orientation::Degenerate && current != wanted {
                path.reverse();
            }
        }

        Some(path)
    }

    pub fn map_contours(&self, contours: &[SimplifiedContour]) -> GlyphOutline {
        GlyphOutline {
            paths: contours.iter().filter_map(|c| self.map_contour(c)).collect(),
        }
    }
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}
