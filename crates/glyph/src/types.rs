use geo_types::{Coord, LineString, Polygon};
use image::{GrayImage, Luma};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use ts_rs::TS;

use crate::{
    config::FontMetadata,
    error::{GlyphError, Result},
};

/// Integer 2D point, in pixels or font units depending on the stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<Point> for Coord<f64> {
    fn from(point: Point) -> Self {
        Coord {
            x: f64::from(point.x),
            y: f64::from(point.y),
        }
    }
}

/// Binary ink/background grid for one glyph canvas.
///
/// Built once from sampled colour data and immutable afterwards. Lookups
/// outside the grid read as background, so the canvas edge behaves as if
/// it were surrounded by blank paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InkMask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl InkMask {
    /// Wrap a row-major cell vector; its length must equal `width * height`
    pub fn new(width: u32, height: u32, cells: Vec<bool>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(GlyphError::InputShape {
                expected,
                actual: cells.len(),
                width,
                height,
            });
        }
        Ok(Self { width, height, cells })
    }

    /// Build a mask by evaluating `ink(x, y)` for every cell
    pub fn from_fn(width: u32, height: u32, mut ink: impl FnMut(u32, u32) -> bool) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(ink(x, y));
            }
        }
        Self { width, height, cells }
    }

    /// Build a mask from text rows where `#` marks ink.
    ///
    /// Rows shorter than the longest one are padded with background.
    pub fn from_rows(rows: &[&str]) -> Self {
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0) as u32;
        let height = rows.len() as u32;
        Self::from_fn(width, height, |x, y| {
            rows[y as usize].chars().nth(x as usize) == Some('#')
        })
    }

    /// An all-background mask
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Ink test with signed coordinates; anything off the grid is background
    pub fn is_ink(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return false;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// An ink pixel with at least one 4-connected background neighbour
    pub fn is_boundary(&self, x: u32, y: u32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        self.is_ink(x, y)
            && (!self.is_ink(x - 1, y)
                || !self.is_ink(x + 1, y)
                || !self.is_ink(x, y - 1)
                || !self.is_ink(x, y + 1))
    }

    pub fn ink_count(&self) -> usize {
        self.cells.iter().filter(|&&ink| ink).count()
    }

    pub fn has_ink(&self) -> bool {
        self.cells.iter().any(|&ink| ink)
    }

    /// Column and row span of all ink pixels, `None` for a blank mask
    pub fn ink_extent(&self) -> Option<InkExtent> {
        let mut extent: Option<InkExtent> = None;
        for (index, _) in self.cells.iter().enumerate().filter(|(_, ink)| **ink) {
            let x = (index % self.width as usize) as u32;
            let y = (index / self.width as usize) as u32;
            extent = Some(match extent {
                None => InkExtent {
                    min_column: x,
                    max_column: x,
                    min_row: y,
                    max_row: y,
                },
                Some(e) => InkExtent {
                    min_column: e.min_column.min(x),
                    max_column: e.max_column.max(x),
                    min_row: e.min_row.min(y),
                    max_row: e.max_row.max(y),
                },
            });
        }
        extent
    }

    /// Render as a grayscale image with ink as white (255) foreground
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            if self.is_ink(i64::from(x), i64::from(y)) {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }
}

/// Inclusive pixel bounds of the ink in a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InkExtent {
    pub min_column: u32,
    pub max_column: u32,
    pub min_row: u32,
    pub max_row: u32,
}

/// Whether a boundary encloses ink or background
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default,
    Serialize, Deserialize, JsonSchema, TS,
    Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContourRole {
    #[default]
    Outer,
    Hole,
}

/// Ordered pixel-space boundary produced by a tracer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Point>,
    pub role: ContourRole,
}

impl Contour {
    pub fn new(points: Vec<Point>, role: ContourRole) -> Self {
        Self { points, role }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First and last coordinates coincide
    pub fn is_closed(&self) -> bool {
        self.points.len() >= 2 && self.points.first() == self.points.last()
    }
}

/// Subset of a contour's points that stays within the simplification tolerance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedContour {
    pub points: Vec<Point>,
    pub role: ContourRole,
}

impl SimplifiedContour {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Rotational direction of a closed path in y-up font space
#[derive(
    Debug, Clone, Copy, PartialEq, Eq,
    Serialize, Deserialize, JsonSchema, TS,
    Display, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Orientation {
    Clockwise,
    CounterClockwise,
    /// Zero enclosed area
    Degenerate,
}

/// Drawing instruction for one outline path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    Close,
}

/// One closed polygonal path in font units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OutlinePath {
    pub points: Vec<Point>,
    pub role: ContourRole,
}

impl OutlinePath {
    pub fn new(points: Vec<Point>, role: ContourRole) -> Self {
        Self { points, role }
    }

    /// Move to the first point, line to each following point, then close
    pub fn commands(&self) -> Vec<PathCommand> {
        let mut points = self.points.iter().copied();
        let Some(first) = points.next() else {
            return Vec::new();
        };

        let mut commands = Vec::with_capacity(self.points.len() + 1);
        commands.push(PathCommand::MoveTo(first));
        commands.extend(points.map(PathCommand::LineTo));
        commands.push(PathCommand::Close);
        commands
    }

    /// Convert to a geo-types polygon for area computations
    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        let coords: Vec<Coord<f64>> = self.points.iter().copied().map(Coord::from).collect();
        Polygon::new(LineString::new(coords), vec![])
    }

    /// Shoelace area; positive means counter-clockwise in y-up space
    pub fn signed_area(&self) -> f64 {
        use geo::Area;
        self.to_geo_polygon().signed_area()
    }

    pub fn orientation(&self) -> Orientation {
        let area = self.signed_area();
        if area > 0.0 {
            Orientation::CounterClockwise
        } else if area < 0.0 {
            Orientation::Clockwise
        } else {
            Orientation::Degenerate
        }
    }

    /// Reverse the winding direction in place, keeping the start point
    pub fn reverse(&mut self) {
        if self.points.len() < 2 {
            return;
        }
        if self.points.first() == self.points.last() {
            self.points.reverse();
        } else {
            self.points[1..].reverse();
        }
    }

    pub fn bounding_box(&self) -> Option<(Point, Point)> {
        bounds(self.points.iter().copied())
    }
}

/// A character's visual shape as a set of closed paths in font units.
///
/// No fill rule is attached; see [`crate::mapping::WindingPolicy`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GlyphOutline {
    pub paths: Vec<OutlinePath>,
}

impl GlyphOutline {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.paths.iter().map(|path| path.points.len()).sum()
    }

    pub fn bounding_box(&self) -> Option<(Point, Point)> {
        bounds(self.paths.iter().flat_map(|path| path.points.iter().copied()))
    }
}

fn bounds(points: impl Iterator<Item = Point>) -> Option<(Point, Point)> {
    points.fold(None, |acc, p| match acc {
        None => Some((p, p)),
        Some((min, max)) => Some((
            Point::new(min.x.min(p.x), min.y.min(p.y)),
            Point::new(max.x.max(p.x), max.y.max(p.y)),
        )),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GlyphMetrics {
    /// Horizontal advance in font units, never below the configured floor
    pub advance_width: u32,
}

/// Everything the font-assembly collaborator needs for one glyph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GlyphRecord {
    /// `None` only for `.notdef`
    pub codepoint: Option<char>,
    pub name: String,
    pub outline: GlyphOutline,
    pub metrics: GlyphMetrics,
}

impl GlyphRecord {
    pub fn unicode(&self) -> Option<u32> {
        self.codepoint.map(u32::from)
    }
}

/// Glyph records plus font-level metadata, ready for assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FontBuild {
    pub metadata: FontMetadata,
    pub glyphs: Vec<GlyphRecord>,
}

impl FontBuild {
    pub fn glyph(&self, name: &str) -> Option<&GlyphRecord> {
        self.glyphs.iter().find(|record| record.name == name)
    }
}
