use geo_types::{Coord, LineString};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr, VariantNames};

use crate::{
    traits::ContourSimplifier,
    types::{Contour, Point, SimplifiedContour},
};

/// Selects which simplifier a pipeline uses
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, IntoStaticStr, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SimplificationMethod {
    /// Maximum perpendicular deviation (Ramer-Douglas-Peucker)
    #[default]
    DouglasPeucker,
    /// Minimum effective area (Visvalingam-Whyatt), via geo
    VisvalingamWhyatt,
}

impl SimplificationMethod {
    pub fn simplifier(self, tolerance: f64) -> Box<dyn ContourSimplifier> {
        match self {
            Self::DouglasPeucker => Box::new(DouglasPeuckerSimplifier { tolerance }),
            Self::VisvalingamWhyatt => Box::new(VisvalingamWhyattSimplifier { tolerance }),
        }
    }
}

/// Distance from `point` to the infinite line through `a` and `b`.
///
/// Falls back to the point-to-point distance when `a == b`, which is the
/// case for the full span of a closed contour.
pub fn perpendicular_distance(point: Point, a: Point, b: Point) -> f64 {
    let (px, py) = (f64::from(point.x), f64::from(point.y));
    let (x1, y1) = (f64::from(a.x), f64::from(a.y));
    let (dx, dy) = (f64::from(b.x) - x1, f64::from(b.y) - y1);

    let length_squared = dx * dx + dy * dy;
    if length_squared == 0.0 {
        return (px - x1).hypot(py - y1);
    }

    let t = ((px - x1) * dx + (py - y1) * dy) / length_squared;
    (px - (x1 + t * dx)).hypot(py - (y1 + t * dy))
}

/// Ramer-Douglas-Peucker over a point slice.
///
/// Uses an explicit work stack, so trace length never translates into
/// call depth. A tolerance of zero (or less) returns the input unchanged.
pub fn douglas_peucker(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 || tolerance <= 0.0 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0usize, last)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }

        let (a, b) = (points[start], points[end]);
        let mut max_distance = 0.0;
        let mut split = start;
        for (index, &point) in points.iter().enumerate().take(end).skip(start + 1) {
            let distance = perpendicular_distance(point, a, b);
            if distance > max_distance {
                max_distance = distance;
                split = index;
            }
        }

        if max_distance > tolerance {
            keep[split] = true;
            stack.push((split, end));
            stack.push((start, split));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(&point, kept)| kept.then_some(point))
        .collect()
}

/// Douglas-Peucker contour simplifier
#[derive(Debug, Clone)]
pub struct DouglasPeuckerSimplifier {
    pub tolerance: f64,
}

impl Default for DouglasPeuckerSimplifier {
    fn default() -> Self {
        Self { tolerance: 2.0 }
    }
}

impl ContourSimplifier for DouglasPeuckerSimplifier {
    fn simplify(&self, contour: &Contour) -> SimplifiedContour {
        SimplifiedContour {
            points: douglas_peucker(&contour.points, self.tolerance),
            role: contour.role,
        }
    }
}

/// Visvalingam-Whyatt simplifier using geo crate's implementation.
///
/// `tolerance` is an area threshold in square pixels.
#[derive(Debug, Clone)]
pub struct VisvalingamWhyattSimplifier {
    pub tolerance: f64,
}

impl Default for VisvalingamWhyattSimplifier {
    fn default() -> Self {
        Self { tolerance: 2.0 }
    }
}

impl ContourSimplifier for VisvalingamWhyattSimplifier {
    fn simplify(&self, contour: &Contour) -> SimplifiedContour {
        use geo::SimplifyVw;

        if contour.len() < 3 || self.tolerance <= 0.0 {
            return SimplifiedContour {
                points: contour.points.clone(),
                role: contour.role,
            };
        }

        let coords: Vec<Coord<f64>> = contour.points.iter().copied().map(Coord::from).collect();
        let simplified = LineString::new(coords).simplify_vw(&self.tolerance);

        // VW keeps a subset of the integer input coordinates
        let points = simplified
            .coords()
            .map(|coord| Point::new(coord.x.round() as i32, coord.y.round() as i32))
            .collect();

        SimplifiedContour {
            points,
            role: contour.role,
        }
    }
}
