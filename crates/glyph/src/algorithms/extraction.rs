use imageproc::contours::{find_contours, BorderType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr, VariantNames};
use tracing::{debug, trace};

use crate::{
    traits::ContourTracer,
    types::{Contour, ContourRole, InkMask, Point},
};

/// Traces with fewer distinct steps than this are discarded; the repeated
/// closing point does not count
pub const MIN_CONTOUR_POINTS: usize = 4;

/// Moore neighbourhood, clockwise in y-down pixel space starting east
const NEIGHBOURS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Direction assumed for the step that led into the start pixel (north)
const INITIAL_DIRECTION: usize = 6;

/// Search offset from the last step: 135 degrees counter-clockwise of its reverse
const BACKTRACK_OFFSET: usize = 5;

/// Selects which tracer a pipeline uses
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, IntoStaticStr, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TracerKind {
    /// Moore neighbourhood boundary following, outer boundaries only
    #[default]
    Moore,
    /// Suzuki-Abe border following via imageproc, tags hole boundaries
    BorderFollowing,
}

impl TracerKind {
    pub fn tracer(self) -> Box<dyn ContourTracer> {
        match self {
            Self::Moore => Box::new(MooreTracer),
            Self::BorderFollowing => Box::new(BorderFollowingTracer),
        }
    }
}

/// Pixels already consumed by a trace of the current mask
#[derive(Debug, Clone)]
pub struct VisitedSet {
    width: u32,
    cells: Vec<bool>,
    count: usize,
}

impl VisitedSet {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            cells: vec![false; width as usize * height as usize],
            count: 0,
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Mark an in-bounds point as visited
    pub fn insert(&mut self, point: Point) {
        let index = self.index(point.x as u32, point.y as u32);
        if !self.cells[index] {
            self.cells[index] = true;
            self.count += 1;
        }
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.cells[self.index(x, y)]
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

enum TraceOutcome {
    /// Returned to the start pixel; the start is repeated as the last point
    Closed(Vec<Point>),
    /// Isolated pixel or step bound exhausted
    Open(Vec<Point>),
}

/// Moore neighbourhood boundary follower.
///
/// Scans the mask in row-major order and starts a trace at every boundary
/// pixel that no earlier trace has visited. It does not tell outer
/// boundaries from hole boundaries; every contour is tagged
/// [`ContourRole::Outer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MooreTracer;

impl MooreTracer {
    fn follow(&self, mask: &InkMask, start: Point, visited: &mut VisitedSet) -> TraceOutcome {
        let max_steps = mask.width() as usize * mask.height() as usize;
        let mut points = Vec::new();
        let mut current = start;
        let mut direction = INITIAL_DIRECTION;
        let mut steps = 0;

        loop {
            visited.insert(current);
            points.push(current);

            let search_from = (direction + BACKTRACK_OFFSET) % NEIGHBOURS.len();
            let next = (0..NEIGHBOURS.len())
                .map(|i| (search_from + i) % NEIGHBOURS.len())
                .find_map(|d| {
                    let (dx, dy) = NEIGHBOURS[d];
                    let (nx, ny) = (i64::from(current.x) + dx, i64::from(current.y) + dy);
                    mask.is_ink(nx, ny)
                        .then(|| (d, Point::new(nx as i32, ny as i32)))
                });

            let Some((d, point)) = next else {
                return TraceOutcome::Open(points);
            };

            direction = d;
            current = point;
            steps += 1;

            if current == start {
                points.push(start);
                return TraceOutcome::Closed(points);
            }
            if steps >= max_steps {
                return TraceOutcome::Open(points);
            }
        }
    }
}

impl ContourTracer for MooreTracer {
    fn trace(&self, mask: &InkMask) -> Vec<Contour> {
        let mut visited = VisitedSet::new(mask.width(), mask.height());
        let mut contours = Vec::new();
        let mut discarded = 0usize;

        for y in 0..mask.height() {
            for x in 0..mask.width() {
                if !mask.is_boundary(x, y) || visited.contains(x, y) {
                    continue;
                }

                let start = Point::new(x as i32, y as i32);
                match self.follow(mask, start, &mut visited) {
                    TraceOutcome::Closed(points) if points.len() - 1 >= MIN_CONTOUR_POINTS => {
                        contours.push(Contour::new(points, ContourRole::Outer));
                    }
                    TraceOutcome::Closed(points) => {
                        discarded += 1;
                        trace!(x, y, points = points.len(), "discarding short trace");
                    }
                    TraceOutcome::Open(points) => {
                        discarded += 1;
                        trace!(x, y, points = points.len(), "discarding unclosed trace");
                    }
                }
            }
        }

        debug!(
            contours = contours.len(),
            discarded,
            visited = visited.len(),
            "moore trace finished"
        );
        contours
    }
}

/// Suzuki-Abe border following via `imageproc::contours::find_contours`.
///
/// Reports hole boundaries as [`ContourRole::Hole`], which lets the mapper
/// emit opposite winding for counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct BorderFollowingTracer;

impl ContourTracer for BorderFollowingTracer {
    fn trace(&self, mask: &InkMask) -> Vec<Contour> {
        let image = mask.to_gray_image();
        let contours: Vec<Contour> = find_contours::<i32>(&image)
            .into_iter()
            .filter_map(|contour| {
                let role = match contour.border_type {
                    BorderType::Outer => ContourRole::Outer,
                    BorderType::Hole => ContourRole::Hole,
                };
                if contour.points.len() < MIN_CONTOUR_POINTS {
                    return None;
                }
                let mut points: Vec<Point> = contour
                    .points
                    .iter()
                    .map(|p| Point::new(p.x, p.y))
                    .collect();
                points.push(points[0]);
                Some(Contour::new(points, role))
            })
            .collect();

        debug!(contours = contours.len(), "border following trace finished");
        contours
    }
}
