#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid navigation for mobs.
//!
//! [`PathFinder`] plans obstruction-free routes across the cell grid using the
//! locator as its only view of the world. A straight line is returned whenever
//! line of sight exists; otherwise an 8-connected A* search runs over cell
//! centres and its result is smoothed by dropping waypoints that are not
//! needed to steer around obstructions. [`Path`] walks the resulting polyline.

use std::collections::{HashMap, HashSet};

use bulwark_core::{CellBounds, CellCoord, Position};
use bulwark_system_locator::Locator;
use thiserror::Error;

mod path;

pub use path::{Path, Segment};

const ORTHOGONAL_COST: f32 = 1.0;
const DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;

/// Offsets of the eight neighbours of a cell, orthogonal first.
const NEIGHBOURS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Tuning knobs of the path finder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathFinderConfig {
    /// Distance between samples when testing segments for obstructions.
    pub sample_step: f32,
    /// Maximum number of nodes the search may expand before giving up.
    pub max_expansions: usize,
    /// Maximum number of smoothing passes applied to a found path.
    pub smoothing_passes: usize,
    /// Grid the search may not leave, if any.
    pub bounds: Option<CellBounds>,
}

impl Default for PathFinderConfig {
    fn default() -> Self {
        Self {
            sample_step: 0.1,
            max_expansions: 4096,
            smoothing_passes: 8,
            bounds: None,
        }
    }
}

/// Route request handed to [`PathFinder::find`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathRequest {
    /// Point the route starts from.
    pub start: Position,
    /// Point the route must reach.
    pub end: Position,
    /// Optional bound on how far from `start` any waypoint may lie.
    pub max_distance: Option<f32>,
    /// Tolerate an obstruction next to `end`, used when the target itself is solid.
    pub ignore_target_obstruction: bool,
}

impl PathRequest {
    /// Creates an unbounded request between two points.
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            max_distance: None,
            ignore_target_obstruction: false,
        }
    }

    /// Rejects routes wandering farther than `distance` from the start.
    #[must_use]
    pub const fn with_max_distance(mut self, distance: f32) -> Self {
        self.max_distance = Some(distance);
        self
    }

    /// Allows the route to end against a solid target.
    #[must_use]
    pub const fn approaching_solid_target(mut self) -> Self {
        self.ignore_target_obstruction = true;
        self
    }
}

/// Reasons a route could not be produced.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum PathError {
    /// Every reachable cell was explored without reaching the goal.
    #[error("no route from ({from_x}, {from_y}) to ({to_x}, {to_y})")]
    NoRoute {
        /// Start x coordinate.
        from_x: f32,
        /// Start y coordinate.
        from_y: f32,
        /// Goal x coordinate.
        to_x: f32,
        /// Goal y coordinate.
        to_y: f32,
    },
    /// The search expanded too many nodes.
    #[error("search gave up after expanding {expanded} nodes")]
    ExpansionLimit {
        /// Number of expanded nodes.
        expanded: usize,
    },
    /// The only route found wanders beyond the requested bound.
    #[error("route strays {distance} from its start, limit is {limit}")]
    TooFar {
        /// Largest distance of a waypoint from the start.
        distance: f32,
        /// Bound supplied with the request.
        limit: f32,
    },
}

/// A* route planner over the locator's obstruction map.
#[derive(Clone, Copy, Debug, Default)]
pub struct PathFinder {
    config: PathFinderConfig,
}

#[derive(Clone, Copy, Debug)]
struct Node {
    cell: CellCoord,
    cost: f32,
    parent: Option<usize>,
}

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    node: usize,
    score: f32,
}

impl PathFinder {
    /// Creates a path finder with the provided tuning.
    #[must_use]
    pub const fn new(config: PathFinderConfig) -> Self {
        Self { config }
    }

    /// Tuning in effect.
    #[must_use]
    pub const fn config(&self) -> &PathFinderConfig {
        &self.config
    }

    /// Plans a route and wraps it in a [`Path`] ready to be walked.
    pub fn find(&self, locator: &Locator, request: &PathRequest) -> Result<Path, PathError> {
        self.find_waypoints(locator, request)
            .map(|waypoints| Path::from_waypoints(&waypoints))
    }

    /// Plans a route and returns its waypoints, literal start and end included.
    pub fn find_waypoints(
        &self,
        locator: &Locator,
        request: &PathRequest,
    ) -> Result<Vec<Position>, PathError> {
        if self.line_of_sight(locator, request.start, request.end, request) {
            let waypoints = vec![request.start, request.end];
            self.check_distance(&waypoints, request)?;
            return Ok(waypoints);
        }

        let cells = self.search(locator, request)?;
        let waypoints = self.reconstruct(locator, request, &cells);
        self.check_distance(&waypoints, request)?;
        Ok(self.smooth(locator, request, waypoints))
    }

    fn line_of_sight(
        &self,
        locator: &Locator,
        from: Position,
        to: Position,
        request: &PathRequest,
    ) -> bool {
        match locator.segment_obstruction(from, to, self.config.sample_step) {
            None => true,
            Some(hit) => request.ignore_target_obstruction && near_target(hit, request.end),
        }
    }

    fn search(&self, locator: &Locator, request: &PathRequest) -> Result<Vec<CellCoord>, PathError> {
        let start_cell = CellCoord::containing(request.start);
        let end_cell = CellCoord::containing(request.end);

        let mut nodes = vec![Node {
            cell: start_cell,
            cost: 0.0,
            parent: None,
        }];
        let mut open = vec![OpenEntry {
            node: 0,
            score: start_cell.center().distance(request.end),
        }];
        let mut visited: HashSet<CellCoord> = HashSet::new();
        let mut best_cost: HashMap<CellCoord, f32> = HashMap::new();
        let _ = best_cost.insert(start_cell, 0.0);

        while let Some(slot) = pick_best_open(&open) {
            let entry = open.remove(slot);
            let current = nodes[entry.node];
            if !visited.insert(current.cell) {
                continue;
            }

            if current.cell == end_cell {
                return Ok(collect_cells(&nodes, entry.node));
            }

            if visited.len() > self.config.max_expansions {
                tracing::debug!(
                    expanded = visited.len(),
                    "path search exceeded expansion limit"
                );
                return Err(PathError::ExpansionLimit {
                    expanded: visited.len(),
                });
            }

            for (columns, rows) in NEIGHBOURS {
                let cell = current.cell.offset(columns, rows);
                if visited.contains(&cell) || !self.admits(locator, current.cell, cell, end_cell) {
                    continue;
                }

                let step = if columns != 0 && rows != 0 {
                    DIAGONAL_COST
                } else {
                    ORTHOGONAL_COST
                };
                let cost = current.cost + step;
                if best_cost.get(&cell).is_some_and(|known| *known <= cost) {
                    continue;
                }
                let _ = best_cost.insert(cell, cost);

                nodes.push(Node {
                    cell,
                    cost,
                    parent: Some(entry.node),
                });
                open.push(OpenEntry {
                    node: nodes.len() - 1,
                    score: cost + cell.center().distance(request.end),
                });
            }
        }

        tracing::debug!(
            start = ?request.start,
            end = ?request.end,
            "no route between points"
        );
        Err(PathError::NoRoute {
            from_x: request.start.x,
            from_y: request.start.y,
            to_x: request.end.x,
            to_y: request.end.y,
        })
    }

    /// Decides whether the search may step from `from` into `to`.
    ///
    /// The goal cell is admitted even when obstructed. A diagonal step
    /// additionally needs both orthogonal cells it squeezes between to be open.
    fn admits(&self, locator: &Locator, from: CellCoord, to: CellCoord, goal: CellCoord) -> bool {
        if to != goal && !self.open_cell(locator, to) {
            return false;
        }

        let columns = to.column() - from.column();
        let rows = to.row() - from.row();
        if columns == 0 || rows == 0 {
            return true;
        }
        self.open_cell(locator, from.offset(columns, 0))
            && self.open_cell(locator, from.offset(0, rows))
    }

    fn open_cell(&self, locator: &Locator, cell: CellCoord) -> bool {
        let inside = self.config.bounds.map_or(true, |bounds| bounds.contains(cell));
        inside && !locator.obstructed(cell.center())
    }

    fn reconstruct(
        &self,
        locator: &Locator,
        request: &PathRequest,
        cells: &[CellCoord],
    ) -> Vec<Position> {
        let mut waypoints = Vec::with_capacity(cells.len() + 2);
        waypoints.push(request.start);

        let interior: Vec<Position> = cells
            .iter()
            .skip(1)
            .take(cells.len().saturating_sub(2))
            .map(CellCoord::center)
            .collect();

        let first = interior.first().copied().unwrap_or(request.end);
        if !self.line_of_sight(locator, request.start, first, request) {
            if let Some(start_cell) = cells.first() {
                waypoints.push(start_cell.center());
            }
        }

        waypoints.extend(interior);
        waypoints.push(request.end);
        waypoints
    }

    fn check_distance(&self, waypoints: &[Position], request: &PathRequest) -> Result<(), PathError> {
        let Some(limit) = request.max_distance else {
            return Ok(());
        };
        let farthest = waypoints
            .iter()
            .map(|point| point.distance(request.start))
            .fold(0.0_f32, f32::max);
        if farthest > limit {
            return Err(PathError::TooFar {
                distance: farthest,
                limit,
            });
        }
        Ok(())
    }

    /// Greedily replaces runs of waypoints with straight unobstructed lines.
    fn smooth(&self, locator: &Locator, request: &PathRequest, mut points: Vec<Position>) -> Vec<Position> {
        let clear = |from: Position, to: Position| {
            match locator.segment_obstruction(from, to, self.config.sample_step) {
                None => true,
                Some(hit) => CellCoord::containing(hit) == CellCoord::containing(request.end),
            }
        };

        for _ in 0..self.config.smoothing_passes {
            if points.len() <= 2 {
                break;
            }

            let mut smoothed = Vec::with_capacity(points.len());
            smoothed.push(points[0]);
            let mut anchor = 0;
            while anchor + 1 < points.len() {
                let mut next = anchor + 1;
                for candidate in anchor + 2..points.len() {
                    if !clear(points[anchor], points[candidate]) {
                        break;
                    }
                    next = candidate;
                }
                smoothed.push(points[next]);
                anchor = next;
            }

            let unchanged = smoothed.len() == points.len();
            points = smoothed;
            if unchanged {
                break;
            }
        }

        points
    }
}

/// Reports whether an obstruction hit belongs to the target being approached.
fn near_target(hit: Position, end: Position) -> bool {
    CellCoord::containing(hit) == CellCoord::containing(end) || hit.distance(end) <= 1.0
}

/// Index of the open entry with the lowest score, earliest insertion first.
fn pick_best_open(open: &[OpenEntry]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, entry) in open.iter().enumerate() {
        match best {
            Some((_, score)) if entry.score >= score => {}
            _ => best = Some((index, entry.score)),
        }
    }
    best.map(|(index, _)| index)
}

fn collect_cells(nodes: &[Node], goal: usize) -> Vec<CellCoord> {
    let mut cells = Vec::new();
    let mut cursor = Some(goal);
    while let Some(index) = cursor {
        cells.push(nodes[index].cell);
        cursor = nodes[index].parent;
    }
    cells.reverse();
    cells
}
