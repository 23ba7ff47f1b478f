//! Grid geometry shared by the locator, the path finder and entity behaviours.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Floating point location expressed in grid-cell units.
///
/// A grid cell `(x, y)` covers `[x, x + 1) × [y, y + 1)`.
pub type Position = Vec2;

/// Integer coordinates of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Returns the cell containing the provided point.
    #[must_use]
    pub fn containing(point: Position) -> Self {
        Self {
            column: point.x.floor() as i32,
            row: point.y.floor() as i32,
        }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Centre point of the cell.
    #[must_use]
    pub fn center(&self) -> Position {
        Position::new(self.column as f32 + 0.5, self.row as f32 + 0.5)
    }

    /// Returns the cell displaced by the provided column and row offsets.
    #[must_use]
    pub const fn offset(&self, columns: i32, rows: i32) -> Self {
        Self {
            column: self.column + columns,
            row: self.row + rows,
        }
    }
}

/// Inclusive rectangular bounds measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellBounds {
    columns: u32,
    rows: u32,
}

impl CellBounds {
    /// Creates bounds spanning `columns × rows` cells anchored at the origin.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns covered by the bounds.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows covered by the bounds.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the bounds.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() >= 0
            && cell.row() >= 0
            && (cell.column() as u32) < self.columns
            && (cell.row() as u32) < self.rows
    }
}

/// Axis-aligned rectangle expressed in grid units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    min: Position,
    max: Position,
}

impl Aabb {
    /// Creates a rectangle from two opposite corners in any order.
    #[must_use]
    pub fn new(a: Position, b: Position) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a rectangle from explicit `[x_min, y_min, x_max, y_max]` extents.
    #[must_use]
    pub fn from_extents(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self::new(Position::new(x_min, y_min), Position::new(x_max, y_max))
    }

    /// Lower corner of the rectangle.
    #[must_use]
    pub const fn min(&self) -> Position {
        self.min
    }

    /// Upper corner of the rectangle.
    #[must_use]
    pub const fn max(&self) -> Position {
        self.max
    }

    /// Reports whether the point lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// Reports whether `point` lies inside the square footprint `center ± radius / 2`.
///
/// The footprint is half-open so that a unit block centred on a cell covers
/// exactly that cell.
#[must_use]
pub fn footprint_contains(center: Position, radius: f32, point: Position) -> bool {
    let half = radius * 0.5;
    point.x >= center.x - half
        && point.x < center.x + half
        && point.y >= center.y - half
        && point.y < center.y + half
}

/// Wraps an angle in radians into `[-π, π)`.
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU);
    wrapped - PI
}

/// Heading of the vector in radians, measured from the positive x axis.
#[must_use]
pub fn heading(vector: Vec2) -> f32 {
    vector.y.atan2(vector.x)
}
