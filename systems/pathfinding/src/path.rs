//! Polyline follower used by mobs to walk planned routes.

use bulwark_core::Position;

/// Tolerance absorbing rounding when the walker is compared against an arrival threshold.
const ARRIVAL_SLACK: f32 = 1.0e-4;

/// Straight piece of a path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    start: Position,
    end: Position,
    direction: Position,
}

impl Segment {
    /// Creates a segment between two points.
    #[must_use]
    pub fn new(start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            direction: (end - start).normalize_or_zero(),
        }
    }

    /// Point the segment starts at.
    #[must_use]
    pub const fn start(&self) -> Position {
        self.start
    }

    /// Point the segment ends at.
    #[must_use]
    pub const fn end(&self) -> Position {
        self.end
    }

    /// Unit direction from start to end; zero for degenerate segments.
    #[must_use]
    pub const fn direction(&self) -> Position {
        self.direction
    }

    /// Length of the segment.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Multi-segment route with a cursor tracking progress along it.
///
/// A negative cursor means the walk has not started; a cursor equal to the
/// segment count means the walker arrived.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    home: Position,
    position: Position,
    cursor: isize,
    segments: Vec<Segment>,
    passage_points: Vec<Position>,
}

impl Path {
    /// Builds a path through the provided waypoints.
    ///
    /// Fewer than two waypoints produce a path with no segments that reports
    /// itself as arrived once advanced.
    #[must_use]
    pub fn from_waypoints(waypoints: &[Position]) -> Self {
        let home = waypoints.first().copied().unwrap_or(Position::ZERO);
        let segments = waypoints
            .windows(2)
            .map(|pair| Segment::new(pair[0], pair[1]))
            .collect();
        Self {
            home,
            position: home,
            cursor: -1,
            segments,
            passage_points: Vec::new(),
        }
    }

    /// Point the path was planned from.
    #[must_use]
    pub const fn home(&self) -> Position {
        self.home
    }

    /// Current position of the walker.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Index of the segment being walked.
    #[must_use]
    pub const fn cursor(&self) -> isize {
        self.cursor
    }

    /// Segments in walking order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment ends the walker passed, in order.
    #[must_use]
    pub fn passage_points(&self) -> &[Position] {
        &self.passage_points
    }

    /// Every waypoint of the path, home first.
    #[must_use]
    pub fn waypoints(&self) -> Vec<Position> {
        let mut points = Vec::with_capacity(self.segments.len() + 1);
        points.push(self.home);
        points.extend(self.segments.iter().map(Segment::end));
        points
    }

    /// Final waypoint of the path.
    #[must_use]
    pub fn destination(&self) -> Position {
        self.segments.last().map_or(self.home, Segment::end)
    }

    /// Reports whether the walk has begun.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.cursor >= 0
    }

    /// Reports whether the cursor moved past the final segment.
    #[must_use]
    pub fn has_arrived(&self) -> bool {
        self.is_started() && self.cursor as usize >= self.segments.len()
    }

    /// Reports whether the walker still has ground to cover.
    ///
    /// Returns `false` once the walker is on the final segment within
    /// `threshold` of its end, or has passed the final segment.
    #[must_use]
    pub fn en_route(&self, threshold: f32) -> bool {
        let Some(last) = self.segments.last() else {
            return false;
        };
        if !self.is_started() {
            return true;
        }

        let cursor = self.cursor as usize;
        if cursor >= self.segments.len() {
            return false;
        }
        !(cursor + 1 == self.segments.len()
            && self.position.distance(last.end) <= threshold + ARRIVAL_SLACK)
    }

    /// Remaining distance to the destination.
    #[must_use]
    pub fn remaining_distance(&self) -> f32 {
        if !self.is_started() {
            return self.segments.iter().map(Segment::length).sum();
        }
        let cursor = self.cursor as usize;
        match self.segments.get(cursor) {
            None => 0.0,
            Some(current) => {
                self.position.distance(current.end)
                    + self.segments[cursor + 1..]
                        .iter()
                        .map(Segment::length)
                        .sum::<f32>()
            }
        }
    }

    /// Moves the walker `speed × elapsed` along the path and returns its new
    /// position.
    ///
    /// Whole segments are completed first, snapping to each segment end. On
    /// the final segment the walker stops `arrival_threshold` short of the
    /// end; with a zero threshold reaching the end moves the cursor past the
    /// last segment.
    pub fn advance(&mut self, speed: f32, elapsed: f32, arrival_threshold: f32) -> Position {
        if !self.is_started() {
            self.cursor = 0;
            self.position = self.segments.first().map_or(self.home, Segment::start);
        }

        let threshold = arrival_threshold.max(0.0);
        let mut budget = speed.max(0.0) * elapsed.max(0.0);
        while let Some(segment) = self.segments.get(self.cursor as usize).copied() {
            let remaining = self.position.distance(segment.end);
            let last = self.cursor as usize + 1 == self.segments.len();

            if last && threshold > 0.0 {
                let usable = remaining - threshold;
                if usable > 0.0 {
                    self.position = if budget >= usable {
                        segment.end - segment.direction * threshold
                    } else {
                        self.position + segment.direction * budget
                    };
                }
                break;
            }

            if budget < remaining {
                self.position += segment.direction * budget;
                break;
            }

            budget -= remaining;
            self.position = segment.end;
            self.passage_points.push(segment.end);
            self.cursor += 1;
        }

        self.position
    }
}
