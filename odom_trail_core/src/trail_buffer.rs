//! The trail buffer - bounded, distance-gated position history
//!
//! Keeps the chronologically ordered positions that make up the trail.
//! A new sample is only appended once the robot has moved at least
//! `min_distance` away from the last *accepted* point, and the oldest
//! points are evicted once the history grows past `max_points`.

use nalgebra::Point3;
use std::collections::VecDeque;
use tracing::trace;

/// A single trail position in the display's reference frame.
pub type PathPoint = Point3<f64>;

/// Default history capacity
pub const DEFAULT_MAX_POINTS: usize = 1000;

/// Default minimum movement before a new point is appended (meters)
pub const DEFAULT_MIN_DISTANCE: f64 = 0.001;

/// Outcome of feeding one sample into the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestResult {
    /// The sample was appended to the history
    pub accepted: bool,

    /// The sample was the first one since creation or the last reset
    pub first: bool,
}

impl IngestResult {
    /// Result for a missing or malformed sample.
    pub fn ignored() -> Self {
        Self::default()
    }

    /// Whether downstream binders need to refresh.
    pub fn needs_redraw(&self) -> bool {
        self.accepted || self.first
    }
}

/// Bounded history of accepted trail points.
///
/// Capacity changes are enforced lazily: lowering `max_points` leaves the
/// current history untouched until the next accepted sample.
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    /// Accepted positions, oldest first
    history: VecDeque<PathPoint>,

    /// Most recently accepted position
    last_point: Option<PathPoint>,

    /// Maximum number of points retained (always >= 1)
    max_points: usize,

    /// Minimum distance from the last accepted point (always >= 0)
    min_distance: f64,
}

impl Default for TrailBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POINTS, DEFAULT_MIN_DISTANCE)
    }
}

impl TrailBuffer {
    /// Creates an empty buffer.
    ///
    /// `max_points` is raised to 1 and `min_distance` to 0 if smaller.
    pub fn new(max_points: usize, min_distance: f64) -> Self {
        let max_points = max_points.max(1);
        Self {
            history: VecDeque::with_capacity(max_points.min(DEFAULT_MAX_POINTS)),
            last_point: None,
            max_points,
            min_distance: sanitize_distance(min_distance),
        }
    }

    /// Feeds one sample into the buffer.
    ///
    /// `None` and samples with non-finite coordinates are ignored.
    pub fn ingest(&mut self, sample: Option<PathPoint>) -> IngestResult {
        let Some(point) = sample else {
            trace!("Ignoring missing sample");
            return IngestResult::ignored();
        };

        if !point.coords.iter().all(|c| c.is_finite()) {
            trace!("Ignoring non-finite sample {:?}", point);
            return IngestResult::ignored();
        }

        let result = match self.last_point {
            None => {
                self.history.push_back(point);
                self.last_point = Some(point);
                IngestResult {
                    accepted: true,
                    first: true,
                }
            }
            Some(last) => {
                let dist = nalgebra::distance(&point, &last);
                if dist >= self.min_distance {
                    self.history.push_back(point);
                    self.last_point = Some(point);
                    IngestResult {
                        accepted: true,
                        first: false,
                    }
                } else {
                    trace!(
                        "Rejected sample: moved {:.4}m < {:.4}m",
                        dist,
                        self.min_distance
                    );
                    return IngestResult {
                        accepted: false,
                        first: false,
                    };
                }
            }
        };

        self.enforce_capacity();
        result
    }

    /// Clears the history and forgets the last position.
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_point = None;
    }

    /// Sets the capacity. Takes effect on the next accepted sample.
    pub fn set_max_points(&mut self, max_points: usize) {
        self.max_points = max_points.max(1);
    }

    /// Sets the distance gate for subsequent samples.
    pub fn set_min_distance(&mut self, min_distance: f64) {
        self.min_distance = sanitize_distance(min_distance);
    }

    /// Accepted points, oldest first.
    pub fn history(&self) -> &VecDeque<PathPoint> {
        &self.history
    }

    /// Iterates accepted points, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &PathPoint> + '_ {
        self.history.iter()
    }

    pub fn last_point(&self) -> Option<PathPoint> {
        self.last_point
    }

    pub fn have_last_point(&self) -> bool {
        self.last_point.is_some()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }

    /// FIFO eviction of the oldest points.
    fn enforce_capacity(&mut self) {
        while self.history.len() > self.max_points {
            self.history.pop_front();
        }
    }
}

fn sanitize_distance(d: f64) -> f64 {
    if d.is_finite() {
        d.max(0.0)
    } else {
        0.0
    }
}
