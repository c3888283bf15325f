//! Headless render host that records presenter state in memory.
//!
//! Presenters handed to the display share their state with the host, so
//! tests and the simulator can inspect what would have been drawn.

use nalgebra::Vector3;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{PresenterKind, TrailError};
use crate::params::Rgba;
use crate::presenters::{LabelPresenter, LinePresenter, MarkerPresenter, RenderHost};
use crate::trail_buffer::PathPoint;

/// Last known state of the polyline.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordedLine {
    pub segment_count: usize,
    pub point_capacity: usize,
    pub width: f32,
    pub points: Vec<(PathPoint, Rgba)>,
    /// Number of times the line was cleared
    pub clears: usize,
}

/// Last known state of the marker.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedMarker {
    pub visible: bool,
    pub color: Option<Rgba>,
    pub scale: Vector3<f32>,
    pub position: Option<PathPoint>,
}

impl Default for RecordedMarker {
    fn default() -> Self {
        Self {
            visible: true,
            color: None,
            scale: Vector3::new(1.0, 1.0, 1.0),
            position: None,
        }
    }
}

/// Last known state of the label.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedLabel {
    pub visible: bool,
    pub caption: String,
    pub color: Option<Rgba>,
    pub character_height: f32,
    pub position: Option<PathPoint>,
}

impl Default for RecordedLabel {
    fn default() -> Self {
        Self {
            visible: true,
            caption: String::new(),
            color: None,
            character_height: 1.0,
            position: None,
        }
    }
}

fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    // Presenters never panic while holding the lock
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Polyline presenter writing into shared state.
#[derive(Debug, Clone)]
pub struct RecordingLine {
    state: Arc<Mutex<RecordedLine>>,
}

impl LinePresenter for RecordingLine {
    fn clear(&mut self) {
        let mut s = lock(&self.state);
        s.points.clear();
        s.clears += 1;
    }

    fn set_segment_count(&mut self, count: usize) {
        lock(&self.state).segment_count = count;
    }

    fn set_point_capacity(&mut self, capacity: usize) {
        lock(&self.state).point_capacity = capacity;
    }

    fn set_width(&mut self, width: f32) {
        lock(&self.state).width = width;
    }

    fn append_point(&mut self, position: PathPoint, color: Rgba) {
        lock(&self.state).points.push((position, color));
    }
}

/// Marker presenter writing into shared state.
#[derive(Debug, Clone)]
pub struct RecordingMarker {
    state: Arc<Mutex<RecordedMarker>>,
}

impl MarkerPresenter for RecordingMarker {
    fn set_visible(&mut self, visible: bool) {
        lock(&self.state).visible = visible;
    }

    fn set_color(&mut self, color: Rgba) {
        lock(&self.state).color = Some(color);
    }

    fn set_scale(&mut self, scale: Vector3<f32>) {
        lock(&self.state).scale = scale;
    }

    fn set_position(&mut self, position: PathPoint) {
        lock(&self.state).position = Some(position);
    }
}

/// Label presenter writing into shared state.
#[derive(Debug, Clone)]
pub struct RecordingLabel {
    state: Arc<Mutex<RecordedLabel>>,
}

impl LabelPresenter for RecordingLabel {
    fn set_visible(&mut self, visible: bool) {
        lock(&self.state).visible = visible;
    }

    fn set_caption(&mut self, caption: &str) {
        lock(&self.state).caption = caption.to_string();
    }

    fn set_color(&mut self, color: Rgba) {
        lock(&self.state).color = Some(color);
    }

    fn set_character_height(&mut self, height: f32) {
        lock(&self.state).character_height = height;
    }

    fn set_position(&mut self, position: PathPoint) {
        lock(&self.state).position = Some(position);
    }
}

/// In-memory [`RenderHost`].
///
/// A host can be told to fail creating one presenter kind, which exercises
/// the display's construction failure path.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    line: Arc<Mutex<RecordedLine>>,
    marker: Arc<Mutex<RecordedMarker>>,
    label: Arc<Mutex<RecordedLabel>>,
    stamp: Arc<Mutex<Option<f64>>>,
    fail_on: Option<PresenterKind>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host whose creation of `kind` always fails.
    pub fn failing(kind: PresenterKind) -> Self {
        Self {
            fail_on: Some(kind),
            ..Self::default()
        }
    }

    pub fn line_snapshot(&self) -> RecordedLine {
        lock(&self.line).clone()
    }

    pub fn marker_snapshot(&self) -> RecordedMarker {
        lock(&self.marker).clone()
    }

    pub fn label_snapshot(&self) -> RecordedLabel {
        lock(&self.label).clone()
    }

    /// Last time passed to [`RenderHost::set_time`].
    pub fn stamp(&self) -> Option<f64> {
        *lock(&self.stamp)
    }

    fn check(&self, kind: PresenterKind) -> Result<(), TrailError> {
        match self.fail_on {
            Some(failing) if failing == kind => {
                Err(TrailError::presenter(kind, "creation refused by recording host"))
            }
            _ => Ok(()),
        }
    }
}

impl RenderHost for RecordingHost {
    type Line = RecordingLine;
    type Marker = RecordingMarker;
    type Label = RecordingLabel;

    fn create_line(&mut self) -> Result<Self::Line, TrailError> {
        self.check(PresenterKind::Line)?;
        Ok(RecordingLine {
            state: Arc::clone(&self.line),
        })
    }

    fn create_marker(&mut self) -> Result<Self::Marker, TrailError> {
        self.check(PresenterKind::Marker)?;
        Ok(RecordingMarker {
            state: Arc::clone(&self.marker),
        })
    }

    fn create_label(&mut self) -> Result<Self::Label, TrailError> {
        self.check(PresenterKind::Label)?;
        Ok(RecordingLabel {
            state: Arc::clone(&self.label),
        })
    }

    fn set_time(&mut self, stamp_secs: f64) {
        *lock(&self.stamp) = Some(stamp_secs);
    }
}
