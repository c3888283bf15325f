//! Rerun-backed render host
//!
//! Maps the three presenters onto Rerun archetypes:
//! - Trail -> `LineStrips3D` at `<root>/trail`
//! - Marker -> `Points3D` at `<root>/marker`
//! - Label -> labelled `Points3D` at `<root>/label`
//!
//! Hidden objects are logged as `Clear`. Enable with the `visualization`
//! feature flag.

use nalgebra::Vector3;
use rerun::{RecordingStream, RecordingStreamBuilder};
use tracing::warn;

use crate::error::{PresenterKind, TrailError};
use crate::params::Rgba;
use crate::presenters::{LabelPresenter, LinePresenter, MarkerPresenter, RenderHost};
use crate::trail_buffer::PathPoint;

fn color(c: Rgba) -> rerun::Color {
    let [r, g, b, a] = c.to_u8();
    rerun::Color::from_unmultiplied_rgba(r, g, b, a)
}

fn position(p: &PathPoint) -> [f32; 3] {
    [p.x as f32, p.y as f32, p.z as f32]
}

fn log_or_warn<AS>(rec: &RecordingStream, path: &str, archetype: &AS)
where
    AS: ?Sized + rerun::AsComponents,
{
    if let Err(e) = rec.log(path, archetype) {
        warn!("Failed to log {}: {:?}", path, e);
    }
}

/// Rerun host creating presenters below one entity path.
pub struct RerunHost {
    rec: RecordingStream,
    root: String,
}

impl RerunHost {
    /// Spawns a Rerun viewer and logs below `root`.
    pub fn spawn(app_id: &str, root: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let rec = RecordingStreamBuilder::new(app_id).spawn()?;
        Self::with_stream(rec, root)
    }

    /// Saves the recording to an `.rrd` file instead of spawning a viewer.
    pub fn save(app_id: &str, root: &str, path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let rec = RecordingStreamBuilder::new(app_id).save(path)?;
        Self::with_stream(rec, root)
    }

    fn with_stream(rec: RecordingStream, root: &str) -> Result<Self, Box<dyn std::error::Error>> {
        rec.log_static(root, &rerun::ViewCoordinates::RIGHT_HAND_Z_UP())?;
        Ok(Self {
            rec,
            root: root.trim_end_matches('/').to_string(),
        })
    }

    fn path(&self, leaf: &str) -> String {
        format!("{}/{}", self.root, leaf)
    }
}

impl RenderHost for RerunHost {
    type Line = RerunLine;
    type Marker = RerunMarker;
    type Label = RerunLabel;

    fn create_line(&mut self) -> Result<Self::Line, TrailError> {
        if self.root.is_empty() {
            return Err(TrailError::presenter(PresenterKind::Line, "empty entity path"));
        }
        Ok(RerunLine {
            rec: self.rec.clone(),
            path: self.path("trail"),
            width: 0.0,
            capacity: 0,
            points: Vec::new(),
            colors: Vec::new(),
        })
    }

    fn create_marker(&mut self) -> Result<Self::Marker, TrailError> {
        if self.root.is_empty() {
            return Err(TrailError::presenter(PresenterKind::Marker, "empty entity path"));
        }
        Ok(RerunMarker {
            rec: self.rec.clone(),
            path: self.path("marker"),
            visible: true,
            color: None,
            diameter: 1.0,
            position: None,
        })
    }

    fn create_label(&mut self) -> Result<Self::Label, TrailError> {
        if self.root.is_empty() {
            return Err(TrailError::presenter(PresenterKind::Label, "empty entity path"));
        }
        Ok(RerunLabel {
            rec: self.rec.clone(),
            path: self.path("label"),
            visible: false,
            caption: String::new(),
            color: None,
            position: None,
        })
    }

    fn set_time(&mut self, stamp_secs: f64) {
        self.rec.set_duration_secs("stamp", stamp_secs);
    }
}

/// Trail polyline. Logged once all announced points have been appended.
pub struct RerunLine {
    rec: RecordingStream,
    path: String,
    width: f32,
    capacity: usize,
    points: Vec<[f32; 3]>,
    colors: Vec<rerun::Color>,
}

impl RerunLine {
    fn publish(&self) {
        if self.points.len() < 2 {
            log_or_warn(&self.rec, &self.path, &rerun::Clear::flat());
            return;
        }
        // Rerun only supports one color per strip
        let strip_color = self.colors.last().copied();
        let mut strips = rerun::LineStrips3D::new([self.points.clone()])
            .with_radii([self.width / 2.0]);
        if let Some(c) = strip_color {
            strips = strips.with_colors([c]);
        }
        log_or_warn(&self.rec, &self.path, &strips);
    }
}

impl LinePresenter for RerunLine {
    fn clear(&mut self) {
        self.points.clear();
        self.colors.clear();
        log_or_warn(&self.rec, &self.path, &rerun::Clear::flat());
    }

    fn set_segment_count(&mut self, _count: usize) {}

    fn set_point_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.points.reserve(capacity);
    }

    fn set_width(&mut self, width: f32) {
        self.width = width;
        if self.points.len() >= self.capacity && !self.points.is_empty() {
            self.publish();
        }
    }

    fn append_point(&mut self, p: PathPoint, c: Rgba) {
        self.points.push(position(&p));
        self.colors.push(color(c));
        if self.points.len() == self.capacity {
            self.publish();
        }
    }
}

/// Marker sphere, drawn as a single point of the configured diameter.
pub struct RerunMarker {
    rec: RecordingStream,
    path: String,
    visible: bool,
    color: Option<rerun::Color>,
    diameter: f32,
    position: Option<[f32; 3]>,
}

impl RerunMarker {
    fn publish(&self) {
        match (self.visible, self.position) {
            (true, Some(pos)) => {
                let mut points = rerun::Points3D::new([pos]).with_radii([self.diameter / 2.0]);
                if let Some(c) = self.color {
                    points = points.with_colors([c]);
                }
                log_or_warn(&self.rec, &self.path, &points);
            }
            _ => log_or_warn(&self.rec, &self.path, &rerun::Clear::flat()),
        }
    }
}

impl MarkerPresenter for RerunMarker {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.publish();
    }

    fn set_color(&mut self, c: Rgba) {
        self.color = Some(color(c));
        self.publish();
    }

    fn set_scale(&mut self, scale: Vector3<f32>) {
        self.diameter = scale.max();
        self.publish();
    }

    fn set_position(&mut self, p: PathPoint) {
        self.position = Some(position(&p));
        self.publish();
    }
}

/// Floating label, drawn as an invisible point carrying the caption.
pub struct RerunLabel {
    rec: RecordingStream,
    path: String,
    visible: bool,
    caption: String,
    color: Option<rerun::Color>,
    position: Option<[f32; 3]>,
}

impl RerunLabel {
    fn publish(&self) {
        match (self.visible, self.position) {
            (true, Some(pos)) => {
                let mut points = rerun::Points3D::new([pos])
                    .with_radii([0.0])
                    .with_labels([self.caption.clone()]);
                if let Some(c) = self.color {
                    points = points.with_colors([c]);
                }
                log_or_warn(&self.rec, &self.path, &points);
            }
            _ => log_or_warn(&self.rec, &self.path, &rerun::Clear::flat()),
        }
    }
}

impl LabelPresenter for RerunLabel {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.publish();
    }

    fn set_caption(&mut self, caption: &str) {
        self.caption = caption.to_string();
        self.publish();
    }

    fn set_color(&mut self, c: Rgba) {
        self.color = Some(color(c));
        self.publish();
    }

    // Rerun picks the label font size itself
    fn set_character_height(&mut self, _height: f32) {}

    fn set_position(&mut self, p: PathPoint) {
        self.position = Some(position(&p));
        self.publish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DisplayParameters, OdomTrailDisplay};

    #[test]
    #[ignore] // Requires Rerun viewer
    fn test_rerun_host_drives_display() {
        let mut host = RerunHost::spawn("odom_trail_test", "world/robot").unwrap();
        let mut display =
            OdomTrailDisplay::initialize(&mut host, DisplayParameters::default()).unwrap();
        host.set_time(0.0);
        display.process_sample(Some(PathPoint::new(0.0, 0.0, 0.0)));
        host.set_time(0.1);
        display.process_sample(Some(PathPoint::new(1.0, 0.0, 0.0)));
        assert_eq!(display.history().len(), 2);
    }
}
