//! The odometry trail display.
//!
//! Ties the trail buffer to the three binders. Samples go through the
//! buffer first; only accepted samples refresh the render objects.
//! Parameter changes refresh just the binder that depends on them.
//!
//! Everything runs on the caller's thread, one call at a time.

use std::collections::VecDeque;
use tracing::debug;

use crate::binders::{LabelBinder, LabelState, LineBinder, MarkerBinder};
use crate::params::{Affects, DisplayParameters, ParamChange};
use crate::presenters::{LabelPresenter, LinePresenter, MarkerPresenter, RenderHost};
use crate::trail_buffer::{IngestResult, PathPoint, TrailBuffer};
use crate::TrailError;

/// Trail, marker and label for one odometry stream.
pub struct OdomTrailDisplay<L, M, T> {
    params: DisplayParameters,
    buffer: TrailBuffer,
    line: LineBinder<L>,
    marker: MarkerBinder<M>,
    label: LabelBinder<T>,
}

impl<L, M, T> OdomTrailDisplay<L, M, T>
where
    L: LinePresenter,
    M: MarkerPresenter,
    T: LabelPresenter,
{
    /// Creates the render objects through `host` and applies the initial
    /// parameters.
    ///
    /// # Errors
    /// Fails if the host cannot create any of the three presenters.
    pub fn initialize<H>(host: &mut H, params: DisplayParameters) -> Result<Self, TrailError>
    where
        H: RenderHost<Line = L, Marker = M, Label = T>,
    {
        let line = host.create_line()?;
        let marker = host.create_marker()?;
        let label = host.create_label()?;
        Ok(Self::with_presenters(line, marker, label, params))
    }

    /// Builds a display around already created presenters.
    pub fn with_presenters(line: L, marker: M, label: T, params: DisplayParameters) -> Self {
        let params = params.sanitized();
        let buffer = TrailBuffer::new(params.max_points, params.min_distance);

        let mut display = Self {
            buffer,
            line: LineBinder::new(line),
            marker: MarkerBinder::new(marker),
            label: LabelBinder::new(label),
            params,
        };

        display.marker.update(None, &display.params);
        display.line.apply_style(&display.params);
        display.label.update(None, &display.params);
        display
    }

    /// Feeds one transformed sample into the trail.
    ///
    /// Missing or non-finite samples are ignored.
    pub fn process_sample(&mut self, sample: Option<PathPoint>) -> IngestResult {
        let result = self.buffer.ingest(sample);
        if !result.needs_redraw() {
            return result;
        }

        let last = self.buffer.last_point();
        self.line.rebuild(self.buffer.history(), &self.params);
        self.marker.update(last, &self.params);
        self.label.update(last, &self.params);
        result
    }

    /// Drops the accumulated trail. The next sample starts a new one.
    pub fn reset(&mut self) {
        self.buffer.reset();
        self.line.clear();
        debug!("Trail reset");
    }

    /// Applies one parameter change and refreshes what depends on it.
    pub fn apply(&mut self, change: ParamChange) {
        debug!("Parameter change: {:?}", change);
        match self.params.apply(change) {
            Affects::Line => {
                self.buffer.set_min_distance(self.params.min_distance);
                self.line.apply_style(&self.params);
            }
            Affects::Buffer => self.buffer.set_max_points(self.params.max_points),
            Affects::Marker => self.marker.update(self.buffer.last_point(), &self.params),
            Affects::Label => self.label.update(self.buffer.last_point(), &self.params),
        }
    }

    /// Applies several changes in order.
    pub fn apply_all(&mut self, changes: impl IntoIterator<Item = ParamChange>) {
        for change in changes {
            self.apply(change);
        }
    }

    pub fn parameters(&self) -> &DisplayParameters {
        &self.params
    }

    pub fn history(&self) -> &VecDeque<PathPoint> {
        self.buffer.history()
    }

    pub fn last_position(&self) -> Option<PathPoint> {
        self.buffer.last_point()
    }

    pub fn label_state(&self) -> LabelState {
        self.label.state()
    }

    pub fn line_presenter(&self) -> &L {
        self.line.presenter()
    }

    pub fn marker_presenter(&self) -> &M {
        self.marker.presenter()
    }

    pub fn label_presenter(&self) -> &T {
        self.label.presenter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PresenterKind;
    use crate::recording::{RecordingHost, RecordingLabel, RecordingLine, RecordingMarker};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    type TestDisplay = OdomTrailDisplay<RecordingLine, RecordingMarker, RecordingLabel>;

    fn display_with(params: DisplayParameters) -> (RecordingHost, TestDisplay) {
        let mut host = RecordingHost::new();
        let display = OdomTrailDisplay::initialize(&mut host, params).unwrap();
        (host, display)
    }

    fn p(x: f64, y: f64, z: f64) -> Option<PathPoint> {
        Some(PathPoint::new(x, y, z))
    }

    #[test]
    fn test_initialization_applies_current_settings() {
        let (host, display) = display_with(DisplayParameters::default());

        let marker = host.marker_snapshot();
        assert!(marker.visible);
        assert_eq!(marker.position, None);
        assert_relative_eq!(marker.scale.y, 0.1);

        assert_relative_eq!(host.line_snapshot().width, 0.05);
        assert!(!host.label_snapshot().visible);
        assert_eq!(display.label_state(), LabelState::Hidden);
        assert!(display.history().is_empty());
    }

    #[test]
    fn test_construction_failure_propagates() {
        for kind in [PresenterKind::Line, PresenterKind::Marker, PresenterKind::Label] {
            let mut host = RecordingHost::failing(kind);
            let result: Result<TestDisplay, _> =
                OdomTrailDisplay::initialize(&mut host, DisplayParameters::default());
            assert!(matches!(
                result,
                Err(TrailError::PresenterCreation { kind: k, .. }) if k == kind
            ));
        }
    }

    #[test]
    fn test_capacity_scenario() {
        let params = DisplayParameters {
            max_points: 3,
            min_distance: 0.0,
            ..Default::default()
        };
        let (host, mut display) = display_with(params);

        for x in 0..4 {
            display.process_sample(p(x as f64, 0.0, 0.0));
        }

        let xs: Vec<f64> = display.history().iter().map(|pt| pt.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
        assert_eq!(display.last_position(), Some(PathPoint::new(3.0, 0.0, 0.0)));

        let line = host.line_snapshot();
        let drawn: Vec<f64> = line.points.iter().map(|(pt, _)| pt.x).collect();
        assert_eq!(drawn, vec![1.0, 2.0, 3.0]);
        assert_eq!(line.point_capacity, 3);
        assert_eq!(host.marker_snapshot().position, Some(PathPoint::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn test_rejected_sample_leaves_render_objects_alone() {
        let params = DisplayParameters {
            min_distance: 5.0,
            ..Default::default()
        };
        let (host, mut display) = display_with(params);

        assert!(display.process_sample(p(0.0, 0.0, 0.0)).first);
        let clears_after_first = host.line_snapshot().clears;

        let result = display.process_sample(p(1.0, 0.0, 0.0));
        assert!(!result.accepted);
        assert_eq!(display.history().len(), 1);
        assert_eq!(display.last_position(), Some(PathPoint::origin()));
        assert_eq!(host.line_snapshot().clears, clears_after_first);
        assert_eq!(host.marker_snapshot().position, Some(PathPoint::origin()));
    }

    #[test]
    fn test_blank_label_stays_hidden() {
        let (host, mut display) = display_with(DisplayParameters::default());
        display.apply_all([
            ParamChange::ShowText(true),
            ParamChange::TextString("  ".to_string()),
        ]);
        display.process_sample(p(1.0, 1.0, 0.0));

        assert_eq!(display.label_state(), LabelState::Hidden);
        assert!(!host.label_snapshot().visible);
    }

    #[test]
    fn test_label_follows_latest_sample() {
        let (host, mut display) = display_with(DisplayParameters::default());
        display.apply(ParamChange::TextString("Robot A".to_string()));
        display.process_sample(p(1.0, 2.0, 0.0));

        let label = host.label_snapshot();
        assert_eq!(display.label_state(), LabelState::Visible);
        assert!(label.visible);
        assert_eq!(label.caption, "Robot A");
        assert_eq!(label.position, Some(PathPoint::new(1.0, 2.0, 0.1)));

        display.apply(ParamChange::TextOffset(Vector3::new(0.0, 0.0, 1.0)));
        assert_eq!(
            host.label_snapshot().position,
            Some(PathPoint::new(1.0, 2.0, 1.0))
        );
    }

    #[test]
    fn test_reset_starts_a_new_trail() {
        let params = DisplayParameters {
            min_distance: 0.0,
            ..Default::default()
        };
        let (host, mut display) = display_with(params);
        for x in 0..10 {
            display.process_sample(p(x as f64, 0.0, 0.0));
        }
        assert_eq!(display.history().len(), 10);

        display.reset();
        display.reset();
        assert!(display.history().is_empty());
        assert_eq!(display.last_position(), None);
        assert!(host.line_snapshot().points.is_empty());

        let result = display.process_sample(p(-5.0, 0.0, 0.0));
        assert!(result.first);
        assert_eq!(host.line_snapshot().points.len(), 1);
    }

    #[test]
    fn test_line_color_change_applies_on_next_sample() {
        let params = DisplayParameters {
            min_distance: 0.0,
            ..Default::default()
        };
        let (host, mut display) = display_with(params);
        display.process_sample(p(0.0, 0.0, 0.0));

        display.apply(ParamChange::LineAlpha(0.0));
        assert_eq!(host.line_snapshot().points[0].1.to_u8()[3], 255);

        display.process_sample(p(1.0, 0.0, 0.0));
        for (_, color) in host.line_snapshot().points {
            assert_eq!(color.to_u8()[3], 0);
        }
    }

    #[test]
    fn test_min_distance_change_gates_next_sample() {
        let params = DisplayParameters {
            min_distance: 0.0,
            ..Default::default()
        };
        let (_host, mut display) = display_with(params);
        display.process_sample(p(0.0, 0.0, 0.0));

        display.apply(ParamChange::MinDistance(2.0));
        assert!(!display.process_sample(p(1.0, 0.0, 0.0)).accepted);
        assert!(display.process_sample(p(2.0, 0.0, 0.0)).accepted);
    }

    #[test]
    fn test_max_points_change_is_lazy() {
        let params = DisplayParameters {
            min_distance: 0.0,
            ..Default::default()
        };
        let (host, mut display) = display_with(params);
        for x in 0..6 {
            display.process_sample(p(x as f64, 0.0, 0.0));
        }

        display.apply(ParamChange::MaxPoints(2));
        assert_eq!(display.history().len(), 6);
        assert_eq!(host.line_snapshot().points.len(), 6);

        display.process_sample(p(6.0, 0.0, 0.0));
        assert_eq!(display.history().len(), 2);
        assert_eq!(host.line_snapshot().points.len(), 2);
    }

    #[test]
    fn test_sphere_toggle_applies_immediately() {
        let (host, mut display) = display_with(DisplayParameters::default());
        display.process_sample(p(0.0, 0.0, 0.0));

        display.apply(ParamChange::ShowSphere(false));
        assert!(!host.marker_snapshot().visible);

        display.apply(ParamChange::SphereScale(0.5));
        let marker = host.marker_snapshot();
        assert!(!marker.visible);
        assert_relative_eq!(marker.scale.x, 0.5);
    }
}
