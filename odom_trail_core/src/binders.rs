//! Binders project the trail state onto the host's render objects.
//!
//! Each binder owns exactly one presenter and is the only code allowed to
//! mutate it.

use nalgebra::Vector3;
use std::collections::VecDeque;
use tracing::trace;

use crate::params::DisplayParameters;
use crate::presenters::{LabelPresenter, LinePresenter, MarkerPresenter};
use crate::trail_buffer::PathPoint;

// =============================================================================
// LINE
// =============================================================================

/// Keeps the polyline in sync with the trail history.
#[derive(Debug)]
pub struct LineBinder<L> {
    line: L,
}

impl<L: LinePresenter> LineBinder<L> {
    pub fn new(line: L) -> Self {
        Self { line }
    }

    /// Clears and reconstructs the whole polyline from the history.
    ///
    /// Every point gets the same color; there is no per-point gradient.
    pub fn rebuild(&mut self, history: &VecDeque<PathPoint>, params: &DisplayParameters) {
        self.line.clear();
        self.line.set_segment_count(1);
        self.line.set_point_capacity(history.len());
        self.line.set_width(params.line_width);

        let color = params.line_rgba();
        for point in history {
            self.line.append_point(*point, color);
        }
        trace!("Rebuilt trail with {} points", history.len());
    }

    /// Re-applies style after a line parameter change.
    ///
    /// Only the width takes effect immediately. Color and alpha are picked
    /// up by the next [`rebuild`](Self::rebuild).
    pub fn apply_style(&mut self, params: &DisplayParameters) {
        self.line.set_width(params.line_width);
    }

    /// Removes every point from the rendered line.
    pub fn clear(&mut self) {
        self.line.clear();
    }

    pub fn presenter(&self) -> &L {
        &self.line
    }
}

// =============================================================================
// MARKER
// =============================================================================

/// Places the marker at the latest position.
#[derive(Debug)]
pub struct MarkerBinder<M> {
    marker: M,
}

impl<M: MarkerPresenter> MarkerBinder<M> {
    pub fn new(marker: M) -> Self {
        Self { marker }
    }

    /// Applies visibility, color and scale, then moves the marker if a last
    /// position exists. An empty trail does not hide the marker.
    pub fn update(&mut self, last: Option<PathPoint>, params: &DisplayParameters) {
        self.marker.set_visible(params.show_sphere);
        self.marker.set_color(params.sphere_rgba());

        // Scale factor on a unit-diameter primitive
        let d = params.sphere_scale;
        self.marker.set_scale(Vector3::new(d, d, d));

        if let Some(position) = last {
            self.marker.set_position(position);
        }
    }

    pub fn presenter(&self) -> &M {
        &self.marker
    }
}

// =============================================================================
// LABEL
// =============================================================================

/// Visibility state of the floating label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelState {
    Hidden,
    Visible,
}

/// Places and styles the floating text label.
#[derive(Debug)]
pub struct LabelBinder<T> {
    label: T,
    state: LabelState,
}

impl<T: LabelPresenter> LabelBinder<T> {
    /// Wraps the presenter and hides it until the first update.
    pub fn new(mut label: T) -> Self {
        label.set_visible(false);
        Self {
            label,
            state: LabelState::Hidden,
        }
    }

    /// Refreshes the label from the current parameters.
    ///
    /// Hidden when text is disabled or blank; otherwise shows the caption
    /// with the configured color and height. The attachment point follows
    /// the last position (plus offset) in both states.
    pub fn update(&mut self, last: Option<PathPoint>, params: &DisplayParameters) {
        if params.label_visible() {
            self.label.set_visible(true);
            self.label.set_caption(&params.text_string);
            self.label.set_color(params.text_rgba());
            self.label.set_character_height(params.text_scale);
            self.state = LabelState::Visible;
        } else {
            self.label.set_visible(false);
            self.state = LabelState::Hidden;
        }

        if let Some(position) = last {
            self.label.set_position(position + params.text_offset);
        }
    }

    pub fn state(&self) -> LabelState {
        self.state
    }

    pub fn presenter(&self) -> &T {
        &self.label
    }
}
