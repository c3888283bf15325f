//! Capability interfaces for the host-owned render objects.
//!
//! The display never touches a scene graph directly. It drives three narrow
//! presenters created by a [`RenderHost`], which makes the core testable
//! without a renderer (see [`crate::recording`]).

use nalgebra::Vector3;

use crate::params::Rgba;
use crate::trail_buffer::PathPoint;
use crate::TrailError;

/// A renderable polyline.
pub trait LinePresenter {
    /// Removes every point from the line.
    fn clear(&mut self);

    /// Number of independent line strips.
    fn set_segment_count(&mut self, count: usize);

    /// Number of points the strip will hold.
    fn set_point_capacity(&mut self, capacity: usize);

    /// Line thickness in meters.
    fn set_width(&mut self, width: f32);

    fn append_point(&mut self, position: PathPoint, color: Rgba);
}

/// A renderable marker primitive of unit diameter.
pub trait MarkerPresenter {
    fn set_visible(&mut self, visible: bool);
    fn set_color(&mut self, color: Rgba);
    fn set_scale(&mut self, scale: Vector3<f32>);
    fn set_position(&mut self, position: PathPoint);
}

/// A floating text label with an independently positioned attachment point.
pub trait LabelPresenter {
    fn set_visible(&mut self, visible: bool);
    fn set_caption(&mut self, caption: &str);
    fn set_color(&mut self, color: Rgba);
    fn set_character_height(&mut self, height: f32);
    /// Moves the attachment point of the label.
    fn set_position(&mut self, position: PathPoint);
}

/// Host environment able to create the render objects.
///
/// Creation failure is fatal to the display being initialized.
pub trait RenderHost {
    type Line: LinePresenter;
    type Marker: MarkerPresenter;
    type Label: LabelPresenter;

    fn create_line(&mut self) -> Result<Self::Line, TrailError>;
    fn create_marker(&mut self) -> Result<Self::Marker, TrailError>;
    fn create_label(&mut self) -> Result<Self::Label, TrailError>;

    /// Stamps subsequent presenter updates with the sample time (seconds).
    ///
    /// Hosts without a timeline ignore it.
    fn set_time(&mut self, _stamp_secs: f64) {}
}

impl<T: LinePresenter + ?Sized> LinePresenter for Box<T> {
    fn clear(&mut self) {
        (**self).clear()
    }
    fn set_segment_count(&mut self, count: usize) {
        (**self).set_segment_count(count)
    }
    fn set_point_capacity(&mut self, capacity: usize) {
        (**self).set_point_capacity(capacity)
    }
    fn set_width(&mut self, width: f32) {
        (**self).set_width(width)
    }
    fn append_point(&mut self, position: PathPoint, color: Rgba) {
        (**self).append_point(position, color)
    }
}

impl<T: MarkerPresenter + ?Sized> MarkerPresenter for Box<T> {
    fn set_visible(&mut self, visible: bool) {
        (**self).set_visible(visible)
    }
    fn set_color(&mut self, color: Rgba) {
        (**self).set_color(color)
    }
    fn set_scale(&mut self, scale: Vector3<f32>) {
        (**self).set_scale(scale)
    }
    fn set_position(&mut self, position: PathPoint) {
        (**self).set_position(position)
    }
}

impl<T: LabelPresenter + ?Sized> LabelPresenter for Box<T> {
    fn set_visible(&mut self, visible: bool) {
        (**self).set_visible(visible)
    }
    fn set_caption(&mut self, caption: &str) {
        (**self).set_caption(caption)
    }
    fn set_color(&mut self, color: Rgba) {
        (**self).set_color(color)
    }
    fn set_character_height(&mut self, height: f32) {
        (**self).set_character_height(height)
    }
    fn set_position(&mut self, position: PathPoint) {
        (**self).set_position(position)
    }
}
