//! Display parameters and the changes the settings surface can make to them.
//!
//! Every parameter is independent. Changes arrive one at a time as
//! [`ParamChange`] values; applying one reports which parts of the display
//! depend on it so only those get refreshed.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::trail_buffer::{DEFAULT_MAX_POINTS, DEFAULT_MIN_DISTANCE};

/// Smallest line width accepted by the settings surface (meters).
pub const MIN_LINE_WIDTH: f32 = 0.001;

/// 8-bit RGB color as picked in a settings UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Converts to a floating point color with the given alpha.
    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba {
            r: self.r as f32 / 255.0,
            g: self.g as f32 / 255.0,
            b: self.b as f32 / 255.0,
            a: alpha,
        }
    }
}

/// Floating point RGBA color, each channel in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Converts to 8-bit channels, rounding to nearest.
    pub fn to_u8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

/// All user-editable display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayParameters {
    // Trail (line)
    pub line_color: Rgb8,
    pub line_alpha: f32,
    pub line_width: f32,
    pub max_points: usize,
    pub min_distance: f64,

    // Marker at the latest position
    pub show_sphere: bool,
    pub sphere_color: Rgb8,
    pub sphere_alpha: f32,
    /// Diameter in meters
    pub sphere_scale: f32,

    // Floating text label
    pub show_text: bool,
    pub text_string: String,
    pub text_color: Rgb8,
    pub text_alpha: f32,
    /// Character height in meters
    pub text_scale: f32,
    pub text_offset: Vector3<f64>,
}

impl Default for DisplayParameters {
    fn default() -> Self {
        Self {
            line_color: Rgb8::new(255, 0, 0),
            line_alpha: 1.0,
            line_width: 0.05,
            max_points: DEFAULT_MAX_POINTS,
            min_distance: DEFAULT_MIN_DISTANCE,

            show_sphere: true,
            sphere_color: Rgb8::new(0, 255, 0),
            sphere_alpha: 1.0,
            sphere_scale: 0.1,

            show_text: true,
            text_string: String::new(),
            text_color: Rgb8::new(20, 20, 20),
            text_alpha: 1.0,
            text_scale: 0.1,
            text_offset: Vector3::new(0.0, 0.0, 0.1),
        }
    }
}

impl DisplayParameters {
    /// Parses parameters from JSON. Missing fields keep their defaults and
    /// out-of-range values are clamped.
    pub fn from_json(json: &str) -> Result<Self, crate::TrailError> {
        let params: Self = serde_json::from_str(json)?;
        Ok(params.sanitized())
    }

    /// Returns a copy with every value clamped into its valid range.
    pub fn sanitized(mut self) -> Self {
        self.line_alpha = clamp_unit(self.line_alpha);
        self.line_width = clamp_min(self.line_width, MIN_LINE_WIDTH);
        self.max_points = self.max_points.max(1);
        self.min_distance = if self.min_distance.is_finite() {
            self.min_distance.max(0.0)
        } else {
            0.0
        };
        self.sphere_alpha = clamp_unit(self.sphere_alpha);
        self.sphere_scale = clamp_min(self.sphere_scale, 0.0);
        self.text_alpha = clamp_unit(self.text_alpha);
        self.text_scale = clamp_min(self.text_scale, 0.0);
        if !self.text_offset.iter().all(|c| c.is_finite()) {
            self.text_offset = Vector3::zeros();
        }
        self
    }

    pub fn line_rgba(&self) -> Rgba {
        self.line_color.with_alpha(self.line_alpha)
    }

    pub fn sphere_rgba(&self) -> Rgba {
        self.sphere_color.with_alpha(self.sphere_alpha)
    }

    pub fn text_rgba(&self) -> Rgba {
        self.text_color.with_alpha(self.text_alpha)
    }

    /// True when the label should be drawn: enabled and not blank.
    ///
    /// Blank means only ASCII whitespace (space, `\t`, `\n`, `\r`, form feed,
    /// vertical tab). Other Unicode spaces count as text.
    pub fn label_visible(&self) -> bool {
        self.show_text && !self.text_string.chars().all(is_blank)
    }

    /// Applies a single change and reports what depends on it.
    ///
    /// The value is clamped before it is stored.
    pub fn apply(&mut self, change: ParamChange) -> Affects {
        let affects = change.affects();
        match change.clamped() {
            ParamChange::LineColor(c) => self.line_color = c,
            ParamChange::LineAlpha(a) => self.line_alpha = a,
            ParamChange::LineWidth(w) => self.line_width = w,
            ParamChange::MaxPoints(n) => self.max_points = n,
            ParamChange::MinDistance(d) => self.min_distance = d,
            ParamChange::ShowSphere(s) => self.show_sphere = s,
            ParamChange::SphereColor(c) => self.sphere_color = c,
            ParamChange::SphereAlpha(a) => self.sphere_alpha = a,
            ParamChange::SphereScale(s) => self.sphere_scale = s,
            ParamChange::ShowText(s) => self.show_text = s,
            ParamChange::TextString(t) => self.text_string = t,
            ParamChange::TextColor(c) => self.text_color = c,
            ParamChange::TextAlpha(a) => self.text_alpha = a,
            ParamChange::TextScale(s) => self.text_scale = s,
            ParamChange::TextOffset(o) => self.text_offset = o,
        }
        affects
    }
}

/// One edit coming from the settings surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "param", content = "value", rename_all = "snake_case")]
pub enum ParamChange {
    LineColor(Rgb8),
    LineAlpha(f32),
    LineWidth(f32),
    MaxPoints(usize),
    MinDistance(f64),
    ShowSphere(bool),
    SphereColor(Rgb8),
    SphereAlpha(f32),
    SphereScale(f32),
    ShowText(bool),
    TextString(String),
    TextColor(Rgb8),
    TextAlpha(f32),
    TextScale(f32),
    TextOffset(Vector3<f64>),
}

impl ParamChange {
    /// Clamps the carried value into the parameter's valid range.
    pub fn clamped(self) -> Self {
        match self {
            ParamChange::LineAlpha(a) => ParamChange::LineAlpha(clamp_unit(a)),
            ParamChange::LineWidth(w) => ParamChange::LineWidth(clamp_min(w, MIN_LINE_WIDTH)),
            ParamChange::MaxPoints(n) => ParamChange::MaxPoints(n.max(1)),
            ParamChange::MinDistance(d) => {
                ParamChange::MinDistance(if d.is_finite() { d.max(0.0) } else { 0.0 })
            }
            ParamChange::SphereAlpha(a) => ParamChange::SphereAlpha(clamp_unit(a)),
            ParamChange::SphereScale(s) => ParamChange::SphereScale(clamp_min(s, 0.0)),
            ParamChange::TextAlpha(a) => ParamChange::TextAlpha(clamp_unit(a)),
            ParamChange::TextScale(s) => ParamChange::TextScale(clamp_min(s, 0.0)),
            ParamChange::TextOffset(o) if !o.iter().all(|c| c.is_finite()) => {
                ParamChange::TextOffset(Vector3::zeros())
            }
            other => other,
        }
    }

    /// The component that depends on this parameter.
    pub fn affects(&self) -> Affects {
        match self {
            ParamChange::LineColor(_)
            | ParamChange::LineAlpha(_)
            | ParamChange::LineWidth(_)
            | ParamChange::MinDistance(_) => Affects::Line,
            ParamChange::MaxPoints(_) => Affects::Buffer,
            ParamChange::ShowSphere(_)
            | ParamChange::SphereColor(_)
            | ParamChange::SphereAlpha(_)
            | ParamChange::SphereScale(_) => Affects::Marker,
            ParamChange::ShowText(_)
            | ParamChange::TextString(_)
            | ParamChange::TextColor(_)
            | ParamChange::TextAlpha(_)
            | ParamChange::TextScale(_)
            | ParamChange::TextOffset(_) => Affects::Label,
        }
    }
}

/// The display components a parameter change must refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affects {
    /// Line style (and, for `min_distance`, the buffer gate)
    Line,
    /// History capacity only; nothing is redrawn
    Buffer,
    Marker,
    Label,
}

fn is_blank(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0b'
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        1.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

fn clamp_min(v: f32, min: f32) -> f32 {
    if v.is_nan() {
        min
    } else {
        v.max(min)
    }
}
