//! Odometry Trail Core - bounded trail visualization for pose streams
//!
//! Turns a live stream of robot positions into three render objects:
//! 1. **Trail**: a polyline over a bounded, distance-gated position history
//! 2. **Marker**: a sphere at the most recent position
//! 3. **Label**: optional floating text above the most recent position
//!
//! The render objects belong to a host environment and are driven through
//! the traits in [`presenters`]. [`recording::RecordingHost`] is a headless
//! host; the `visualization` feature adds a Rerun-backed one.

pub mod binders;
pub mod display;
pub mod error;
pub mod params;
pub mod presenters;
pub mod recording;
pub mod trail_buffer;

#[cfg(feature = "visualization")]
pub mod visualization;

// Re-export key types for convenience
pub use binders::LabelState;
pub use display::OdomTrailDisplay;
pub use error::{PresenterKind, TrailError};
pub use params::{DisplayParameters, ParamChange, Rgb8, Rgba};
pub use presenters::{LabelPresenter, LinePresenter, MarkerPresenter, RenderHost};
pub use recording::RecordingHost;
pub use trail_buffer::{IngestResult, PathPoint, TrailBuffer};
