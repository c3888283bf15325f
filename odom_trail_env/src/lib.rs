//! Odometry Trail Environment Layer
//!
//! Everything between the robot and the trail display that the display
//! itself does not own:
//! - The odometry message model (`Odometry`)
//! - The inbound stream (`PoseSource`), with a Tokio channel implementation
//! - Resolution of message positions into the fixed frame (`FrameTransformer`)
//!
//! # Example
//!
//! ```ignore
//! use odom_trail_env::{FrameTransformer, PoseSource};
//!
//! async fn pump<S: PoseSource, F: FrameTransformer>(source: &S, tf: &F) {
//!     while let Some(msg) = source.recv().await {
//!         if let Ok(point) = tf.transform(&msg) {
//!             display.process_sample(Some(point));
//!         }
//!     }
//! }
//! ```

mod error;
mod frame;
mod source;
mod tokio_impl;
mod types;

pub use error::EnvError;
pub use frame::{FrameTransformer, StaticFrameTransformer};
pub use source::PoseSource;
pub use tokio_impl::{ChannelPoseSource, PoseSender};
pub use types::{Header, Odometry, Pose};
