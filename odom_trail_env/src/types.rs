//! Odometry message types as delivered by the robot.

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Message header: source frame and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Frame the pose is expressed in
    pub frame_id: String,

    /// Timestamp in seconds (sender's clock)
    pub stamp_secs: f64,

    /// Monotonic sequence number
    pub seq: u64,
}

/// Position and orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl Pose {
    pub fn at(position: Point3<f64>) -> Self {
        Self {
            position,
            orientation: UnitQuaternion::identity(),
        }
    }
}

/// A single odometry update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Odometry {
    pub header: Header,

    /// Frame of the robot body
    pub child_frame_id: String,

    pub pose: Pose,

    /// Linear velocity in the child frame (m/s)
    pub linear_velocity: Vector3<f64>,
}

impl Odometry {
    /// Creates a message at `position` in `frame_id` with zero velocity.
    pub fn new(frame_id: &str, seq: u64, stamp_secs: f64, position: Point3<f64>) -> Self {
        Self {
            header: Header {
                frame_id: frame_id.to_string(),
                stamp_secs,
                seq,
            },
            child_frame_id: "base_link".to_string(),
            pose: Pose::at(position),
            linear_velocity: Vector3::zeros(),
        }
    }

    /// Sets the orientation.
    pub fn with_orientation(mut self, orientation: UnitQuaternion<f64>) -> Self {
        self.pose.orientation = orientation;
        self
    }

    /// Sets the linear velocity.
    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// True when every position coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.pose.position.coords.iter().all(|c| c.is_finite())
    }
}
