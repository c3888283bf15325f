//! Transformation of odometry positions into the display's fixed frame.

use nalgebra::{Isometry3, Point3};
use std::collections::HashMap;

use crate::error::EnvError;
use crate::types::Odometry;

/// Resolves a message position in the display's fixed frame.
pub trait FrameTransformer {
    /// The frame every resolved position is expressed in.
    fn fixed_frame(&self) -> &str;

    /// Returns the message position in the fixed frame.
    ///
    /// # Errors
    /// * `EnvError::MalformedMessage` - the position is not finite
    /// * `EnvError::UnknownFrame` - no transform from the message frame
    fn transform(&self, msg: &Odometry) -> Result<Point3<f64>, EnvError>;
}

/// Transformer with a fixed table of frame -> fixed frame transforms.
///
/// Messages already in the fixed frame pass through unchanged.
#[derive(Debug, Clone)]
pub struct StaticFrameTransformer {
    fixed_frame: String,
    transforms: HashMap<String, Isometry3<f64>>,
}

impl StaticFrameTransformer {
    pub fn new(fixed_frame: &str) -> Self {
        Self {
            fixed_frame: fixed_frame.to_string(),
            transforms: HashMap::new(),
        }
    }

    /// Registers the pose of `frame` in the fixed frame.
    pub fn with_transform(mut self, frame: &str, frame_to_fixed: Isometry3<f64>) -> Self {
        self.insert(frame, frame_to_fixed);
        self
    }

    pub fn insert(&mut self, frame: &str, frame_to_fixed: Isometry3<f64>) {
        self.transforms.insert(frame.to_string(), frame_to_fixed);
    }
}

impl FrameTransformer for StaticFrameTransformer {
    fn fixed_frame(&self) -> &str {
        &self.fixed_frame
    }

    fn transform(&self, msg: &Odometry) -> Result<Point3<f64>, EnvError> {
        if !msg.is_finite() {
            return Err(EnvError::MalformedMessage(format!(
                "non-finite position in message {}",
                msg.header.seq
            )));
        }

        let frame = msg.header.frame_id.as_str();
        if frame == self.fixed_frame {
            return Ok(msg.pose.position);
        }

        self.transforms
            .get(frame)
            .map(|iso| iso.transform_point(&msg.pose.position))
            .ok_or_else(|| EnvError::unknown_frame(frame, &self.fixed_frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion, Vector3};

    #[test]
    fn test_fixed_frame_passthrough() {
        let tf = StaticFrameTransformer::new("map");
        let msg = Odometry::new("map", 0, 0.0, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(tf.transform(&msg).unwrap(), Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_static_transform_applied() {
        let odom_in_map = Isometry3::from_parts(
            Translation3::new(10.0, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2),
        );
        let tf = StaticFrameTransformer::new("map").with_transform("odom", odom_in_map);
        let msg = Odometry::new("odom", 0, 0.0, Point3::new(1.0, 0.0, 0.0));

        let p = tf.transform(&msg).unwrap();
        assert_relative_eq!(p.x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unknown_frame_and_bad_message() {
        let tf = StaticFrameTransformer::new("map");

        let msg = Odometry::new("odom", 0, 0.0, Point3::origin());
        assert!(matches!(tf.transform(&msg), Err(EnvError::UnknownFrame { .. })));

        let msg = Odometry::new("map", 1, 0.0, Point3::new(0.0, f64::INFINITY, 0.0));
        assert!(matches!(tf.transform(&msg), Err(EnvError::MalformedMessage(_))));
    }
}
