//! Simulation configuration loaded from JSON.
//!
//! ```json
//! {
//!   "fixed_frame": "map",
//!   "frames": [{ "frame": "odom", "translation": [2.0, 0.0, 0.0], "yaw": 0.0 }],
//!   "display": { "max_points": 200, "text_string": "Robot A" },
//!   "schedule": [
//!     { "tick": 100, "action": { "set": { "param": "max_points", "value": 50 } } },
//!     { "tick": 200, "action": "reset" }
//!   ]
//! }
//! ```

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use odom_trail_core::{DisplayParameters, ParamChange};
use odom_trail_env::StaticFrameTransformer;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SimError;
use crate::scenarios::ScenarioId;

/// Pose of a source frame in the fixed frame (planar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    pub frame: String,
    #[serde(default)]
    pub translation: [f64; 3],
    /// Rotation about z (radians)
    #[serde(default)]
    pub yaw: f64,
}

impl FrameConfig {
    pub fn isometry(&self) -> Isometry3<f64> {
        let [x, y, z] = self.translation;
        Isometry3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.yaw),
        )
    }
}

/// What happens at a scheduled tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// A settings change, as if made by the user
    Set(ParamChange),
    /// Clear the trail
    Reset,
}

/// An action applied right before the message with `seq == tick` is processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledAction {
    pub tick: u64,
    pub action: Action,
}

/// Complete configuration of a trail simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Frame the trail is drawn in
    pub fixed_frame: String,

    /// Frame the simulated robot publishes odometry in
    pub odom_frame: String,

    /// Known source frames
    pub frames: Vec<FrameConfig>,

    /// Initial display parameters
    pub display: DisplayParameters,

    /// Timed parameter changes and resets
    pub schedule: Vec<ScheduledAction>,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            fixed_frame: "map".to_string(),
            odom_frame: "odom".to_string(),
            frames: vec![FrameConfig {
                frame: "odom".to_string(),
                translation: [0.0; 3],
                yaw: 0.0,
            }],
            display: DisplayParameters::default(),
            schedule: Vec::new(),
        }
    }
}

impl TrailConfig {
    /// Default configuration with the scenario's display presets.
    pub fn for_scenario(scenario: ScenarioId) -> Self {
        Self {
            display: scenario.default_parameters(),
            ..Default::default()
        }
    }

    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parses and validates a configuration.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    /// Clamps the display parameters, sorts the schedule and checks frames.
    pub fn validated(mut self) -> Result<Self, SimError> {
        if self.fixed_frame.is_empty() {
            return Err(SimError::InvalidConfig("fixed_frame is empty".to_string()));
        }
        for frame in &self.frames {
            let finite = frame.translation.iter().all(|v| v.is_finite()) && frame.yaw.is_finite();
            if !finite {
                return Err(SimError::InvalidConfig(format!(
                    "frame '{}' has a non-finite transform",
                    frame.frame
                )));
            }
        }
        self.display = self.display.sanitized();
        // Stable: actions at the same tick keep file order
        self.schedule.sort_by_key(|a| a.tick);
        Ok(self)
    }

    /// Builds the frame transformer for this configuration.
    pub fn transformer(&self) -> StaticFrameTransformer {
        let mut tf = StaticFrameTransformer::new(&self.fixed_frame);
        for frame in &self.frames {
            tf.insert(&frame.frame, frame.isometry());
        }
        tf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use odom_trail_env::{FrameTransformer, Odometry};
    use std::io::Write;

    #[test]
    fn test_full_config_parses() {
        let config = TrailConfig::from_json(
            r#"{
                "fixed_frame": "map",
                "frames": [{ "frame": "odom", "translation": [2.0, 0.0, 0.0] }],
                "display": { "max_points": 200, "text_string": "Robot A", "sphere_alpha": 4.0 },
                "schedule": [
                    { "tick": 200, "action": "reset" },
                    { "tick": 100, "action": { "set": { "param": "max_points", "value": 50 } } }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.display.max_points, 200);
        assert_eq!(config.display.sphere_alpha, 1.0);
        assert_eq!(config.odom_frame, "odom");
        assert_eq!(config.schedule[0].tick, 100);
        assert_eq!(config.schedule[0].action, Action::Set(ParamChange::MaxPoints(50)));
        assert_eq!(config.schedule[1].action, Action::Reset);

        let msg = Odometry::new("odom", 0, 0.0, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(config.transformer().transform(&msg).unwrap(), Point3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(TrailConfig::from_json("{}").unwrap(), TrailConfig::default());
    }

    #[test]
    fn test_rejects_empty_fixed_frame() {
        assert!(matches!(
            TrailConfig::from_json(r#"{ "fixed_frame": "" }"#),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "display": {{ "min_distance": 0.25 }} }}"#).unwrap();

        let config = TrailConfig::load(file.path()).unwrap();
        assert_eq!(config.display.min_distance, 0.25);
    }
}
