//! Ground truth oracle for the simulated robot.
//!
//! The Oracle owns the robot's true kinematic state and turns it into noisy
//! odometry messages. All randomness comes from one seeded ChaCha8 RNG, so
//! a seed fully determines the message stream.

use nalgebra::{Point3, UnitQuaternion, Vector3};
use odom_trail_env::Odometry;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::error::SimError;
use crate::scenarios::ScenarioId;

const CIRCLE_RADIUS: f64 = 5.0;
const CIRCLE_RATE: f64 = 0.5;
const EIGHT_SPAN: f64 = 3.0;
const EIGHT_RATE: f64 = 0.4;
const WALK_SPEED: f64 = 1.0;
const WALK_HEADING_STD: f64 = 0.6;
const DASH_SPEED: f64 = 8.0;

/// The Oracle - simulated robot and its odometry sensor.
pub struct Oracle {
    scenario: ScenarioId,

    /// RNG for noise and random motion
    rng: ChaCha8Rng,

    /// Sensor position noise
    noise: Normal<f64>,

    /// Probability of emitting a message with a corrupted position
    malformed_rate: f64,

    /// Frame the odometry is published in
    frame_id: String,

    /// True position (meters)
    position: Point3<f64>,

    /// True velocity (m/s), finite difference of the last step
    velocity: Vector3<f64>,

    /// Heading for the random walk (radians)
    heading: f64,

    /// Current simulation time (seconds)
    time: f64,

    /// Next message sequence number
    seq: u64,
}

impl Oracle {
    /// Creates an Oracle for `scenario`.
    ///
    /// # Errors
    /// `noise_std` must be finite and non-negative.
    pub fn new(scenario: ScenarioId, seed: u64, noise_std: f64) -> Result<Self, SimError> {
        // Normal::new accepts a negative std_dev and mirrors it
        if !noise_std.is_finite() || noise_std < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "noise_std must be finite and non-negative, got {}",
                noise_std
            )));
        }
        let noise = Normal::new(0.0, noise_std)
            .map_err(|e| SimError::InvalidConfig(format!("noise_std {}: {}", noise_std, e)))?;

        let mut oracle = Self {
            scenario,
            rng: ChaCha8Rng::seed_from_u64(seed),
            noise,
            malformed_rate: 0.0,
            frame_id: "odom".to_string(),
            position: Point3::origin(),
            velocity: Vector3::zeros(),
            heading: 0.0,
            time: 0.0,
            seq: 0,
        };
        oracle.position = oracle.true_position_at(0.0);
        Ok(oracle)
    }

    /// Sets the probability of a corrupted (NaN) message.
    pub fn with_malformed_rate(mut self, rate: f64) -> Self {
        self.malformed_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the frame messages are published in.
    pub fn with_frame(mut self, frame_id: &str) -> Self {
        self.frame_id = frame_id.to_string();
        self
    }

    /// Advances the robot by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        self.time += dt;
        let next = match self.scenario {
            ScenarioId::RandomWalk => {
                let drift: f64 = self.rng.sample(rand_distr::StandardNormal);
                self.heading += drift * WALK_HEADING_STD * dt.sqrt();
                let dir = Vector3::new(self.heading.cos(), self.heading.sin(), 0.0);
                self.position + dir * WALK_SPEED * dt
            }
            _ => self.true_position_at(self.time),
        };
        self.velocity = (next - self.position) / dt;
        self.position = next;
    }

    /// Produces the odometry message for the current state.
    pub fn odometry(&mut self) -> Odometry {
        let seq = self.seq;
        self.seq += 1;

        let mut measured = self.position
            + Vector3::new(
                self.noise.sample(&mut self.rng),
                self.noise.sample(&mut self.rng),
                self.noise.sample(&mut self.rng),
            );

        if self.malformed_rate > 0.0 && self.rng.gen_bool(self.malformed_rate) {
            measured.x = f64::NAN;
        }

        let yaw = self.velocity.y.atan2(self.velocity.x);
        Odometry::new(&self.frame_id, seq, self.time, measured)
            .with_orientation(UnitQuaternion::from_euler_angles(0.0, 0.0, yaw))
            .with_velocity(self.velocity)
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Closed-form trajectories. The random walk has none and stays put.
    fn true_position_at(&self, t: f64) -> Point3<f64> {
        match self.scenario {
            ScenarioId::Circle => {
                let a = CIRCLE_RATE * t;
                Point3::new(CIRCLE_RADIUS * a.cos(), CIRCLE_RADIUS * a.sin(), 0.0)
            }
            ScenarioId::FigureEight => {
                let a = EIGHT_RATE * t;
                Point3::new(EIGHT_SPAN * a.sin(), EIGHT_SPAN * a.sin() * a.cos(), 0.0)
            }
            ScenarioId::Dash => Point3::new(DASH_SPEED * t, 0.0, 0.0),
            ScenarioId::Idle | ScenarioId::RandomWalk => self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_circle_stays_on_radius() {
        let mut oracle = Oracle::new(ScenarioId::Circle, 1, 0.0).unwrap();
        for _ in 0..100 {
            oracle.step(0.1);
            assert_relative_eq!(oracle.position().coords.norm(), CIRCLE_RADIUS, epsilon = 1e-9);
        }
        assert_relative_eq!(oracle.time(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_idle_without_noise_repeats_position() {
        let mut oracle = Oracle::new(ScenarioId::Idle, 7, 0.0).unwrap();
        oracle.step(0.1);
        let a = oracle.odometry();
        oracle.step(0.1);
        let b = oracle.odometry();
        assert_eq!(a.pose.position, b.pose.position);
        assert_eq!((a.header.seq, b.header.seq), (0, 1));
    }

    #[test]
    fn test_random_walk_moves_at_constant_speed() {
        let mut oracle = Oracle::new(ScenarioId::RandomWalk, 3, 0.0).unwrap();
        let mut prev = oracle.position();
        for _ in 0..50 {
            oracle.step(0.1);
            let moved = (oracle.position() - prev).norm();
            assert_relative_eq!(moved, WALK_SPEED * 0.1, epsilon = 1e-9);
            prev = oracle.position();
        }
    }

    #[test]
    fn test_malformed_rate_one_corrupts_every_message() {
        let mut oracle = Oracle::new(ScenarioId::Dash, 3, 0.0)
            .unwrap()
            .with_malformed_rate(1.0);
        oracle.step(0.1);
        assert!(!oracle.odometry().is_finite());
    }

    #[test]
    fn test_invalid_noise_rejected() {
        for noise_std in [-1.0, -f64::MIN_POSITIVE, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    Oracle::new(ScenarioId::Circle, 0, noise_std),
                    Err(SimError::InvalidConfig(_))
                ),
                "noise_std {} should be rejected",
                noise_std
            );
        }
        assert!(Oracle::new(ScenarioId::Circle, 0, 0.0).is_ok());
    }

    proptest! {
        #[test]
        fn prop_same_seed_same_stream(seed in any::<u64>()) {
            let mut a = Oracle::new(ScenarioId::RandomWalk, seed, 0.05).unwrap();
            let mut b = Oracle::new(ScenarioId::RandomWalk, seed, 0.05).unwrap();
            for _ in 0..20 {
                a.step(0.05);
                b.step(0.05);
                prop_assert_eq!(a.odometry(), b.odometry());
            }
        }
    }
}
