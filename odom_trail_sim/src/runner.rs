//! Runs one scenario end to end.
//!
//! A producer task publishes the Oracle's odometry on a channel. The
//! consumer receives one message at a time, applies any scheduled settings
//! changes, resolves the position into the fixed frame and hands it to the
//! display.

use odom_trail_core::{OdomTrailDisplay, RenderHost};
use odom_trail_env::{ChannelPoseSource, FrameTransformer, PoseSource};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

use crate::config::{Action, ScheduledAction, TrailConfig};
use crate::error::SimError;
use crate::exporter::{SimExport, TrailFrame};
use crate::oracle::Oracle;
use crate::scenarios::ScenarioId;

/// Parameters of a single run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Master seed for determinism
    pub seed: u64,

    pub scenario: ScenarioId,

    /// Odometry publishing rate in Hz
    pub rate_hz: u32,

    /// Simulated duration in seconds
    pub duration_secs: f64,

    /// Position noise standard deviation (meters)
    pub noise_std: f64,

    /// Probability of a corrupted message
    pub malformed_rate: f64,

    /// Capture a frame every N messages (0 = never)
    pub export_interval: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            scenario: ScenarioId::Circle,
            rate_hz: 30,
            duration_secs: 10.0,
            noise_std: 0.005,
            malformed_rate: 0.0,
            export_interval: 10,
        }
    }
}

impl RunConfig {
    /// Number of messages the run publishes.
    pub fn total_ticks(&self) -> u64 {
        (self.duration_secs.max(0.0) * self.rate_hz as f64).round() as u64
    }
}

/// Statistics of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub scenario: String,
    pub seed: u64,

    /// Messages received from the source
    pub received: u64,

    /// Samples appended to the trail
    pub accepted: u64,

    /// Samples rejected by the distance gate
    pub rejected: u64,

    /// Messages without a usable position (corrupt or unknown frame)
    pub dropped: u64,

    pub resets: u64,

    /// Parameter changes applied from the schedule
    pub changes: u64,

    /// Trail length at the end of the run
    pub final_len: usize,

    /// Longest trail observed after an accepted sample
    pub max_len_seen: usize,

    /// Accepted samples after which the trail exceeded its capacity
    pub capacity_violations: u64,
}

impl RunSummary {
    pub fn passed(&self) -> bool {
        self.capacity_violations == 0
    }
}

/// Drives a display from a simulated robot.
pub struct TrailRunner {
    run: RunConfig,
    config: TrailConfig,
}

impl TrailRunner {
    pub fn new(run: RunConfig, config: TrailConfig) -> Self {
        Self { run, config }
    }

    /// Runs the scenario against `host`, optionally capturing frames.
    ///
    /// # Errors
    /// Fails if the display cannot be created, the Oracle is misconfigured,
    /// or the producer task dies.
    pub async fn run<H: RenderHost>(
        &self,
        host: &mut H,
        mut export: Option<&mut SimExport>,
    ) -> Result<RunSummary, SimError> {
        let mut trail = OdomTrailDisplay::initialize(host, self.config.display.clone())?;
        let transformer = self.config.transformer();

        let mut oracle = Oracle::new(self.run.scenario, self.run.seed, self.run.noise_std)?
            .with_malformed_rate(self.run.malformed_rate)
            .with_frame(&self.config.odom_frame);

        let (tx, source) = ChannelPoseSource::new("/odom", 256);
        let ticks = self.run.total_ticks();
        let dt = 1.0 / self.run.rate_hz.max(1) as f64;

        let producer = tokio::spawn(async move {
            for _ in 0..ticks {
                oracle.step(dt);
                if tx.send(oracle.odometry()).await.is_err() {
                    break;
                }
            }
        });

        let mut schedule: VecDeque<ScheduledAction> =
            self.config.schedule.iter().cloned().collect();
        let mut summary = RunSummary {
            scenario: self.run.scenario.name().to_string(),
            seed: self.run.seed,
            ..Default::default()
        };

        info!(
            "Running {} (seed={}, {} messages on {})",
            self.run.scenario,
            self.run.seed,
            ticks,
            source.topic()
        );

        while let Some(msg) = source.recv().await {
            summary.received += 1;
            let seq = msg.header.seq;

            while schedule.front().map_or(false, |a| a.tick <= seq) {
                if let Some(scheduled) = schedule.pop_front() {
                    match scheduled.action {
                        Action::Set(change) => {
                            trail.apply(change);
                            summary.changes += 1;
                        }
                        Action::Reset => {
                            trail.reset();
                            summary.resets += 1;
                        }
                    }
                }
            }

            let sample = match transformer.transform(&msg) {
                Ok(point) => Some(point),
                Err(e) => {
                    debug!("Dropping message {}: {}", seq, e);
                    summary.dropped += 1;
                    None
                }
            };

            host.set_time(msg.header.stamp_secs);
            let result = trail.process_sample(sample);
            if sample.is_some() {
                if result.accepted {
                    summary.accepted += 1;
                } else {
                    summary.rejected += 1;
                }
            }

            if result.accepted {
                let len = trail.history().len();
                summary.max_len_seen = summary.max_len_seen.max(len);
                let capacity = trail.parameters().max_points;
                if len > capacity {
                    warn!("Trail holds {} points, capacity {}", len, capacity);
                    summary.capacity_violations += 1;
                }
            }

            if let Some(export) = export.as_deref_mut() {
                if self.run.export_interval > 0 && seq % self.run.export_interval == 0 {
                    export.add_frame(TrailFrame::capture(seq, msg.header.stamp_secs, &trail));
                }
            }
        }

        producer
            .await
            .map_err(|e| SimError::Producer(e.to_string()))?;

        summary.final_len = trail.history().len();
        debug!(
            "{}: accepted={} rejected={} dropped={} final_len={}",
            summary.scenario, summary.accepted, summary.rejected, summary.dropped, summary.final_len
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use odom_trail_core::{ParamChange, PresenterKind, RecordingHost, TrailError};

    fn run_config(scenario: ScenarioId) -> RunConfig {
        RunConfig {
            scenario,
            duration_secs: 5.0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_circle_run_draws_trail() {
        let run = run_config(ScenarioId::Circle);
        let runner = TrailRunner::new(run.clone(), TrailConfig::for_scenario(ScenarioId::Circle));
        let mut host = RecordingHost::new();

        let summary = runner.run(&mut host, None).await.unwrap();

        assert_eq!(summary.received, run.total_ticks());
        assert_eq!(summary.accepted + summary.rejected + summary.dropped, summary.received);
        assert!(summary.passed());
        assert_eq!(host.line_snapshot().points.len(), summary.final_len);
        assert!(host.marker_snapshot().position.is_some());
        assert_eq!(host.label_snapshot().caption, "robot (circle)");
    }

    #[tokio::test]
    async fn test_dash_is_capped() {
        let runner = TrailRunner::new(
            run_config(ScenarioId::Dash),
            TrailConfig::for_scenario(ScenarioId::Dash),
        );
        let mut host = RecordingHost::new();

        let summary = runner.run(&mut host, None).await.unwrap();

        assert_eq!(summary.final_len, 100);
        assert_eq!(summary.max_len_seen, 100);
        assert!(summary.passed());
    }

    #[tokio::test]
    async fn test_idle_robot_is_gated() {
        let run = RunConfig {
            noise_std: 0.001,
            ..run_config(ScenarioId::Idle)
        };
        let runner = TrailRunner::new(run, TrailConfig::for_scenario(ScenarioId::Idle));
        let mut host = RecordingHost::new();

        let summary = runner.run(&mut host, None).await.unwrap();

        // Jitter of 1mm never moves the robot 1cm from the first point
        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.final_len, 1);
    }

    #[tokio::test]
    async fn test_schedule_and_corrupt_messages() {
        let run = RunConfig {
            malformed_rate: 0.2,
            ..run_config(ScenarioId::Dash)
        };
        let mut config = TrailConfig::for_scenario(ScenarioId::Dash);
        config.schedule = vec![
            ScheduledAction {
                tick: 60,
                action: Action::Reset,
            },
            ScheduledAction {
                tick: 80,
                action: Action::Set(ParamChange::MaxPoints(10)),
            },
        ];
        let runner = TrailRunner::new(run, config);
        let mut host = RecordingHost::new();

        let summary = runner.run(&mut host, None).await.unwrap();

        assert_eq!(summary.resets, 1);
        assert_eq!(summary.changes, 1);
        assert!(summary.dropped > 0);
        assert_eq!(summary.final_len, 10);
        assert!(summary.passed());
    }

    #[tokio::test]
    async fn test_unknown_frame_drops_everything() {
        let config = TrailConfig {
            odom_frame: "wheel_odom".to_string(),
            ..Default::default()
        };
        let runner = TrailRunner::new(run_config(ScenarioId::Circle), config);
        let mut host = RecordingHost::new();

        let summary = runner.run(&mut host, None).await.unwrap();

        assert_eq!(summary.dropped, summary.received);
        assert_eq!(summary.final_len, 0);
        assert!(host.marker_snapshot().position.is_none());
    }

    #[tokio::test]
    async fn test_export_captures_frames() {
        let run = run_config(ScenarioId::Circle);
        let runner = TrailRunner::new(run.clone(), TrailConfig::for_scenario(ScenarioId::Circle));
        let mut host = RecordingHost::new();
        let mut export = SimExport::new("circle", run.seed);

        let summary = runner.run(&mut host, Some(&mut export)).await.unwrap();
        export.finalize(summary.clone());

        assert_eq!(export.frames.len() as u64, run.total_ticks().div_ceil(run.export_interval));
        assert!(export.frames.iter().all(|f| f.label_visible));
        assert_eq!(export.frames[0].trail.len(), 1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        export.write_to_file(path.to_str().unwrap()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back: SimExport = serde_json::from_str(&text).unwrap();
        assert_eq!(back.summary, Some(summary));
    }

    #[tokio::test]
    async fn test_host_timeline_follows_message_stamps() {
        let run = run_config(ScenarioId::Circle);
        let runner = TrailRunner::new(run.clone(), TrailConfig::for_scenario(ScenarioId::Circle));
        let mut host = RecordingHost::new();

        runner.run(&mut host, None).await.unwrap();

        let stamp = host.stamp().unwrap();
        assert_relative_eq!(stamp, run.duration_secs, epsilon = 1e-6);
    }

    #[tokio::test]
    async fn test_negative_noise_fails_the_run() {
        let run = RunConfig {
            noise_std: -0.1,
            ..run_config(ScenarioId::Circle)
        };
        let runner = TrailRunner::new(run, TrailConfig::default());
        let mut host = RecordingHost::new();

        let result = runner.run(&mut host, None).await;
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_host_failure_is_fatal() {
        let runner = TrailRunner::new(run_config(ScenarioId::Circle), TrailConfig::default());
        let mut host = RecordingHost::failing(PresenterKind::Line);

        let result = runner.run(&mut host, None).await;
        assert!(matches!(
            result,
            Err(SimError::Trail(TrailError::PresenterCreation { .. }))
        ));
    }
}
