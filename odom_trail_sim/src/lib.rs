//! Odometry Trail Simulation Harness
//!
//! Drives the trail display with a deterministic, simulated robot so the
//! trail behavior can be exercised without a real robot or viewer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   Odometry    ┌───────────────┐   PathPoint   ┌──────────────────┐
//! │  Oracle  │──────────────►│  PoseSource   │──────────────►│ OdomTrailDisplay │
//! │ (seeded) │  tokio mpsc   │ + FrameTransf. │  fixed frame  │ (buffer+binders) │
//! └──────────┘               └───────────────┘               └────────┬─────────┘
//!                                                                     │
//!                                                     RecordingHost / RerunHost
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use odom_trail_sim::{RunConfig, TrailConfig, TrailRunner, ScenarioId};
//! use odom_trail_core::recording::RecordingHost;
//!
//! let run = RunConfig { scenario: ScenarioId::Dash, ..Default::default() };
//! let runner = TrailRunner::new(run, TrailConfig::for_scenario(ScenarioId::Dash));
//! let summary = runner.run(&mut RecordingHost::new(), None).await?;
//! ```

pub mod config;
mod error;
mod exporter;
mod oracle;
mod runner;
pub mod scenarios;

pub use config::{Action, FrameConfig, ScheduledAction, TrailConfig};
pub use error::SimError;
pub use exporter::{SimExport, TrailFrame};
pub use oracle::Oracle;
pub use runner::{RunConfig, RunSummary, TrailRunner};
pub use scenarios::ScenarioId;
