//! JSON exporter for simulation runs.
//!
//! Captures the trail state periodically so a run can be replayed or
//! inspected offline.

use odom_trail_core::{
    LabelPresenter, LabelState, LinePresenter, MarkerPresenter, OdomTrailDisplay, PathPoint,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

use crate::error::SimError;
use crate::runner::RunSummary;

/// Trail state after one processed message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailFrame {
    /// Sequence number of the message just processed
    pub seq: u64,

    /// Message timestamp in seconds
    pub stamp_secs: f64,

    /// Trail points, oldest first
    pub trail: Vec<[f64; 3]>,

    /// Marker position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_position: Option<[f64; 3]>,

    pub label_visible: bool,

    pub max_points: usize,
}

impl TrailFrame {
    /// Snapshots a display.
    pub fn capture<L, M, T>(seq: u64, stamp_secs: f64, display: &OdomTrailDisplay<L, M, T>) -> Self
    where
        L: LinePresenter,
        M: MarkerPresenter,
        T: LabelPresenter,
    {
        let xyz = |p: &PathPoint| [p.x, p.y, p.z];
        Self {
            seq,
            stamp_secs,
            trail: display.history().iter().map(xyz).collect(),
            last_position: display.last_position().as_ref().map(xyz),
            label_visible: display.label_state() == LabelState::Visible,
            max_points: display.parameters().max_points,
        }
    }
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// All captured frames
    pub frames: Vec<TrailFrame>,

    /// Run statistics, filled in at the end
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            frames: Vec::new(),
            summary: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: TrailFrame) {
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, summary: RunSummary) {
        self.summary = Some(summary);
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
