//! Sample file reading and the replay loop.
//!
//! Sample files hold one `InputSample` per line as JSON:
//!
//! ```text
//! {"axes": [0.0, 0.0, -1.0, 0.0, 0.0, -1.0, 0.0, 0.0], "buttons": []}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use teleop_arbiter::Orchestrator;
use teleop_arbiter::clock::Clock;
use teleop_arbiter::dispatch::{DispatchOutcome, DispatchReport};
use teleop_arbiter::trigger::TriggerId;
use teleop_common::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Error types for a replay run.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error reading samples: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid sample on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Open `path`, or stdin when `None`.
pub fn open_samples(path: Option<&Path>) -> Result<Box<dyn BufRead>, ReplayError> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    })
}

/// Parse every sample line. Line numbers in errors are 1-based.
pub fn read_samples<R: BufRead>(reader: R) -> Result<Vec<InputSample>, ReplayError> {
    let mut samples = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let sample = serde_json::from_str(trimmed).map_err(|source| ReplayError::Json {
            line: index + 1,
            source,
        })?;
        samples.push(sample);
    }
    Ok(samples)
}

/// Dispatch counts per trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TriggerCounts {
    pub power: usize,
    pub sit_stand: usize,
    pub locomotion: usize,
    pub stairs: usize,
}

impl TriggerCounts {
    fn record(&mut self, trigger: TriggerId) {
        match trigger {
            TriggerId::PowerToggle => self.power += 1,
            TriggerId::SitStandToggle => self.sit_stand += 1,
            TriggerId::LocomotionCycle => self.locomotion += 1,
            TriggerId::StairsCycle => self.stairs += 1,
        }
    }
}

/// End-of-run summary, printed as JSON by the binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub samples: usize,
    pub dispatched: TriggerCounts,
    /// Dispatches whose actuator call failed.
    pub failed: usize,
    /// Sit/stand requests refused by the motion authority.
    pub denied: usize,
    pub locomotion_mode: String,
    pub stairs_mode: String,
    /// Clock time spent in the replay, including settle waits.
    pub elapsed_secs: f64,
}

impl ReplaySummary {
    fn record(&mut self, report: &DispatchReport) {
        self.dispatched.record(report.trigger);
        match &report.outcome {
            DispatchOutcome::PostureDenied { .. } => self.denied += 1,
            outcome if !outcome.succeeded() => self.failed += 1,
            _ => {}
        }
    }
}

/// Feed `samples` to `orch`, one per `poll_period`.
///
/// The poll wait is taken on the orchestrator's own clock, after any
/// settle delay, the way a single-threaded host loop would.
pub fn replay<A, M, C>(
    orch: &Orchestrator<A, M, C>,
    samples: &[InputSample],
    poll_period: Duration,
) -> ReplaySummary
where
    A: RobotActuator,
    M: MotionAuthority,
    C: Clock,
{
    let start = orch.clock().now();
    let mut summary = ReplaySummary {
        samples: samples.len(),
        ..ReplaySummary::default()
    };

    for (index, sample) in samples.iter().enumerate() {
        if let Some(report) = orch.handle_sample(sample) {
            log_report(index, &report);
            summary.record(&report);
        }
        orch.clock().sleep(poll_period);
    }

    summary.locomotion_mode = orch.locomotion_mode().label;
    summary.stairs_mode = orch.stairs_mode().label;
    summary.elapsed_secs = orch.clock().now().duration_since(start).as_secs_f64();
    summary
}

fn log_report(index: usize, report: &DispatchReport) {
    match &report.outcome {
        DispatchOutcome::Power {
            transition,
            response,
        } => info!(
            sample = index,
            %transition,
            success = response.success,
            message = %response.message,
            "power"
        ),
        DispatchOutcome::Posture {
            transition,
            response,
        } => info!(
            sample = index,
            %transition,
            success = response.success,
            message = %response.message,
            "posture"
        ),
        DispatchOutcome::PostureDenied { reason } => warn!(sample = index, "{reason}"),
        DispatchOutcome::Locomotion { entry, applied } => match applied {
            Ok(()) => info!(sample = index, mode = %entry.label, "locomotion"),
            Err(e) => warn!(sample = index, mode = %entry.label, error = %e, "locomotion"),
        },
        DispatchOutcome::Stairs { entry, applied } => match applied {
            Ok(()) => info!(sample = index, mode = %entry.label, "stairs"),
            Err(e) => warn!(sample = index, mode = %entry.label, error = %e, "stairs"),
        },
    }
    debug!(sample = index, settle_ms = report.settle.as_millis() as u64, "settled");
}

// ─── Tests ──────────────────────────────────────────────────────────
