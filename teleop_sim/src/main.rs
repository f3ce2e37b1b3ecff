//! # Teleop Sim Binary
//!
//! Replays a recorded joystick session through the arbiter against a
//! simulated robot and prints a JSON summary.
//!
//! # Usage
//!
//! ```bash
//! # Stock mapping, real-time pacing, samples from stdin
//! teleop_sim < session.jsonl
//!
//! # Custom bindings, virtual time
//! teleop_sim --config teleop.toml --samples session.jsonl --fast
//!
//! # Robot already up and standing, motion authority refusing
//! teleop_sim --samples session.jsonl --powered --standing --deny-motion -v
//! ```

#![deny(warnings)]

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use teleop_arbiter::Orchestrator;
use teleop_arbiter::clock::{Clock, ManualClock, SystemClock};
use teleop_arbiter::config::{ArbiterConfig, load_config};
use teleop_common::sim::SimulatedRobot;
use teleop_sim::replay::{self, ReplayError};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

/// Teleop Sim - replay joystick samples through the discrete-command arbiter
#[derive(Parser, Debug)]
#[command(name = "teleop_sim")]
#[command(version)]
#[command(about = "Replay joystick samples through the arbiter against a simulated robot")]
#[command(long_about = None)]
struct Args {
    /// Arbiter configuration (TOML). Stock mapping when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON-lines sample file. Reads stdin when omitted.
    #[arg(short, long, value_name = "FILE")]
    samples: Option<PathBuf>,

    /// Run on virtual time: settle and poll waits return immediately
    #[arg(short, long)]
    fast: bool,

    /// Start with motor power on
    #[arg(long)]
    powered: bool,

    /// Start standing instead of sitting (requires --powered)
    #[arg(long, requires = "powered")]
    standing: bool,

    /// Motion authority refuses every sit/stand request
    #[arg(long)]
    deny_motion: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        // Config errors land before the subscriber exists.
        eprintln!("teleop_sim: {e}");
        error!("Replay failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path).map_err(ReplayError::from)?,
        None => ArbiterConfig::default(),
    };

    setup_tracing(&args, &config);

    info!("Teleop Sim v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &args.config {
        info!("Loaded config from {}", path.display());
    }

    let samples = replay::read_samples(replay::open_samples(args.samples.as_deref())?)?;
    info!("Read {} samples", samples.len());

    let summary = if args.fast {
        drive(&args, &config, &samples, ManualClock::auto_advancing())?
    } else {
        drive(&args, &config, &samples, SystemClock)?
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    info!("Teleop Sim replay complete");
    Ok(())
}

fn drive<C: Clock>(
    args: &Args,
    config: &ArbiterConfig,
    samples: &[teleop_common::input::InputSample],
    clock: C,
) -> Result<replay::ReplaySummary, ReplayError> {
    let robot = Arc::new(SimulatedRobot::with_pose(args.powered, !args.standing));
    robot.set_call_logging(false);
    let authority: fn(bool) -> bool = if args.deny_motion { |_| false } else { |_| true };

    let orch = Orchestrator::from_config(config, Arc::clone(&robot), authority, clock)?;
    let summary = replay::replay(&orch, samples, config.poll_period()?);

    let (powered, sitting) = robot.pose();
    info!(powered, sitting, "final robot pose");
    Ok(summary)
}

/// Setup tracing subscriber based on CLI arguments.
///
/// `--verbose` forces debug; otherwise the config's `shared.log_level`
/// applies. `RUST_LOG` directives are honoured on top.
fn setup_tracing(args: &Args, config: &ArbiterConfig) {
    let directive: Directive = if args.verbose {
        Level::DEBUG.into()
    } else {
        match config.shared.log_level.as_directive().parse() {
            Ok(directive) => directive,
            Err(_) => Level::INFO.into(),
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(directive);

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
