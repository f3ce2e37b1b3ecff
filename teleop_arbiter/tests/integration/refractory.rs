//! Busy and refractory behaviour under both gate policies.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use teleop_arbiter::clock::ManualClock;
use teleop_arbiter::config::ArbiterConfig;
use teleop_arbiter::pause::GatePolicy;
use teleop_arbiter::trigger::{SamplingRule, TriggerId};
use teleop_common::sim::{ActuatorCall, SimulatedRobot};

use super::common::{Joy, MS, Rig, allow};

// ─── Helpers ────────────────────────────────────────────────────────

/// Per-trigger policy with every settle delay zeroed, so only the minimum
/// intervals gate.
fn per_trigger_no_settle() -> ArbiterConfig {
    let mut config = ArbiterConfig::default();
    config.timing.policy = GatePolicy::PerTrigger;
    config.timing.power_settle_secs = 0.0;
    config.timing.sit_stand_settle_secs = 0.0;
    config.timing.toggle_settle_secs = 0.0;
    config
}

fn press(rig: &Rig, joy: Joy) -> Option<TriggerId> {
    rig.orch.handle_sample(&joy.sample()).map(|report| report.trigger)
}

fn release(rig: &Rig) {
    assert!(rig.orch.handle_sample(&Joy::enabled().sample()).is_none());
}

// ─── Shared pause ───────────────────────────────────────────────────

#[test]
fn sit_stand_settle_blocks_every_trigger() {
    let rig = Rig::blocking(GatePolicy::SharedPause, SimulatedRobot::with_pose(true, true));
    let orch = Arc::clone(&rig.orch);
    let worker = thread::spawn(move || orch.handle_sample(&Joy::enabled().sit_stand().sample()));

    rig.clock.wait_for_sleepers(1);
    rig.clock.advance(Duration::from_secs(5) - MS);
    for joy in [Joy::enabled().gait(), Joy::enabled().stairs(), Joy::enabled().power()] {
        assert!(rig.orch.arm(&joy.sample()).is_none(), "{joy:?}");
        rig.orch.arm(&Joy::enabled().sample());
    }

    rig.clock.advance(MS);
    worker.join().unwrap().expect("sit/stand fired");
    assert!(!rig.orch.is_busy());
    assert_eq!(rig.robot.call_count(ActuatorCall::Stand), 1);

    // Nothing queued up while busy.
    assert_eq!(rig.robot.call_count(ActuatorCall::SetMobilityParams), 0);
    assert_eq!(rig.robot.call_count(ActuatorCall::PowerOn), 0);
    assert_eq!(rig.orch.arm(&Joy::enabled().gait().sample()), Some(TriggerId::LocomotionCycle));
}

#[test]
fn level_sampling_refires_after_settle() {
    let mut config = ArbiterConfig::default();
    config.triggers.power.sampling = SamplingRule::Level;
    let rig = Rig::build(&config, SimulatedRobot::new(), ManualClock::auto_advancing(), allow);

    let held = Joy::enabled().power();
    assert_eq!(press(&rig, held), Some(TriggerId::PowerToggle));
    assert_eq!(press(&rig, held), Some(TriggerId::PowerToggle));

    assert_eq!(rig.robot.call_count(ActuatorCall::PowerOn), 1);
    assert_eq!(rig.robot.call_count(ActuatorCall::SafePowerOff), 1);
    assert_eq!(rig.clock.elapsed(), Duration::from_secs(6));
}

#[test]
fn edge_sampling_ignores_a_held_button() {
    let rig = Rig::auto(GatePolicy::SharedPause, SimulatedRobot::new());
    let held = Joy::enabled().power();

    assert_eq!(press(&rig, held), Some(TriggerId::PowerToggle));
    for _ in 0..5 {
        assert_eq!(press(&rig, held), None);
    }
    assert_eq!(rig.robot.call_count(ActuatorCall::PowerOn), 1);
}

#[test]
fn gait_held_through_power_settle_fires_once_free() {
    let rig = Rig::blocking(GatePolicy::SharedPause, SimulatedRobot::new());
    let orch = Arc::clone(&rig.orch);
    let power = thread::spawn(move || orch.handle_sample(&Joy::enabled().power().sample()));
    rig.clock.wait_for_sleepers(1);

    let gait = Joy::enabled().gait().sample();
    assert!(rig.orch.arm(&gait).is_none());
    rig.clock.advance(Duration::from_secs(3));
    power.join().unwrap().expect("power fired");

    // Same hold, no release in between.
    let trigger = rig.orch.arm(&gait).expect("gait fires once the pause clears");
    assert_eq!(trigger, TriggerId::LocomotionCycle);
    let orch = Arc::clone(&rig.orch);
    let cycle = thread::spawn(move || orch.complete(trigger));
    rig.clock.wait_for_sleepers(1);
    rig.clock.advance(Duration::from_millis(500));
    assert!(cycle.join().unwrap().outcome.succeeded());

    assert!(!rig.orch.is_busy());
    assert!(rig.orch.arm(&gait).is_none());
    assert_eq!(rig.orch.locomotion_mode().label, "TROT");
}

// ─── Per trigger ────────────────────────────────────────────────────

#[test]
fn power_interval_threshold() {
    let rig = Rig::build(
        &per_trigger_no_settle(),
        SimulatedRobot::new(),
        ManualClock::new(),
        allow,
    );

    assert_eq!(press(&rig, Joy::enabled().power()), Some(TriggerId::PowerToggle));
    release(&rig);

    rig.clock.advance(Duration::from_millis(749));
    assert_eq!(press(&rig, Joy::enabled().power()), None);
    release(&rig);

    rig.clock.advance(MS);
    assert_eq!(press(&rig, Joy::enabled().power()), Some(TriggerId::PowerToggle));
    assert_eq!(rig.robot.call_count(ActuatorCall::SafePowerOff), 1);
}

#[test]
fn power_held_through_its_interval_fires_when_it_expires() {
    let rig = Rig::build(
        &per_trigger_no_settle(),
        SimulatedRobot::new(),
        ManualClock::new(),
        allow,
    );

    assert_eq!(press(&rig, Joy::enabled().power()), Some(TriggerId::PowerToggle));
    release(&rig);

    // Pressed again inside the interval and held.
    rig.clock.advance(Duration::from_millis(100));
    assert_eq!(press(&rig, Joy::enabled().power()), None);
    rig.clock.advance(Duration::from_millis(649));
    assert_eq!(press(&rig, Joy::enabled().power()), None);
    rig.clock.advance(MS);
    assert_eq!(press(&rig, Joy::enabled().power()), Some(TriggerId::PowerToggle));
    for _ in 0..5 {
        rig.clock.advance(Duration::from_secs(1));
        assert_eq!(press(&rig, Joy::enabled().power()), None);
    }
    assert_eq!(rig.robot.call_count(ActuatorCall::PowerOn), 1);
    assert_eq!(rig.robot.call_count(ActuatorCall::SafePowerOff), 1);
}

#[test]
fn sit_stand_interval_is_independent_of_power() {
    let rig = Rig::build(
        &per_trigger_no_settle(),
        SimulatedRobot::with_pose(true, true),
        ManualClock::new(),
        allow,
    );

    assert_eq!(press(&rig, Joy::enabled().sit_stand()), Some(TriggerId::SitStandToggle));
    release(&rig);
    assert_eq!(press(&rig, Joy::enabled().power()), Some(TriggerId::PowerToggle));
    release(&rig);

    rig.clock.advance(Duration::from_millis(100));
    assert_eq!(press(&rig, Joy::enabled().sit_stand()), None);
    release(&rig);

    rig.clock.advance(Duration::from_millis(650));
    assert_eq!(press(&rig, Joy::enabled().sit_stand()), Some(TriggerId::SitStandToggle));
    assert_eq!(rig.robot.call_count(ActuatorCall::Stand), 2);
    assert_eq!(rig.robot.call_count(ActuatorCall::SafePowerOff), 1);
}

#[test]
fn mode_cycles_fire_back_to_back() {
    let rig = Rig::build(
        &per_trigger_no_settle(),
        SimulatedRobot::with_pose(true, false),
        ManualClock::new(),
        allow,
    );

    for expected in ["TROT", "TROT WITH STOP", "CRAWL"] {
        assert_eq!(press(&rig, Joy::enabled().gait()), Some(TriggerId::LocomotionCycle));
        release(&rig);
        assert_eq!(rig.orch.locomotion_mode().label, expected);
    }
    assert_eq!(rig.clock.elapsed(), Duration::ZERO);
}

#[test]
fn per_trigger_override_applies_to_one_trigger() {
    let mut config = per_trigger_no_settle();
    config.triggers.locomotion.refractory_secs = Some(0.2);
    let rig = Rig::build(
        &config,
        SimulatedRobot::with_pose(true, false),
        ManualClock::new(),
        allow,
    );

    assert_eq!(press(&rig, Joy::enabled().gait()), Some(TriggerId::LocomotionCycle));
    release(&rig);
    assert_eq!(press(&rig, Joy::enabled().gait()), None);
    release(&rig);
    assert_eq!(press(&rig, Joy::enabled().stairs()), Some(TriggerId::StairsCycle));
    release(&rig);

    rig.clock.advance(Duration::from_millis(200));
    assert_eq!(press(&rig, Joy::enabled().gait()), Some(TriggerId::LocomotionCycle));
}

#[test]
fn mode_cycle_runs_during_power_settle() {
    let mut config = ArbiterConfig::default();
    config.timing.policy = GatePolicy::PerTrigger;
    let rig = Rig::build(
        &config,
        SimulatedRobot::with_pose(true, false),
        ManualClock::new(),
        allow,
    );

    let orch = Arc::clone(&rig.orch);
    let power = thread::spawn(move || orch.handle_sample(&Joy::enabled().power().sample()));
    rig.clock.wait_for_sleepers(1);

    let gait = rig.orch.arm(&Joy::enabled().gait().sample()).expect("gait not gated");
    assert_eq!(rig.orch.pause_state().in_flight(), 2);
    let orch = Arc::clone(&rig.orch);
    let cycle = thread::spawn(move || orch.complete(gait));
    rig.clock.wait_for_sleepers(2);

    rig.clock.advance(Duration::from_millis(500));
    let report = cycle.join().unwrap();
    assert!(report.outcome.succeeded());
    assert_eq!(rig.orch.locomotion_mode().label, "TROT");
    assert!(rig.orch.is_busy());

    // Power stays gated by its own interval inside the settle window.
    rig.orch.arm(&Joy::enabled().sample());
    assert!(rig.orch.arm(&Joy::enabled().power().sample()).is_none());

    rig.clock.advance(Duration::from_millis(2500));
    power.join().unwrap().expect("power fired");
    assert!(!rig.orch.is_busy());
    assert_eq!(rig.orch.pause_state().in_flight(), 0);
}
