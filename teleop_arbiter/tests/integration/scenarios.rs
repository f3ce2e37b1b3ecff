//! End-to-end command scenarios on the stock mapping.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use teleop_arbiter::clock::ManualClock;
use teleop_arbiter::config::{ArbiterConfig, PresetEntry};
use teleop_arbiter::dispatch::{
    DispatchOutcome, MOTION_DENIED_MESSAGE, PostureTransition, PowerTransition,
};
use teleop_arbiter::pause::GatePolicy;
use teleop_arbiter::trigger::TriggerId;
use teleop_common::actuator::ActuatorError;
use teleop_common::presets::{LocomotionHint, Preset, StairsMode};
use teleop_common::sim::{ActuatorCall, FaultPlan, SimulatedRobot};

use super::common::{Joy, MS, Rig, allow, deny};

// ─── Helpers ────────────────────────────────────────────────────────

/// Press and release `joy` once through the orchestrator.
fn tap(rig: &Rig, joy: Joy) -> Option<TriggerId> {
    let fired = rig.orch.handle_sample(&joy.sample()).map(|report| report.trigger);
    rig.orch.handle_sample(&Joy::enabled().sample());
    fired
}

// ─── Enable ─────────────────────────────────────────────────────────

#[test]
fn disabled_samples_never_act() {
    let rig = Rig::auto(GatePolicy::SharedPause, SimulatedRobot::with_pose(true, true));
    let presses = [
        Joy::default().power(),
        Joy::default().sit_stand(),
        Joy::default().gait(),
        Joy::default().stairs(),
        Joy::default().power().sit_stand().gait(),
        Joy::default().power().stairs(),
    ];

    for press in presses {
        assert!(rig.orch.handle_sample(&press.sample()).is_none(), "{press:?}");
        assert!(rig.orch.handle_sample(&Joy::default().sample()).is_none());
    }

    assert!(rig.robot.calls().is_empty());
    assert_eq!(rig.orch.locomotion_mode().label, "AUTO");
    assert_eq!(rig.orch.stairs_mode().label, "OFF");
    assert_eq!(rig.clock.elapsed(), Duration::ZERO);
    assert!(!rig.orch.is_busy());
}

#[test]
fn enable_released_mid_hold_does_not_fire_on_return() {
    let rig = Rig::auto(GatePolicy::SharedPause, SimulatedRobot::with_pose(true, false));

    // Held with enable, released enable while still holding, enable back.
    let first = rig.orch.handle_sample(&Joy::enabled().gait().sample()).unwrap();
    assert_eq!(first.trigger, TriggerId::LocomotionCycle);
    assert!(rig.orch.handle_sample(&Joy::default().gait().sample()).is_none());
    assert!(rig.orch.handle_sample(&Joy::enabled().gait().sample()).is_none());
    assert_eq!(rig.robot.call_count(ActuatorCall::SetMobilityParams), 1);
}

// ─── Arbitration ────────────────────────────────────────────────────

#[test]
fn power_and_stairs_together_dispatch_power_only() {
    let rig = Rig::auto(GatePolicy::SharedPause, SimulatedRobot::new());

    let report = rig
        .orch
        .handle_sample(&Joy::enabled().power().stairs().sample())
        .expect("power fires");

    assert_eq!(report.trigger, TriggerId::PowerToggle);
    assert_eq!(rig.robot.call_count(ActuatorCall::PowerOn), 1);
    assert_eq!(rig.robot.call_count(ActuatorCall::SetMobilityParams), 0);
    assert_eq!(rig.orch.stairs_mode().label, "OFF");
    assert_eq!(rig.robot.params().stairs_mode, StairsMode::Auto);
}

#[test]
fn dropped_stairs_press_fires_on_next_sample() {
    let rig = Rig::auto(GatePolicy::SharedPause, SimulatedRobot::new());

    let first = rig.orch.handle_sample(&Joy::enabled().power().stairs().sample());
    assert_eq!(first.map(|report| report.trigger), Some(TriggerId::PowerToggle));

    // Stairs stays held after power is released.
    let held = Joy::enabled().stairs().sample();
    let fired: Vec<TriggerId> = (0..20)
        .filter_map(|_| rig.orch.handle_sample(&held))
        .map(|report| report.trigger)
        .collect();
    assert_eq!(fired, vec![TriggerId::StairsCycle]);
    assert_eq!(rig.orch.stairs_mode().label, "ON");
    assert_eq!(rig.robot.call_count(ActuatorCall::SetMobilityParams), 1);
}

#[test]
fn sit_stand_beats_gait() {
    let rig = Rig::auto(GatePolicy::SharedPause, SimulatedRobot::with_pose(true, true));
    let report = rig
        .orch
        .handle_sample(&Joy::enabled().sit_stand().gait().sample())
        .unwrap();
    assert_eq!(report.trigger, TriggerId::SitStandToggle);
    assert_eq!(rig.orch.locomotion_mode().label, "AUTO");
}

// ─── Power ──────────────────────────────────────────────────────────

#[test]
fn power_toggle_holds_busy_through_settle() {
    let rig = Rig::blocking(GatePolicy::SharedPause, SimulatedRobot::new());
    let orch = Arc::clone(&rig.orch);
    let worker = thread::spawn(move || orch.handle_sample(&Joy::enabled().power().sample()));

    rig.clock.wait_for_sleepers(1);
    assert_eq!(rig.robot.call_count(ActuatorCall::PowerOn), 1);
    assert!(rig.orch.is_busy());

    rig.clock.advance(Duration::from_secs(3) - MS);
    assert!(rig.orch.is_busy());
    // A fresh press of anything is swallowed while settling.
    assert!(rig.orch.handle_sample(&Joy::enabled().sample()).is_none());
    assert!(rig.orch.arm(&Joy::enabled().stairs().sample()).is_none());
    assert!(rig.orch.arm(&Joy::enabled().power().sample()).is_none());

    rig.clock.advance(MS);
    let report = worker.join().unwrap().expect("power fired");
    assert!(!rig.orch.is_busy());
    assert_eq!(report.settle, Duration::from_secs(3));
    assert!(matches!(
        report.outcome,
        DispatchOutcome::Power {
            transition: PowerTransition::OffToOn,
            ..
        }
    ));
    assert_eq!(rig.robot.call_count(ActuatorCall::PowerOn), 1);
    assert_eq!(rig.robot.pose(), (true, true));
}

#[test]
fn second_power_press_powers_off() {
    let rig = Rig::auto(GatePolicy::SharedPause, SimulatedRobot::new());

    assert_eq!(tap(&rig, Joy::enabled().power()), Some(TriggerId::PowerToggle));
    let report = rig.orch.handle_sample(&Joy::enabled().power().sample()).unwrap();

    assert!(matches!(
        report.outcome,
        DispatchOutcome::Power {
            transition: PowerTransition::OnToOff,
            ..
        }
    ));
    assert_eq!(rig.robot.call_count(ActuatorCall::SafePowerOff), 1);
    assert!(!rig.robot.pose().0);
}

// ─── Sit / stand ────────────────────────────────────────────────────

#[test]
fn denied_sit_stand_touches_nothing() {
    let config = ArbiterConfig::default();
    let rig = Rig::build(&config, SimulatedRobot::with_pose(true, true), ManualClock::new(), deny);

    // Blocking clock: a settle wait here would hang the test.
    let report = rig.orch.handle_sample(&Joy::enabled().sit_stand().sample()).unwrap();

    assert_eq!(
        report.outcome,
        DispatchOutcome::PostureDenied {
            reason: MOTION_DENIED_MESSAGE
        }
    );
    assert_eq!(report.settle, Duration::ZERO);
    assert_eq!(rig.robot.call_count(ActuatorCall::Sit), 0);
    assert_eq!(rig.robot.call_count(ActuatorCall::Stand), 0);
    assert_eq!(rig.robot.call_count(ActuatorCall::IsSitting), 0);
    assert!(!rig.orch.is_busy());
}

#[test]
fn sit_stand_alternates() {
    let rig = Rig::auto(GatePolicy::SharedPause, SimulatedRobot::with_pose(true, true));

    let first = rig.orch.handle_sample(&Joy::enabled().sit_stand().sample()).unwrap();
    rig.orch.handle_sample(&Joy::enabled().sample());
    let second = rig.orch.handle_sample(&Joy::enabled().sit_stand().sample()).unwrap();

    assert!(matches!(
        first.outcome,
        DispatchOutcome::Posture {
            transition: PostureTransition::SitToStand,
            ..
        }
    ));
    assert!(matches!(
        second.outcome,
        DispatchOutcome::Posture {
            transition: PostureTransition::StandToSit,
            ..
        }
    ));
    assert_eq!(rig.clock.elapsed(), Duration::from_secs(10));
    assert_eq!(rig.robot.pose(), (true, true));
}

#[test]
fn sit_stand_while_unpowered_reports_failure() {
    let rig = Rig::auto(GatePolicy::SharedPause, SimulatedRobot::new());
    let report = rig.orch.handle_sample(&Joy::enabled().sit_stand().sample()).unwrap();
    assert!(!report.outcome.succeeded());
    assert!(!rig.orch.is_busy());
}

// ─── Mode cycles ────────────────────────────────────────────────────

#[test]
fn three_entry_gait_list_wraps() {
    let mut config = ArbiterConfig::default();
    config.locomotion = vec![
        PresetEntry {
            value: LocomotionHint::Auto.raw(),
            label: "AUTO".into(),
        },
        PresetEntry {
            value: LocomotionHint::Trot.raw(),
            label: "TROT".into(),
        },
        PresetEntry {
            value: LocomotionHint::Crawl.raw(),
            label: "CRAWL".into(),
        },
    ];
    let rig = Rig::build(
        &config,
        SimulatedRobot::with_pose(true, false),
        ManualClock::auto_advancing(),
        allow,
    );

    let mut seen = Vec::new();
    for _ in 0..3 {
        assert_eq!(tap(&rig, Joy::enabled().gait()), Some(TriggerId::LocomotionCycle));
        seen.push(rig.robot.params().locomotion_hint);
    }

    assert_eq!(seen, [LocomotionHint::Trot, LocomotionHint::Crawl, LocomotionHint::Auto]);
    assert_eq!(rig.clock.elapsed(), Duration::from_millis(1500));
}

#[test]
fn gait_cycle_keeps_other_mobility_fields() {
    let rig = Rig::auto(GatePolicy::SharedPause, SimulatedRobot::with_pose(true, false));

    tap(&rig, Joy::enabled().stairs());
    tap(&rig, Joy::enabled().gait());

    let params = rig.robot.params();
    assert_eq!(params.stairs_mode, StairsMode::On);
    assert_eq!(params.locomotion_hint, LocomotionHint::Trot);
}

#[test]
fn failed_mobility_write_still_advances_cycle() {
    let rig = Rig::auto(GatePolicy::SharedPause, SimulatedRobot::with_pose(true, false));
    rig.robot.set_faults(FaultPlan {
        write_mobility: Some(ActuatorError::Communication("link down".into())),
        ..FaultPlan::default()
    });

    let report = rig.orch.handle_sample(&Joy::enabled().gait().sample()).unwrap();

    assert!(!report.outcome.succeeded());
    assert_eq!(rig.orch.locomotion_mode().label, "TROT");
    assert_eq!(rig.robot.params().locomotion_hint, LocomotionHint::Auto);
    assert_eq!(report.settle, Duration::from_millis(500));
    assert!(!rig.orch.is_busy());
}
