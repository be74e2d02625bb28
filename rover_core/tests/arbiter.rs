use rover_core::hazard::{self, Facing};
use rover_core::mocks::{ActuatorTap, RecordingActuator};
use rover_core::{
    Direction, MotionCommand, MotionCoordinator, PowerLevel, PowerMap, RampCfg, SafetyCfg,
    SharedHazards, build_coordinator,
};
use rover_traits::{DriveSignal, Polarity, Side};

const TABLE: [u8; 10] = [0, 15, 25, 35, 45, 55, 65, 75, 88, 100];

fn rig() -> (MotionCoordinator<RecordingActuator>, ActuatorTap, SharedHazards) {
    let (act, tap) = RecordingActuator::new();
    let hazards = hazard::shared();
    let ramp = RampCfg {
        increment: 5,
        min_step: 10,
        map: PowerMap::Table(TABLE),
    };
    let c = build_coordinator(act, hazards.clone(), ramp, SafetyCfg::default())
        .expect("valid config");
    (c, tap, hazards)
}

/// Left forward at power 5, ramped until the duty reads 40.
fn left_forward_at_40() -> (MotionCoordinator<RecordingActuator>, ActuatorTap, SharedHazards) {
    let (mut c, tap, hz) = rig();
    c.tick(Some(MotionCommand::forward(Side::Left, 5)));
    assert_eq!(c.side(Side::Left).transition_duty(), 10);
    for _ in 0..6 {
        c.tick(None);
    }
    assert_eq!(c.side(Side::Left).transition_duty(), 40);
    (c, tap, hz)
}

#[test]
fn onset_saves_and_zeroes_then_clear_restarts_from_min_step() {
    let (mut c, tap, hz) = left_forward_at_40();

    hz.set(Facing::Front, true);
    c.tick(None);
    let left = c.side(Side::Left);
    assert_eq!(left.transition_duty(), 0);
    assert_eq!(left.direction(), Direction::None);
    assert_eq!(left.saved_direction(), Direction::Forward);
    assert_eq!(left.saved_power(), PowerLevel::new(5));
    assert_eq!(tap.last(Side::Left), Some(DriveSignal::STOP));

    hz.set(Facing::Front, false);
    c.tick(None);
    let left = c.side(Side::Left);
    assert_eq!(left.direction(), Direction::Forward);
    assert_eq!(left.transition_duty(), 10, "restore restarts, it does not resume");
    assert_eq!(left.desired_duty(), 55);
    assert!(left.saved().is_none());

    c.tick(None);
    assert_eq!(c.side(Side::Left).transition_duty(), 15);
    assert_eq!(c.stats().suspensions, 1);
    assert_eq!(c.stats().restores, 1);
}

#[test]
fn stop_while_blocked_cancels_restore() {
    let (mut c, _tap, hz) = left_forward_at_40();

    hz.set(Facing::Front, true);
    c.tick(None);
    c.tick(Some(MotionCommand::stop(Side::Left)));
    assert!(c.side(Side::Left).saved().is_none());

    hz.set(Facing::Front, false);
    for _ in 0..3 {
        c.tick(None);
    }
    let left = c.side(Side::Left);
    assert_eq!(left.direction(), Direction::None);
    assert_eq!(left.transition_duty(), 0);
    assert_eq!(c.stats().cancelled_restores, 1);
    assert_eq!(c.stats().restores, 0);
}

#[test]
fn command_for_blocked_direction_overwrites_saved_slot() {
    let (mut c, tap, hz) = left_forward_at_40();
    hz.set(Facing::Front, true);
    c.tick(None);
    tap.clear();

    c.tick(Some(MotionCommand::forward(Side::Left, 8)));
    let left = c.side(Side::Left);
    assert_eq!(left.transition_duty(), 0);
    assert_eq!(left.saved_power(), PowerLevel::new(8));
    assert!(tap.writes().is_empty(), "held command must not actuate");

    hz.set(Facing::Front, false);
    c.tick(None);
    let left = c.side(Side::Left);
    assert_eq!(left.requested_power(), PowerLevel::new(8));
    assert_eq!(left.desired_duty(), 88);
    assert_eq!(left.transition_duty(), 10);
    assert_eq!(c.stats().held, 1);
}

#[test]
fn command_for_blocked_direction_on_idle_side_is_held() {
    let (mut c, _tap, hz) = rig();
    hz.set(Facing::Rear, true);
    c.tick(Some(MotionCommand::backward(Side::Right, 4)));
    let right = c.side(Side::Right);
    assert_eq!(right.direction(), Direction::None);
    assert_eq!(right.saved_direction(), Direction::Backward);

    hz.set(Facing::Rear, false);
    c.tick(None);
    assert_eq!(c.side(Side::Right).direction(), Direction::Backward);
}

#[test]
fn opposite_direction_is_unaffected() {
    let (mut c, tap, hz) = rig();
    hz.set(Facing::Front, true);
    c.tick(Some(MotionCommand::backward(Side::Left, 3)));
    let left = c.side(Side::Left);
    assert_eq!(left.direction(), Direction::Backward);
    assert_eq!(left.transition_duty(), 10);
    assert!(left.saved().is_none());
    assert_eq!(
        tap.last(Side::Left),
        Some(DriveSignal {
            polarity: Polarity::Backward,
            duty: 10
        })
    );
}

#[test]
fn both_sides_are_suspended_and_restored() {
    let (mut c, _tap, hz) = rig();
    c.tick(Some(MotionCommand::backward(Side::Left, 9)));
    c.tick(Some(MotionCommand::backward(Side::Right, 9)));
    hz.set(Facing::Rear, true);
    c.tick(None);
    for side in Side::BOTH {
        assert_eq!(c.side(side).transition_duty(), 0);
        assert_eq!(c.side(side).saved_direction(), Direction::Backward);
    }
    hz.set(Facing::Rear, false);
    c.tick(None);
    for side in Side::BOTH {
        assert_eq!(c.side(side).direction(), Direction::Backward);
        assert_eq!(c.side(side).transition_duty(), 10);
    }
    assert_eq!(c.stats().suspensions, 2);
    assert_eq!(c.stats().restores, 2);
}

#[test]
fn hazard_without_movers_changes_nothing() {
    let (mut c, tap, hz) = rig();
    c.tick(Some(MotionCommand::backward(Side::Left, 2)));
    tap.clear();
    hz.set(Facing::Front, true);
    c.tick(None);
    assert_eq!(c.side(Side::Left).direction(), Direction::Backward);
    assert!(c.side(Side::Left).saved().is_none());
    assert_eq!(c.stats().suspensions, 0);
}

#[test]
fn fresh_command_in_restore_tick_wins() {
    let (mut c, _tap, hz) = left_forward_at_40();
    hz.set(Facing::Front, true);
    c.tick(None);
    hz.set(Facing::Front, false);
    c.tick(Some(MotionCommand::forward(Side::Left, 2)));
    let left = c.side(Side::Left);
    assert_eq!(left.requested_power(), PowerLevel::new(2));
    assert_eq!(left.desired_duty(), 25);
    assert!(left.saved().is_none());
}

#[test]
fn standing_hazard_keeps_side_stopped_across_ticks() {
    let (mut c, _tap, hz) = left_forward_at_40();
    hz.set(Facing::Front, true);
    for _ in 0..5 {
        c.tick(None);
        assert_eq!(c.side(Side::Left).transition_duty(), 0);
        assert_eq!(c.side(Side::Left).saved_power(), PowerLevel::new(5));
    }
    assert_eq!(c.stats().suspensions, 1);
}
