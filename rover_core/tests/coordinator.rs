use rover_core::hazard;
use rover_core::mocks::{ActuatorTap, RecordingActuator};
use rover_core::{
    Direction, MotionCommand, MotionCoordinator, PowerMap, RampCfg, SafetyCfg, TickStatus,
    build_coordinator,
};
use rover_traits::{DriveSignal, Polarity, Side};
use rstest::rstest;

fn rig(map: PowerMap) -> (MotionCoordinator<RecordingActuator>, ActuatorTap) {
    let (act, tap) = RecordingActuator::new();
    let ramp = RampCfg {
        increment: 5,
        min_step: 10,
        map,
    };
    let c = build_coordinator(act, hazard::shared(), ramp, SafetyCfg::default())
        .expect("valid config");
    (c, tap)
}

fn duties(tap: &ActuatorTap, side: Side) -> Vec<u8> {
    tap.writes_for(side).iter().map(|s| s.duty).collect()
}

#[test]
fn ramp_is_monotonic_and_capped() {
    let (mut c, tap) = rig(PowerMap::Quadratic);
    c.tick(Some(MotionCommand::forward(Side::Left, 5)));
    for _ in 0..20 {
        c.tick(None);
    }
    let d = duties(&tap, Side::Left);
    assert_eq!(d.first(), Some(&10));
    assert!(d.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(d.last(), Some(&31));
    assert!(d.iter().all(|&x| x <= 31));
}

#[test]
fn writes_only_on_change() {
    let (mut c, tap) = rig(PowerMap::Quadratic);
    c.tick(Some(MotionCommand::forward(Side::Right, 3)));
    for _ in 0..10 {
        c.tick(None);
    }
    // 10 is the start step but level 3 maps to 11: one write for 10, one for 11.
    assert_eq!(duties(&tap, Side::Right), vec![10, 11]);
    // Left never moved; only its initial stop was written.
    assert_eq!(tap.writes_for(Side::Left), vec![DriveSignal::STOP]);
}

#[test]
fn direction_change_resets_to_min_step() {
    let (mut c, _tap) = rig(PowerMap::Quadratic);
    c.tick(Some(MotionCommand::forward(Side::Left, 9)));
    for _ in 0..30 {
        c.tick(None);
    }
    assert_eq!(c.side(Side::Left).transition_duty(), 100);
    c.tick(Some(MotionCommand::backward(Side::Left, 9)));
    assert_eq!(c.side(Side::Left).direction(), Direction::Backward);
    assert_eq!(c.side(Side::Left).transition_duty(), 10);
}

#[test]
fn repeated_drive_does_not_double_advance() {
    let (mut once, p1) = rig(PowerMap::Quadratic);
    let (mut twice, p2) = rig(PowerMap::Quadratic);
    once.tick(Some(MotionCommand::forward(Side::Left, 5)));
    twice.tick(Some(MotionCommand::forward(Side::Left, 5)));
    for i in 0..8 {
        once.tick(None);
        let cmd = (i == 2).then(|| MotionCommand::forward(Side::Left, 5));
        twice.tick(cmd);
    }
    assert_eq!(duties(&p1, Side::Left), duties(&p2, Side::Left));
}

#[test]
fn repeated_stop_is_idempotent() {
    let (mut c, _tap) = rig(PowerMap::Quadratic);
    c.tick(Some(MotionCommand::forward(Side::Left, 5)));
    c.tick(Some(MotionCommand::stop(Side::Left)));
    let after_one = *c.side(Side::Left).state();
    c.tick(Some(MotionCommand::stop(Side::Left)));
    assert_eq!(*c.side(Side::Left).state(), after_one);
}

#[rstest]
#[case(2)]
#[case(3)]
#[case(5)]
#[case(9)]
fn fairness_converges_by_the_late_side_start(#[case] late_tick: usize) {
    let (mut c, _tap) = rig(PowerMap::Quadratic);
    c.tick(Some(MotionCommand::forward(Side::Left, 7)));
    for _ in 1..late_tick {
        c.tick(None);
    }
    c.tick(Some(MotionCommand::forward(Side::Right, 7)));
    assert_eq!(
        c.side(Side::Left).transition_duty(),
        c.side(Side::Right).transition_duty()
    );
    for _ in 0..20 {
        c.tick(None);
        assert_eq!(
            c.side(Side::Left).transition_duty(),
            c.side(Side::Right).transition_duty()
        );
    }
}

#[test]
fn retarget_higher_power_continues_from_current_duty() {
    let (mut c, _tap) = rig(PowerMap::Quadratic);
    c.tick(Some(MotionCommand::forward(Side::Left, 5)));
    for _ in 0..3 {
        c.tick(None);
    }
    assert_eq!(c.side(Side::Left).transition_duty(), 25);
    c.tick(Some(MotionCommand::forward(Side::Left, 9)));
    // advanced to 30 first, then retargeted without a restart
    assert_eq!(c.side(Side::Left).transition_duty(), 30);
    c.tick(None);
    assert_eq!(c.side(Side::Left).transition_duty(), 35);
}

#[test]
fn failing_actuator_trips_fail_safe_after_three_ticks() {
    let (mut c, tap) = rig(PowerMap::Quadratic);
    c.tick(Some(MotionCommand::forward(Side::Left, 9)));
    tap.set_failing(true);
    assert!(matches!(c.tick(None), TickStatus::Running));
    assert!(matches!(c.tick(None), TickStatus::Running));
    let status = c.tick(None);
    assert!(status.is_fail_safe());
    let left = c.side(Side::Left);
    assert_eq!(left.direction(), Direction::None);
    assert!(left.saved().is_none());
    assert_eq!(c.stats().fail_safe_trips, 1);
    assert_eq!(c.stats().actuator_failures, 3);
}

#[test]
fn failed_write_is_retried_next_tick() {
    let (mut c, tap) = rig(PowerMap::Quadratic);
    c.tick(None);
    tap.set_failing(true);
    c.tick(Some(MotionCommand::backward(Side::Right, 9)));
    tap.set_failing(false);
    c.tick(None);
    assert_eq!(
        tap.last(Side::Right),
        Some(DriveSignal {
            polarity: Polarity::Backward,
            duty: 15
        })
    );
}

#[test]
fn shutdown_stops_and_releases() {
    let (mut c, tap) = rig(PowerMap::Quadratic);
    c.tick(Some(MotionCommand::forward(Side::Left, 9)));
    c.tick(Some(MotionCommand::backward(Side::Right, 9)));
    c.shutdown().expect("shutdown");
    assert_eq!(tap.last(Side::Left), Some(DriveSignal::STOP));
    assert_eq!(tap.last(Side::Right), Some(DriveSignal::STOP));
    assert!(tap.released());
}

#[test]
fn shutdown_reports_failed_final_write() {
    let (mut c, tap) = rig(PowerMap::Quadratic);
    c.tick(Some(MotionCommand::forward(Side::Left, 9)));
    tap.set_failing(true);
    assert!(c.shutdown().is_err());
    assert!(tap.released(), "release is attempted even after a failed write");
}
