use rover_core::hazard::{Facing, HazardMonitor};
use rstest::rstest;

fn ok(cm: f32) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
    Ok(cm)
}

fn timeout() -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
    Err(Box::new(std::io::Error::other("echo timeout")))
}

#[rstest]
#[case(5.0, true)]
#[case(20.0, true)]
#[case(20.01, false)]
#[case(350.0, false)]
#[case(0.0, true)]
fn threshold_is_inclusive(#[case] cm: f32, #[case] blocked: bool) {
    let mut m = HazardMonitor::new(Facing::Front, 20.0);
    assert_eq!(m.observe(ok(cm)), blocked);
}

#[rstest]
#[case(true)]
#[case(false)]
fn read_failure_holds_previous_flag(#[case] start_blocked: bool) {
    let mut m = HazardMonitor::new(Facing::Rear, 20.0);
    m.observe(ok(if start_blocked { 10.0 } else { 100.0 }));
    assert_eq!(m.observe(timeout()), start_blocked);
    assert_eq!(m.blocked(), start_blocked);
}

#[rstest]
#[case(-1.0)]
#[case(f32::NAN)]
#[case(f32::INFINITY)]
fn invalid_sample_holds_previous_flag(#[case] cm: f32) {
    let mut m = HazardMonitor::new(Facing::Front, 20.0);
    m.observe(ok(3.0));
    assert!(m.observe(ok(cm)));
    m.observe(ok(80.0));
    assert!(!m.observe(ok(cm)));
}
