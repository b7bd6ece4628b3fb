use crate::sim::SimTime;

#[test]
fn sim_time_unit_conversions() {
    assert_eq!(SimTime::from_micros(1), SimTime(1_000));
    assert_eq!(SimTime::from_millis(10), SimTime(10_000_000));
    assert_eq!(SimTime::from_secs(60), SimTime(60_000_000_000));
}

#[test]
fn sim_time_unit_conversions_saturate_on_overflow() {
    assert_eq!(SimTime::from_micros(u64::MAX), SimTime::MAX);
    assert_eq!(SimTime::from_millis(u64::MAX), SimTime::MAX);
    assert_eq!(SimTime::from_secs(u64::MAX), SimTime::MAX);
}

#[test]
fn sim_time_float_seconds() {
    assert_eq!(SimTime::from_secs_f64(1.5), SimTime::from_millis(1_500));
    assert_eq!(SimTime::from_secs_f64(-1.0), SimTime::ZERO);
    assert_eq!(SimTime::from_secs_f64(f64::NAN), SimTime::ZERO);
    assert_eq!(SimTime::from_secs_f64(1e30), SimTime::MAX);
    assert_eq!(SimTime::from_secs(60).as_secs_f64(), 60.0);
}

#[test]
fn sim_time_serializes_as_nanoseconds() {
    let json = serde_json::to_string(&SimTime::from_millis(20)).expect("serialize");
    assert_eq!(json, "20000000");
    let back: SimTime = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, SimTime::from_millis(20));
}
