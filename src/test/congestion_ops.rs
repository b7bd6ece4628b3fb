use crate::proto::cc::{
    Bic, CongestionOps, HighSpeed, Hybla, NewReno, Scalable, TcpCb, TcpVariant, Westwood,
};
use crate::sim::SimTime;

const MSS: u32 = 536;

fn tcb(cwnd_segs: u64, ssthresh_segs: u64) -> TcpCb {
    TcpCb::new(MSS, cwnd_segs * MSS as u64, ssthresh_segs.saturating_mul(MSS as u64))
}

#[test]
fn new_reno_slow_start_adds_one_segment_per_ack() {
    let mut cc = NewReno;
    let mut t = tcb(10, u64::MAX);
    cc.increase_window(&mut t, 3);
    assert_eq!(t.cwnd, 13 * MSS as u64);
}

#[test]
fn new_reno_avoidance_grows_by_mss_squared_over_cwnd() {
    let mut cc = NewReno;
    let mut t = tcb(20, 20);
    assert!(!t.in_slow_start());
    cc.increase_window(&mut t, 1);
    assert_eq!(t.cwnd, 20 * 536 + (536 * 536) / (20 * 536));
}

#[test]
fn new_reno_avoidance_counts_every_segment_of_a_cumulative_ack() {
    let mut one_by_one = tcb(20, 20);
    for _ in 0..10 {
        NewReno.increase_window(&mut one_by_one, 1);
    }
    let mut cumulative = tcb(20, 20);
    NewReno.increase_window(&mut cumulative, 10);

    assert_eq!(cumulative.cwnd, one_by_one.cwnd);
    // 十个段合计接近半个 MSS
    let grown = cumulative.cwnd - 20 * MSS as u64;
    assert!(grown > 5 * 26 && grown <= 10 * 26, "grown = {grown}");
}

#[test]
fn new_reno_halves_in_flight_with_two_segment_floor() {
    let mut cc = NewReno;
    let t = tcb(40, u64::MAX);
    assert_eq!(cc.ssthresh(&t, 40 * 536), 20 * 536);
    assert_eq!(cc.ssthresh(&t, 536), 2 * 536);
}

#[test]
fn hybla_scales_slow_start_by_rtt_ratio() {
    let mut cc = Hybla::default();
    let mut t = tcb(10, u64::MAX);
    t.min_rtt = Some(SimTime::from_millis(100));
    cc.pkts_acked(&t, 1, Some(SimTime::from_millis(100)));
    assert_eq!(cc.rho(), 4.0);

    cc.increase_window(&mut t, 1);
    // (2^4 - 1) 个 MSS
    assert_eq!(t.cwnd, 10 * 536 + 15 * 536);
}

#[test]
fn hybla_rho_never_drops_below_one() {
    let mut cc = Hybla::default();
    let mut t = tcb(10, u64::MAX);
    t.min_rtt = Some(SimTime::from_millis(5));
    cc.pkts_acked(&t, 1, Some(SimTime::from_millis(5)));
    assert_eq!(cc.rho(), 1.0);
}

#[test]
fn highspeed_response_function_endpoints() {
    assert_eq!(HighSpeed::decrease(10.0), 0.5);
    assert_eq!(HighSpeed::increase(38.0), 1.0);
    assert!((HighSpeed::decrease(83_000.0) - 0.1).abs() < 1e-9);
    assert!(HighSpeed::increase(1_000.0) > 1.0);
    assert!(HighSpeed::decrease(1_000.0) < 0.5);
}

#[test]
fn scalable_backs_off_by_one_eighth() {
    let mut cc = Scalable::default();
    let t = tcb(100, 50);
    assert_eq!(cc.ssthresh(&t, 100 * 536), 87 * 536);
}

#[test]
fn bic_remembers_window_at_loss() {
    let mut cc = Bic::default();
    let t = tcb(100, 50);
    assert_eq!(cc.ssthresh(&t, 100 * 536), 80 * 536);
    assert_eq!(cc.last_max_cwnd(), 100);

    // 再次在更小的窗口丢包：fast convergence 让 last_max 低于当前窗口
    let t = tcb(50, 40);
    cc.ssthresh(&t, 50 * 536);
    assert_eq!(cc.last_max_cwnd(), 40);
}

#[test]
fn westwood_without_bandwidth_estimate_falls_back_to_two_segments() {
    let mut cc = Westwood::default();
    let t = tcb(40, u64::MAX);
    assert_eq!(cc.bandwidth_estimate(), 0.0);
    assert_eq!(cc.ssthresh(&t, 40 * 536), 2 * 536);
}

#[test]
fn every_variant_reports_its_name_and_keeps_sane_windows() {
    for v in TcpVariant::ALL {
        let mut cc = v.build();
        assert_eq!(cc.name(), v.as_str());

        let mut t = tcb(10, u64::MAX);
        t.now = SimTime::from_secs(3);
        t.snd_nxt = 10 * MSS as u64;
        t.snd_una = MSS as u64;
        let rtt = SimTime::from_millis(80);
        t.last_rtt = Some(rtt);
        t.min_rtt = Some(rtt);
        cc.pkts_acked(&t, 1, Some(rtt));
        cc.increase_window(&mut t, 1);
        assert!(t.cwnd >= MSS as u64, "{v}: cwnd collapsed");

        let ss = cc.ssthresh(&t, t.bytes_in_flight());
        assert!(ss >= 2 * MSS as u64, "{v}: ssthresh {ss} below two segments");
    }
}
