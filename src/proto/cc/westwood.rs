//! TCP Westwood
//!
//! 用 ACK 速率估计可用带宽（Tustin 低通滤波，系数 0.9），丢包时把 ssthresh
//! 设为 BWE × RTTmin，而不是盲目减半。窗口增长同 NewReno。

use super::{CongestionOps, TcpCb, reno_avoidance, slow_start};
use crate::sim::SimTime;

#[derive(Debug, Clone, Default)]
pub struct Westwood {
    /// 估计带宽（字节/秒）
    bw_est: f64,
    last_sample: f64,
    acked_bytes: u64,
    last_ack_at: Option<SimTime>,
}

impl Westwood {
    pub fn bandwidth_estimate(&self) -> f64 {
        self.bw_est
    }

    fn estimate(&mut self, now: SimTime) {
        let Some(last) = self.last_ack_at else {
            self.last_ack_at = Some(now);
            self.acked_bytes = 0;
            return;
        };
        let dt = now.saturating_sub(last).as_secs_f64();
        if dt <= 0.0 {
            return;
        }
        let sample = self.acked_bytes as f64 / dt;
        self.bw_est = 0.9 * self.bw_est + 0.05 * (sample + self.last_sample);
        self.last_sample = sample;
        self.acked_bytes = 0;
        self.last_ack_at = Some(now);
    }
}

impl CongestionOps for Westwood {
    fn name(&self) -> &'static str {
        "TcpWestwood"
    }

    fn pkts_acked(&mut self, tcb: &TcpCb, segments_acked: u32, _rtt: Option<SimTime>) {
        self.acked_bytes += segments_acked as u64 * tcb.mss();
        self.estimate(tcb.now);
    }

    fn increase_window(&mut self, tcb: &mut TcpCb, segments_acked: u32) {
        let mut segs = segments_acked;
        if tcb.in_slow_start() {
            segs = slow_start(tcb, segs);
        }
        if !tcb.in_slow_start() {
            reno_avoidance(tcb, segs);
        }
    }

    fn ssthresh(&mut self, tcb: &TcpCb, _bytes_in_flight: u64) -> u64 {
        let min_rtt = tcb.min_rtt.map_or(0.0, SimTime::as_secs_f64);
        ((self.bw_est * min_rtt) as u64).max(2 * tcb.mss())
    }
}
