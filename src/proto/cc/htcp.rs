//! H-TCP
//!
//! 增量 alpha 随距上次拥塞的时间 Δ 增长：Δ ≤ 1s 时为 1，之后为
//! 1 + 10(Δ-1) + ((Δ-1)/2)²，再乘 2(1-beta)。回退因子 beta = minRTT/maxRTT，
//! 限制在 [0.5, 0.8]。

use super::{CongestionOps, TcpCb, grow_fractional, slow_start};
use crate::sim::SimTime;

#[derive(Debug, Clone)]
pub struct Htcp {
    delta_l: SimTime,
    last_con: SimTime,
    min_rtt: Option<SimTime>,
    max_rtt: Option<SimTime>,
    alpha: f64,
    beta: f64,
    frac: f64,
}

impl Default for Htcp {
    fn default() -> Self {
        Self {
            delta_l: SimTime::from_secs(1),
            last_con: SimTime::ZERO,
            min_rtt: None,
            max_rtt: None,
            alpha: 1.0,
            beta: 0.5,
            frac: 0.0,
        }
    }
}

impl Htcp {
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    fn update_alpha(&mut self, now: SimTime) {
        let since = now.saturating_sub(self.last_con);
        let mut alpha = 1.0;
        if since > self.delta_l {
            let d = since.saturating_sub(self.delta_l).as_secs_f64();
            alpha = 1.0 + 10.0 * d + (d / 2.0) * (d / 2.0);
        }
        self.alpha = (2.0 * (1.0 - self.beta) * alpha).max(1.0);
    }

    fn update_beta(&mut self) {
        self.beta = match (self.min_rtt, self.max_rtt) {
            (Some(min), Some(max)) if max.0 > 0 => (min.0 as f64 / max.0 as f64).clamp(0.5, 0.8),
            _ => 0.5,
        };
    }
}

impl CongestionOps for Htcp {
    fn name(&self) -> &'static str {
        "TcpHtcp"
    }

    fn pkts_acked(&mut self, tcb: &TcpCb, _segments_acked: u32, rtt: Option<SimTime>) {
        if let Some(r) = rtt {
            self.min_rtt = Some(self.min_rtt.map_or(r, |m| m.min(r)));
            self.max_rtt = Some(self.max_rtt.map_or(r, |m| m.max(r)));
        }
        self.update_alpha(tcb.now);
    }

    fn increase_window(&mut self, tcb: &mut TcpCb, segments_acked: u32) {
        let mut segs = segments_acked;
        if tcb.in_slow_start() {
            segs = slow_start(tcb, segs);
        }
        let mss = tcb.mss() as f64;
        for _ in 0..segs {
            grow_fractional(tcb, &mut self.frac, self.alpha * mss * mss / tcb.cwnd.max(1) as f64);
        }
    }

    fn ssthresh(&mut self, tcb: &TcpCb, _bytes_in_flight: u64) -> u64 {
        self.update_beta();
        self.last_con = tcb.now;
        ((self.beta * tcb.cwnd as f64) as u64).max(2 * tcb.mss())
    }
}
