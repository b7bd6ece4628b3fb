//! TCP Hybla
//!
//! 按 rho = RTT / RTT0 放大增长速度，让长 RTT 的流与参考 RTT（25ms）的流增长一样快：
//! 慢启动每段 +(2^rho - 1)·MSS，拥塞避免每段 +rho²·MSS²/cwnd。

use super::{CongestionOps, TcpCb, grow_fractional, reno_ssthresh};
use crate::sim::SimTime;

#[derive(Debug, Clone)]
pub struct Hybla {
    rrtt: SimTime,
    rho: f64,
    frac: f64,
}

impl Default for Hybla {
    fn default() -> Self {
        Self {
            rrtt: SimTime::from_millis(25),
            rho: 1.0,
            frac: 0.0,
        }
    }
}

impl Hybla {
    pub fn rho(&self) -> f64 {
        self.rho
    }

    fn recalc_rho(&mut self, tcb: &TcpCb) {
        if let Some(min_rtt) = tcb.min_rtt {
            self.rho = (min_rtt.0 as f64 / self.rrtt.0 as f64).max(1.0);
        }
    }
}

impl CongestionOps for Hybla {
    fn name(&self) -> &'static str {
        "TcpHybla"
    }

    fn pkts_acked(&mut self, tcb: &TcpCb, _segments_acked: u32, rtt: Option<SimTime>) {
        if rtt.is_some() {
            self.recalc_rho(tcb);
        }
    }

    fn increase_window(&mut self, tcb: &mut TcpCb, segments_acked: u32) {
        let mss = tcb.mss() as f64;
        for _ in 0..segments_acked {
            let inc = if tcb.in_slow_start() {
                (2f64.powf(self.rho) - 1.0) * mss
            } else {
                self.rho * self.rho * mss * mss / tcb.cwnd.max(1) as f64
            };
            grow_fractional(tcb, &mut self.frac, inc);
        }
    }

    fn ssthresh(&mut self, tcb: &TcpCb, bytes_in_flight: u64) -> u64 {
        reno_ssthresh(tcb, bytes_in_flight)
    }
}
