//! TCP Veno
//!
//! 用 Vegas 的积压估计 N 区分拥塞丢包与随机丢包：N < beta 时按 Reno 增长、
//! 丢包只退到 4/5；N ≥ beta 时每两个 RTT 才增长一次、丢包减半。

use super::{CongestionOps, RoundTracker, RttRound, TcpCb, reno_avoidance, slow_start};
use crate::sim::SimTime;

#[derive(Debug, Clone)]
pub struct Veno {
    beta: u64,
    diff: u64,
    inc: bool,
    round: RoundTracker,
    rtts: RttRound,
}

impl Default for Veno {
    fn default() -> Self {
        Self {
            beta: 3,
            diff: 0,
            inc: true,
            round: RoundTracker::default(),
            rtts: RttRound::default(),
        }
    }
}

impl Veno {
    /// 最近一次估计的积压段数
    pub fn backlog(&self) -> u64 {
        self.diff
    }
}

impl CongestionOps for Veno {
    fn name(&self) -> &'static str {
        "TcpVeno"
    }

    fn pkts_acked(&mut self, _tcb: &TcpCb, _segments_acked: u32, rtt: Option<SimTime>) {
        if let Some(r) = rtt {
            self.rtts.sample(r);
        }
    }

    fn increase_window(&mut self, tcb: &mut TcpCb, segments_acked: u32) {
        if let (Some(base), Some(rtt)) = (self.rtts.base_rtt, self.rtts.min_rtt) {
            if self.rtts.cnt > 2 && rtt.0 > 0 {
                let segs = tcb.cwnd_segs();
                let target = (segs as u128 * base.0 as u128 / rtt.0 as u128) as u64;
                self.diff = segs.saturating_sub(target);
            }
        }

        let mut segs = segments_acked;
        if tcb.in_slow_start() {
            segs = slow_start(tcb, segs);
        }
        if !tcb.in_slow_start() && segs > 0 {
            if self.diff < self.beta {
                reno_avoidance(tcb, segs);
            } else if self.inc {
                reno_avoidance(tcb, segs);
                self.inc = false;
            } else {
                self.inc = true;
            }
        }

        if self.round.round_done(tcb) {
            self.rtts.reset_round();
        }
    }

    fn ssthresh(&mut self, tcb: &TcpCb, bytes_in_flight: u64) -> u64 {
        let mss = tcb.mss();
        if self.diff < self.beta {
            (bytes_in_flight * 4 / 5).max(2 * mss)
        } else {
            (bytes_in_flight / 2).max(2 * mss)
        }
    }
}
