//! TCP Vegas
//!
//! 每个 RTT 比较期望吞吐（cwnd/BaseRTT）与实际吞吐（cwnd/RTT），差值
//! diff = cwnd·(RTT-BaseRTT)/RTT（段）。diff < alpha 增 1 段，diff > beta 减 1 段；
//! 慢启动中 diff > gamma 时退出慢启动。

use super::{CongestionOps, RoundTracker, RttRound, TcpCb, reno_avoidance, slow_start};
use crate::sim::SimTime;

#[derive(Debug, Clone)]
pub struct Vegas {
    alpha: u64,
    beta: u64,
    gamma: u64,
    round: RoundTracker,
    rtts: RttRound,
}

impl Default for Vegas {
    fn default() -> Self {
        Self {
            alpha: 2,
            beta: 4,
            gamma: 1,
            round: RoundTracker::default(),
            rtts: RttRound::default(),
        }
    }
}

impl Vegas {
    fn vegas_ssthresh(tcb: &TcpCb) -> u64 {
        tcb.ssthresh
            .min(tcb.cwnd.saturating_sub(tcb.mss()))
            .max(2 * tcb.mss())
    }
}

impl CongestionOps for Vegas {
    fn name(&self) -> &'static str {
        "TcpVegas"
    }

    fn pkts_acked(&mut self, _tcb: &TcpCb, _segments_acked: u32, rtt: Option<SimTime>) {
        if let Some(r) = rtt {
            self.rtts.sample(r);
        }
    }

    fn increase_window(&mut self, tcb: &mut TcpCb, segments_acked: u32) {
        if !self.round.round_done(tcb) {
            if tcb.in_slow_start() {
                slow_start(tcb, segments_acked);
            }
            return;
        }

        match (self.rtts.base_rtt, self.rtts.min_rtt) {
            (Some(base), Some(rtt)) if self.rtts.cnt > 2 && rtt.0 > 0 => {
                let mss = tcb.mss();
                let segs = tcb.cwnd_segs();
                let target = (segs as u128 * base.0 as u128 / rtt.0 as u128) as u64;
                let diff = segs.saturating_sub(target);

                if diff > self.gamma && tcb.in_slow_start() {
                    tcb.cwnd = tcb.cwnd.min((target + 1) * mss);
                    tcb.ssthresh = Self::vegas_ssthresh(tcb);
                } else if tcb.in_slow_start() {
                    slow_start(tcb, segments_acked);
                } else if diff > self.beta {
                    tcb.cwnd = tcb.cwnd.saturating_sub(mss).max(2 * mss);
                    tcb.ssthresh = Self::vegas_ssthresh(tcb);
                } else if diff < self.alpha {
                    tcb.cwnd = tcb.cwnd.saturating_add(mss);
                }
                tcb.ssthresh = tcb.ssthresh.max(tcb.cwnd / 4 * 3);
            }
            _ => {
                // 样本不足：按 Reno 处理
                let left = if tcb.in_slow_start() {
                    slow_start(tcb, segments_acked)
                } else {
                    segments_acked
                };
                if !tcb.in_slow_start() {
                    reno_avoidance(tcb, left);
                }
            }
        }
        self.rtts.reset_round();
    }

    fn ssthresh(&mut self, tcb: &TcpCb, _bytes_in_flight: u64) -> u64 {
        Self::vegas_ssthresh(tcb)
    }
}
