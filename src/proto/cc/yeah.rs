//! YeAH-TCP
//!
//! 排队估计 Q = cwnd·(RTT-BaseRTT)/RTT 较小时走 Scalable 的“快速模式”，
//! Q 超过 alpha 或排队时延超过 BaseRTT/phy 时退回 Reno 的“慢速模式”，
//! 并主动把 cwnd 减去多余的排队量（precautionary decongestion）。

use super::{
    CongestionOps, RoundTracker, RttRound, TcpCb, reno_avoidance, slow_start,
};
use crate::sim::SimTime;

#[derive(Debug, Clone)]
pub struct Yeah {
    alpha: u64,
    gamma: u64,
    delta: u32,
    epsilon: u32,
    phy: u64,
    stcp_ai: u64,
    doing_reno_now: bool,
    last_q: u64,
    ack_cnt: u64,
    round: RoundTracker,
    rtts: RttRound,
}

impl Default for Yeah {
    fn default() -> Self {
        Self {
            alpha: 80,
            gamma: 1,
            delta: 3,
            epsilon: 1,
            phy: 8,
            stcp_ai: 50,
            doing_reno_now: false,
            last_q: 0,
            ack_cnt: 0,
            round: RoundTracker::default(),
            rtts: RttRound::default(),
        }
    }
}

impl Yeah {
    pub fn is_slow_mode(&self) -> bool {
        self.doing_reno_now
    }
}

impl CongestionOps for Yeah {
    fn name(&self) -> &'static str {
        "TcpYeah"
    }

    fn pkts_acked(&mut self, _tcb: &TcpCb, _segments_acked: u32, rtt: Option<SimTime>) {
        if let Some(r) = rtt {
            self.rtts.sample(r);
        }
    }

    fn increase_window(&mut self, tcb: &mut TcpCb, segments_acked: u32) {
        let mut segs = segments_acked;
        if tcb.in_slow_start() {
            segs = slow_start(tcb, segs);
        }
        if !tcb.in_slow_start() && segs > 0 {
            if self.doing_reno_now {
                reno_avoidance(tcb, segs);
            } else {
                let w = tcb.cwnd_segs().clamp(1, self.stcp_ai);
                self.ack_cnt += segs as u64;
                if self.ack_cnt >= w {
                    let delta = self.ack_cnt / w;
                    self.ack_cnt -= delta * w;
                    tcb.cwnd = tcb.cwnd.saturating_add(delta * tcb.mss());
                }
            }
        }

        if !self.round.round_done(tcb) {
            return;
        }
        if let (Some(base), Some(rtt)) = (self.rtts.base_rtt, self.rtts.min_rtt) {
            if self.rtts.cnt > 2 && rtt.0 > 0 {
                let seg_cwnd = tcb.cwnd_segs();
                let queue_ns = rtt.0.saturating_sub(base.0);
                let queue = (seg_cwnd as u128 * queue_ns as u128 / rtt.0 as u128) as u64;

                self.doing_reno_now =
                    queue > self.alpha || queue_ns.saturating_mul(self.phy) > base.0;
                if queue > self.alpha && !tcb.in_slow_start() {
                    let reduction = (queue / self.gamma).min(seg_cwnd >> self.epsilon);
                    let new_segs = seg_cwnd.saturating_sub(reduction).max(2);
                    tcb.cwnd = new_segs * tcb.mss();
                    tcb.ssthresh = tcb.cwnd;
                }
                self.last_q = queue;
            }
        }
        self.rtts.reset_round();
    }

    fn ssthresh(&mut self, tcb: &TcpCb, _bytes_in_flight: u64) -> u64 {
        let seg_cwnd = tcb.cwnd_segs();
        let half = (seg_cwnd >> 1).max(2);
        let reduction = if self.doing_reno_now {
            half
        } else {
            self.last_q.max(seg_cwnd >> self.delta).min(half)
        };
        seg_cwnd.saturating_sub(reduction).max(2) * tcb.mss()
    }
}
