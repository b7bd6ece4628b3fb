//! TCP Illinois
//!
//! 以平均排队时延 da 相对最大排队时延 dm 的位置调节增量 alpha ∈ [0.3, 10]
//! 与回退因子 beta ∈ [0.125, 0.5]：排队越少增长越快、回退越轻。

use super::{CongestionEvent, CongestionOps, RoundTracker, RttRound, TcpCb, slow_start};
use crate::sim::SimTime;

const ALPHA_MIN: f64 = 0.3;
const ALPHA_MAX: f64 = 10.0;
const ALPHA_BASE: f64 = 1.0;
const BETA_MIN: f64 = 0.125;
const BETA_MAX: f64 = 0.5;
const BETA_BASE: f64 = 0.5;
const WIN_THRESH: u64 = 15;
const THETA: u32 = 5;

#[derive(Debug, Clone)]
pub struct Illinois {
    alpha: f64,
    beta: f64,
    max_rtt: Option<SimTime>,
    rtt_low: u32,
    ack_cnt: f64,
    round: RoundTracker,
    rtts: RttRound,
}

impl Default for Illinois {
    fn default() -> Self {
        Self {
            alpha: ALPHA_MAX,
            beta: BETA_BASE,
            max_rtt: None,
            rtt_low: 0,
            ack_cnt: 0.0,
            round: RoundTracker::default(),
            rtts: RttRound::default(),
        }
    }
}

impl Illinois {
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    fn update_params(&mut self, tcb: &TcpCb) {
        if tcb.cwnd_segs() < WIN_THRESH {
            self.alpha = ALPHA_BASE;
            self.beta = BETA_BASE;
            return;
        }
        let (Some(base), Some(max), Some(avg)) =
            (self.rtts.base_rtt, self.max_rtt, self.rtts.avg_rtt())
        else {
            return;
        };
        let dm = max.saturating_sub(base).0 as f64;
        let da = avg.saturating_sub(base).0 as f64;
        if dm <= 0.0 {
            self.alpha = ALPHA_MAX;
            self.beta = BETA_MIN;
            return;
        }

        let d1 = dm / 100.0;
        if da <= d1 {
            self.rtt_low += 1;
            if self.rtt_low > THETA {
                self.alpha = ALPHA_MAX;
            }
        } else {
            self.rtt_low = 0;
            let k1 = (dm - d1) * ALPHA_MIN * ALPHA_MAX / (ALPHA_MAX - ALPHA_MIN);
            let k2 = (dm - d1) * ALPHA_MIN / (ALPHA_MAX - ALPHA_MIN) - d1;
            self.alpha = (k1 / (k2 + da)).clamp(ALPHA_MIN, ALPHA_MAX);
        }

        let d2 = dm / 10.0;
        let d3 = dm * 8.0 / 10.0;
        self.beta = if da <= d2 {
            BETA_MIN
        } else if da >= d3 {
            BETA_MAX
        } else {
            let k3 = (BETA_MAX - BETA_MIN) / (d3 - d2);
            let k4 = (BETA_MIN * d3 - BETA_MAX * d2) / (d3 - d2);
            (k3 * da + k4).clamp(BETA_MIN, BETA_MAX)
        };
    }
}

impl CongestionOps for Illinois {
    fn name(&self) -> &'static str {
        "TcpIllinois"
    }

    fn pkts_acked(&mut self, _tcb: &TcpCb, _segments_acked: u32, rtt: Option<SimTime>) {
        if let Some(r) = rtt {
            self.rtts.sample(r);
            self.max_rtt = Some(self.max_rtt.map_or(r, |m| m.max(r)));
        }
    }

    fn increase_window(&mut self, tcb: &mut TcpCb, segments_acked: u32) {
        if self.round.round_done(tcb) {
            self.update_params(tcb);
            self.rtts.reset_round();
        }

        let mut segs = segments_acked;
        if tcb.in_slow_start() {
            segs = slow_start(tcb, segs);
        }
        if segs == 0 {
            return;
        }
        let seg_cwnd = tcb.cwnd_segs().max(1) as f64;
        self.ack_cnt += segs as f64 * self.alpha;
        if self.ack_cnt >= seg_cwnd {
            let delta = (self.ack_cnt / seg_cwnd).floor();
            self.ack_cnt -= delta * seg_cwnd;
            tcb.cwnd = tcb.cwnd.saturating_add(delta as u64 * tcb.mss());
        }
    }

    fn ssthresh(&mut self, tcb: &TcpCb, _bytes_in_flight: u64) -> u64 {
        (((1.0 - self.beta) * tcb.cwnd as f64) as u64).max(2 * tcb.mss())
    }

    fn on_event(&mut self, _tcb: &TcpCb, ev: CongestionEvent) {
        if ev == CongestionEvent::Timeout {
            self.alpha = ALPHA_BASE;
            self.beta = BETA_BASE;
            self.rtt_low = 0;
        }
    }
}
