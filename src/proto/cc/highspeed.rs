//! HighSpeed TCP（RFC 3649）
//!
//! 窗口超过 38 段后，增量 a(w) 变大、回退因子 b(w) 从 0.5 平滑降到 0.1（w = 83000 段）。

use super::{CongestionOps, TcpCb, grow_fractional, slow_start};

const LOW_WINDOW: f64 = 38.0;
const HIGH_WINDOW: f64 = 83_000.0;
const HIGH_DECREASE: f64 = 0.1;

#[derive(Debug, Default, Clone)]
pub struct HighSpeed {
    frac: f64,
}

impl HighSpeed {
    /// 回退因子 b(w)
    pub fn decrease(w: f64) -> f64 {
        if w <= LOW_WINDOW {
            return 0.5;
        }
        let w = w.min(HIGH_WINDOW);
        (HIGH_DECREASE - 0.5) * (w.ln() - LOW_WINDOW.ln()) / (HIGH_WINDOW.ln() - LOW_WINDOW.ln())
            + 0.5
    }

    /// 每 RTT 的增量 a(w)（段）
    pub fn increase(w: f64) -> f64 {
        if w <= LOW_WINDOW {
            return 1.0;
        }
        let b = Self::decrease(w);
        let p = 0.078 / w.powf(1.2);
        (w * w * p * 2.0 * b / (2.0 - b)).max(1.0)
    }
}

impl CongestionOps for HighSpeed {
    fn name(&self) -> &'static str {
        "TcpHighSpeed"
    }

    fn increase_window(&mut self, tcb: &mut TcpCb, segments_acked: u32) {
        let mut segs = segments_acked;
        if tcb.in_slow_start() {
            segs = slow_start(tcb, segs);
        }
        let mss = tcb.mss() as f64;
        for _ in 0..segs {
            let a = Self::increase(tcb.cwnd_segs() as f64);
            grow_fractional(tcb, &mut self.frac, a * mss * mss / tcb.cwnd.max(1) as f64);
        }
    }

    fn ssthresh(&mut self, tcb: &TcpCb, _bytes_in_flight: u64) -> u64 {
        let b = Self::decrease(tcb.cwnd_segs() as f64);
        (((1.0 - b) * tcb.cwnd as f64) as u64).max(2 * tcb.mss())
    }
}
