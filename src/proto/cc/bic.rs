//! BIC TCP
//!
//! 在上次丢包窗口 last_max 与当前窗口之间做二分搜索；离目标远时每 RTT 最多增长
//! max_incr 段，越过 last_max 后先缓慢探测再线性加速。

use super::{CongestionOps, TcpCb, slow_start};

#[derive(Debug, Clone)]
pub struct Bic {
    fast_convergence: bool,
    beta: f64,
    max_incr: u64,
    low_wnd: u64,
    smooth_part: u64,
    b: u64,
    last_max_cwnd: u64,
    cnt: u64,
    cwnd_cnt: u64,
}

impl Default for Bic {
    fn default() -> Self {
        Self {
            fast_convergence: true,
            beta: 0.8,
            max_incr: 16,
            low_wnd: 14,
            smooth_part: 20,
            b: 4,
            last_max_cwnd: 0,
            cnt: 0,
            cwnd_cnt: 0,
        }
    }
}

impl Bic {
    /// 上次丢包时的窗口（段）
    pub fn last_max_cwnd(&self) -> u64 {
        self.last_max_cwnd
    }

    /// 每增长一段所需的 ACK 数
    fn update(&mut self, seg_cwnd: u64) -> u64 {
        let cnt = if seg_cwnd < self.low_wnd {
            seg_cwnd
        } else if seg_cwnd < self.last_max_cwnd {
            let dist = (self.last_max_cwnd - seg_cwnd) / self.b;
            if dist > self.max_incr {
                seg_cwnd / self.max_incr
            } else if dist <= 1 {
                seg_cwnd * self.smooth_part / self.b
            } else {
                seg_cwnd / dist
            }
        } else if seg_cwnd < self.last_max_cwnd + self.b {
            seg_cwnd * self.smooth_part / self.b
        } else if seg_cwnd < self.last_max_cwnd + self.max_incr * (self.b - 1) {
            seg_cwnd * (self.b - 1) / (seg_cwnd - self.last_max_cwnd)
        } else {
            seg_cwnd / self.max_incr
        };
        cnt.max(1)
    }
}

impl CongestionOps for Bic {
    fn name(&self) -> &'static str {
        "TcpBic"
    }

    fn increase_window(&mut self, tcb: &mut TcpCb, segments_acked: u32) {
        let mut segs = segments_acked;
        if tcb.in_slow_start() {
            segs = slow_start(tcb, segs);
        }
        if segs == 0 {
            return;
        }
        self.cnt = self.update(tcb.cwnd_segs());
        self.cwnd_cnt += segs as u64;
        if self.cwnd_cnt >= self.cnt {
            let delta = self.cwnd_cnt / self.cnt;
            self.cwnd_cnt -= delta * self.cnt;
            tcb.cwnd = tcb.cwnd.saturating_add(delta * tcb.mss());
        }
    }

    fn ssthresh(&mut self, tcb: &TcpCb, _bytes_in_flight: u64) -> u64 {
        let seg_cwnd = tcb.cwnd_segs();
        self.last_max_cwnd = if seg_cwnd < self.last_max_cwnd && self.fast_convergence {
            (self.beta * seg_cwnd as f64) as u64
        } else {
            seg_cwnd
        };
        let segs = if seg_cwnd < self.low_wnd {
            (seg_cwnd / 2).max(2)
        } else {
            ((seg_cwnd as f64 * self.beta) as u64).max(2)
        };
        segs * tcb.mss()
    }
}
