//! Scalable TCP：每 min(cwnd, 50) 个 ACK 增加一段，丢包时乘 0.875。

use super::{CongestionOps, TcpCb, slow_start};

#[derive(Debug, Clone)]
pub struct Scalable {
    ai_factor: u64,
    md_factor: f64,
    ack_cnt: u64,
}

impl Default for Scalable {
    fn default() -> Self {
        Self {
            ai_factor: 50,
            md_factor: 0.125,
            ack_cnt: 0,
        }
    }
}

impl CongestionOps for Scalable {
    fn name(&self) -> &'static str {
        "TcpScalable"
    }

    fn increase_window(&mut self, tcb: &mut TcpCb, segments_acked: u32) {
        let mut segs = segments_acked;
        if tcb.in_slow_start() {
            segs = slow_start(tcb, segs);
        }
        if segs == 0 {
            return;
        }
        let w = tcb.cwnd_segs().clamp(1, self.ai_factor);
        self.ack_cnt += segs as u64;
        if self.ack_cnt >= w {
            let delta = self.ack_cnt / w;
            self.ack_cnt -= delta * w;
            tcb.cwnd = tcb.cwnd.saturating_add(delta * tcb.mss());
        }
    }

    fn ssthresh(&mut self, tcb: &TcpCb, _bytes_in_flight: u64) -> u64 {
        let segs = (tcb.cwnd_segs() as f64 * (1.0 - self.md_factor)).max(2.0);
        segs as u64 * tcb.mss()
    }
}
