//! NewReno：慢启动 + AIMD。

use super::{CongestionOps, TcpCb, reno_avoidance, reno_ssthresh, slow_start};

#[derive(Debug, Default, Clone)]
pub struct NewReno;

impl CongestionOps for NewReno {
    fn name(&self) -> &'static str {
        "TcpNewReno"
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

    fn ssthresh(&mut self, tcb: &TcpCb, bytes_in_flight: u64) -> u64 {
        reno_ssthresh(tcb, bytes_in_flight)
    }
}
