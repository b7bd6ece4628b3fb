//! 链路类型
//!
//! 点到点链路由两条单向 `Link` 组成，每条各带一个发送队列。

use serde::{Deserialize, Serialize};

use super::id::NodeId;
use crate::queue::{DEFAULT_QUEUE_PKTS, DropTailQueue, PacketQueue, mem_from_pkt};
use crate::sim::SimTime;

/// 点到点链路参数：速率、传播时延、每个方向的队列容量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkProfile {
    pub data_rate_bps: u64,
    pub delay: SimTime,
    pub queue_bytes: u64,
}

impl LinkProfile {
    pub fn new(data_rate_bps: u64, delay: SimTime) -> Self {
        Self {
            data_rate_bps,
            delay,
            queue_bytes: mem_from_pkt(DEFAULT_QUEUE_PKTS),
        }
    }

    pub fn mbps(mbps: u64, delay: SimTime) -> Self {
        Self::new(mbps.saturating_mul(1_000_000), delay)
    }
}

/// 单向链路
#[derive(Debug)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
    pub latency: SimTime,
    pub bandwidth_bps: u64,
    /// 正在序列化发送一个包
    pub busy: bool,
    pub queue: Box<dyn PacketQueue>,
}

impl Link {
    pub fn new(from: NodeId, to: NodeId, profile: &LinkProfile) -> Self {
        Self {
            from,
            to,
            latency: profile.delay,
            bandwidth_bps: profile.data_rate_bps,
            busy: false,
            queue: Box::new(DropTailQueue::new(profile.queue_bytes)),
        }
    }

    /// 计算传输指定字节数所需的时间
    pub(crate) fn tx_time(&self, bytes: u32) -> SimTime {
        // ceil(bytes*8 / bps) 秒 -> 纳秒
        if self.bandwidth_bps == 0 {
            return SimTime(u64::MAX / 4);
        }
        let bits = (bytes as u128) * 8;
        let bps = self.bandwidth_bps as u128;
        let nanos = (bits * 1_000_000_000 + (bps - 1)) / bps;
        SimTime(nanos.min(u64::MAX as u128) as u64)
    }
}
