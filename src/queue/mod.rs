//! 队列策略（Queue disciplines）
//!
//! 点到点设备的发送队列。目前只有 DropTail。

use crate::net::Packet;

mod drop_tail;

pub use drop_tail::DropTailQueue;

/// 默认包大小：536B 载荷 + 40B TCP/IP 头 + 2B PPP 头
pub const DEFAULT_PKT_BYTES: u64 = 578;

/// 点到点设备的默认队列深度（包数）
pub const DEFAULT_QUEUE_PKTS: u64 = 100;

pub fn mem_from_pkt(pkts: u64) -> u64 {
    pkts.saturating_mul(DEFAULT_PKT_BYTES)
}

/// Packet 队列抽象
pub trait PacketQueue: std::fmt::Debug + Send {
    /// 入队：成功返回 Ok；若被丢弃则返回 Err(pkt)
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet>;
    /// 出队：按队列策略返回下一个 packet
    fn dequeue(&mut self) -> Option<Packet>;

    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn bytes(&self) -> u64;
    fn capacity_bytes(&self) -> u64;
}
