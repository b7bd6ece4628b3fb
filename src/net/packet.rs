//! 数据包类型
//!
//! 包只携带源/目的节点，逐跳由路由表决定下一跳。

use super::id::NodeId;
use super::transport::Transport;

/// 网络数据包
#[derive(Debug, Clone)]
pub struct Packet {
    pub id: u64,
    pub flow_id: u64,
    /// 线上字节数（含各层头部）
    pub size_bytes: u32,
    pub src: NodeId,
    pub dst: NodeId,
    /// 已经过的跳数
    pub hops: u32,
    pub transport: Transport,
}

impl Packet {
    /// 是否已到达目的节点
    pub fn arrived_at(&self, node: NodeId) -> bool {
        self.dst == node
    }

    /// 经过一跳
    pub fn advance(mut self) -> Self {
        self.hops = self.hops.saturating_add(1);
        self
    }
}
