//! 包接收应用（sink）

use crate::net::NodeId;

/// 在端口上监听，累计按序交付的字节数
#[derive(Debug, Clone)]
pub struct PacketSink {
    pub node: NodeId,
    pub port: u16,
    listening: bool,
    accepted: u32,
    total_rx: u64,
}

impl PacketSink {
    pub fn new(node: NodeId, port: u16) -> Self {
        Self {
            node,
            port,
            listening: false,
            accepted: 0,
            total_rx: 0,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// 已接受的连接数
    pub fn accepted(&self) -> u32 {
        self.accepted
    }

    /// 累计接收字节（单调不减）
    pub fn total_rx(&self) -> u64 {
        self.total_rx
    }

    pub(crate) fn start(&mut self) {
        self.listening = true;
    }

    pub(crate) fn on_accept(&mut self) {
        self.accepted += 1;
    }

    pub(crate) fn on_rx(&mut self, bytes: u64) {
        self.total_rx = self.total_rx.saturating_add(bytes);
    }
}
