//! 批量发送应用（bulk sender）

use std::net::SocketAddrV4;

use crate::net::NodeId;
use crate::proto::tcp::TcpConnId;

/// 启动后向 `remote` 建立连接并尽可能快地发送数据
#[derive(Debug, Clone)]
pub struct BulkSend {
    pub node: NodeId,
    pub remote: SocketAddrV4,
    /// 发送上限（字节），0 表示不限量
    pub max_bytes: u64,
    conn: Option<TcpConnId>,
}

impl BulkSend {
    pub fn new(node: NodeId, remote: SocketAddrV4) -> Self {
        Self {
            node,
            remote,
            max_bytes: 0,
            conn: None,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// 启动后建立的连接
    pub fn conn(&self) -> Option<TcpConnId> {
        self.conn
    }

    pub(crate) fn set_conn(&mut self, id: TcpConnId) {
        self.conn = Some(id);
    }
}
