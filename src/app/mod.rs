//! 应用层
//!
//! 两种应用：`PacketSink` 在端口上监听并统计按序收到的字节；
//! `BulkSend` 启动后向远端地址建立 TCP 连接并持续发送。

mod bulk_send;
mod packet_sink;
mod start;

pub use bulk_send::BulkSend;
pub use packet_sink::PacketSink;
pub use start::AppStart;

use crate::net::{AppId, NodeId};

#[derive(Debug, Clone)]
pub enum Application {
    Sink(PacketSink),
    BulkSend(BulkSend),
}

impl Application {
    pub fn node(&self) -> NodeId {
        match self {
            Application::Sink(s) => s.node,
            Application::BulkSend(b) => b.node,
        }
    }
}

/// 引擎中的全部应用，`AppId` 为下标
#[derive(Debug, Default)]
pub struct Apps {
    apps: Vec<Application>,
}

impl Apps {
    pub fn add_sink(&mut self, node: NodeId, port: u16) -> AppId {
        self.push(Application::Sink(PacketSink::new(node, port)))
    }

    pub fn add_bulk_send(&mut self, bulk: BulkSend) -> AppId {
        self.push(Application::BulkSend(bulk))
    }

    fn push(&mut self, app: Application) -> AppId {
        let id = AppId(self.apps.len());
        self.apps.push(app);
        id
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn get(&self, id: AppId) -> Option<&Application> {
        self.apps.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: AppId) -> Option<&mut Application> {
        self.apps.get_mut(id.0)
    }

    pub fn sink(&self, id: AppId) -> Option<&PacketSink> {
        match self.get(id)? {
            Application::Sink(s) => Some(s),
            Application::BulkSend(_) => None,
        }
    }

    pub fn bulk_send(&self, id: AppId) -> Option<&BulkSend> {
        match self.get(id)? {
            Application::BulkSend(b) => Some(b),
            Application::Sink(_) => None,
        }
    }

    /// 在 (node, port) 上已启动的 sink
    pub fn listener(&self, node: NodeId, port: u16) -> Option<AppId> {
        self.apps.iter().enumerate().find_map(|(i, app)| match app {
            Application::Sink(s) if s.node == node && s.port == port && s.is_listening() => {
                Some(AppId(i))
            }
            _ => None,
        })
    }

    pub(crate) fn accept(&mut self, id: AppId) {
        if let Some(Application::Sink(s)) = self.get_mut(id) {
            s.on_accept();
        }
    }

    pub(crate) fn deliver(&mut self, id: AppId, bytes: u64) {
        if let Some(Application::Sink(s)) = self.get_mut(id) {
            s.on_rx(bytes);
        }
    }
}
