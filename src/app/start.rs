//! 应用启动事件

use super::Application;
use crate::net::{AppId, NetWorld, Network};
use crate::proto::tcp::TcpConn;
use crate::sim::{Event, Simulator, World};
use tracing::{debug, warn};

/// 事件：在启动时刻启动一个应用
#[derive(Debug)]
pub struct AppStart {
    pub app: AppId,
}

impl Event for AppStart {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let AppStart { app } = *self;
        NetWorld::downcast(world).net.start_app(app, sim);
    }
}

impl Network {
    /// 启动应用：sink 开始监听；bulk sender 解析远端地址并发起连接
    pub fn start_app(&mut self, app: AppId, sim: &mut Simulator) {
        let (node, remote, max_bytes) = match self.apps.get_mut(app) {
            Some(Application::Sink(s)) => {
                debug!(?app, node = ?s.node, port = s.port, now = ?sim.now(), "sink 开始监听");
                s.start();
                return;
            }
            Some(Application::BulkSend(b)) => (b.node, b.remote, b.max_bytes),
            None => {
                warn!(?app, "启动未知应用");
                return;
            }
        };

        let Some(dst) = self.resolve(*remote.ip()) else {
            warn!(?app, %remote, "远端地址未分配给任何节点");
            return;
        };
        let Some(stack) = self.stack(node).cloned() else {
            warn!(?app, ?node, "发送节点未安装协议栈");
            return;
        };

        let mut tcp = std::mem::take(&mut self.tcp);
        let id = tcp.next_conn_id();
        if let Some(Application::BulkSend(b)) = self.apps.get_mut(app) {
            b.set_conn(id);
        }
        debug!(?app, conn_id = id, %remote, transport = %stack.transport, "bulk sender 启动");
        let conn = TcpConn::new(
            id,
            node,
            dst,
            remote.port(),
            max_bytes,
            stack.tcp,
            stack.transport,
        );
        tcp.connect(conn, sim, self);
        self.tcp = tcp;
    }
}
