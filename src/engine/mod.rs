//! 仿真引擎接口
//!
//! 实验编排只通过 `Engine` 与引擎交互：建节点、连链路、装协议栈、配地址、
//! 装应用、生成路由、运行、读 sink 计数。`NetEngine` 是本 crate 自带的实现，
//! 测试里可以换成假的引擎。

mod net_engine;

pub use net_engine::NetEngine;

use std::net::{Ipv4Addr, SocketAddrV4};

use crate::error::Result;
use crate::net::{AppId, DeviceId, NodeId};
use crate::proto::StackConfig;
use crate::sim::SimTime;

pub use crate::net::LinkProfile;

/// 一条点到点链路两端的设备
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DevicePair {
    pub a: DeviceId,
    pub b: DeviceId,
}

pub trait Engine {
    /// 在构建拓扑之前设置随机种子
    fn set_seed(&mut self, seed: u64);

    fn create_node(&mut self, name: &str) -> NodeId;

    fn install_p2p_link(&mut self, a: NodeId, b: NodeId, profile: &LinkProfile)
    -> Result<DevicePair>;

    fn install_stack(&mut self, node: NodeId, stack: &StackConfig) -> Result<()>;

    fn assign_ipv4(&mut self, dev: DeviceId, addr: Ipv4Addr, mask: Ipv4Addr) -> Result<()>;

    /// 在 `node` 上安装监听 `port` 的 sink，`start` 时刻开始接受连接
    fn install_sink(&mut self, node: NodeId, port: u16, start: SimTime) -> Result<AppId>;

    /// 在 `node` 上安装向 `remote` 发送的 bulk sender；`max_bytes == 0` 表示不限量
    fn install_bulk_send(
        &mut self,
        node: NodeId,
        remote: SocketAddrV4,
        max_bytes: u64,
        start: SimTime,
    ) -> Result<AppId>;

    fn populate_routing_tables(&mut self);

    /// 阻塞运行直到 `stop` 或事件耗尽
    fn run(&mut self, stop: SimTime) -> Result<()>;

    /// sink 累计收到的字节数
    fn sink_total_rx(&self, app: AppId) -> Result<u64>;
}
