//! 节点与网络设备
//!
//! 所有节点都是 IP 节点：装了协议栈才能收发/转发。hub 与 spoke 的区别只在拓扑上。

use std::net::Ipv4Addr;

use super::id::{DeviceId, LinkId, NodeId};
use crate::proto::StackConfig;

/// 网络节点
#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub stack: Option<StackConfig>,
    pub devices: Vec<DeviceId>,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            stack: None,
            devices: Vec::new(),
        }
    }

    /// 度数：每个点到点设备对应一个邻居
    pub fn degree(&self) -> usize {
        self.devices.len()
    }
}

/// 点到点网络设备（接口）
#[derive(Debug, Clone)]
pub struct Device {
    pub id: DeviceId,
    pub node: NodeId,
    /// 该设备的发送方向链路
    pub egress: LinkId,
    /// 链路另一端的设备
    pub peer: DeviceId,
    pub ipv4: Option<Ipv4Interface>,
}

/// 接口上配置的 IPv4 地址
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Interface {
    pub addr: Ipv4Addr,
    pub mask: Ipv4Addr,
}
