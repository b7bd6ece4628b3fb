//! 网络拓扑管理
//!
//! 持有节点、设备、单向链路、地址表与路由表，以及 TCP 栈和应用表。

use std::collections::HashMap;
use std::net::Ipv4Addr;

use super::id::{DeviceId, LinkId, NodeId};
use super::link::{Link, LinkProfile};
use super::node::{Device, Ipv4Interface, Node};
use super::packet::Packet;
use super::routing::RoutingTable;
use super::stats::Stats;
use super::transport::Transport;
use crate::app::Apps;
use crate::proto::StackConfig;
use crate::proto::tcp::TcpStack;
use tracing::{debug, info};

/// 网络拓扑
#[derive(Default)]
pub struct Network {
    nodes: Vec<Node>,
    devices: Vec<Device>,
    links: Vec<Link>,
    edges: HashMap<(NodeId, NodeId), LinkId>,
    addr_table: HashMap<Ipv4Addr, NodeId>,
    routing: RoutingTable,
    next_pkt_id: u64,
    pub tcp: TcpStack,
    pub apps: Apps,
    pub stats: Stats,
}

impl Network {
    /// 添加节点（尚未安装协议栈）
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(id, name));
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 单向链路数（每条点到点链路计两条）
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.0)
    }

    /// 查找 from -> to 的单向链路
    pub fn link_between(&self, from: NodeId, to: NodeId) -> Option<LinkId> {
        self.edges.get(&(from, to)).copied()
    }

    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(id.0)
    }

    pub(crate) fn link_mut(&mut self, id: LinkId) -> &mut Link {
        &mut self.links[id.0]
    }

    /// 节点度数（点到点设备数）
    pub fn degree(&self, node: NodeId) -> usize {
        self.node(node).map_or(0, Node::degree)
    }

    /// 用一条点到点链路连接两个节点，返回两端设备 (a 侧, b 侧)。
    pub fn connect_p2p(
        &mut self,
        a: NodeId,
        b: NodeId,
        profile: &LinkProfile,
    ) -> (DeviceId, DeviceId) {
        debug_assert!(a != b, "point-to-point link must join two distinct nodes");

        let ab = LinkId(self.links.len());
        self.links.push(Link::new(a, b, profile));
        let ba = LinkId(self.links.len());
        self.links.push(Link::new(b, a, profile));
        self.edges.insert((a, b), ab);
        self.edges.insert((b, a), ba);

        let dev_a = DeviceId(self.devices.len());
        let dev_b = DeviceId(self.devices.len() + 1);
        self.devices.push(Device {
            id: dev_a,
            node: a,
            egress: ab,
            peer: dev_b,
            ipv4: None,
        });
        self.devices.push(Device {
            id: dev_b,
            node: b,
            egress: ba,
            peer: dev_a,
            ipv4: None,
        });
        self.nodes[a.0].devices.push(dev_a);
        self.nodes[b.0].devices.push(dev_b);

        debug!(
            ?a,
            ?b,
            rate_bps = profile.data_rate_bps,
            delay = ?profile.delay,
            "创建点到点链路"
        );
        (dev_a, dev_b)
    }

    /// 在节点上安装协议栈（重复安装覆盖之前的配置）
    pub fn install_stack(&mut self, node: NodeId, stack: StackConfig) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            debug!(?node, transport = stack.transport.as_str(), "安装协议栈");
            n.stack = Some(stack);
        }
    }

    pub fn stack(&self, node: NodeId) -> Option<&StackConfig> {
        self.node(node).and_then(|n| n.stack.as_ref())
    }

    /// 给设备配置 IPv4 地址；返回 false 表示设备不存在
    pub fn assign_ipv4(&mut self, dev: DeviceId, addr: Ipv4Addr, mask: Ipv4Addr) -> bool {
        let Some(device) = self.devices.get_mut(dev.0) else {
            return false;
        };
        if let Some(old) = device.ipv4.take() {
            self.addr_table.remove(&old.addr);
        }
        device.ipv4 = Some(Ipv4Interface { addr, mask });
        self.addr_table.insert(addr, device.node);
        true
    }

    /// 地址 -> 所属节点
    pub fn resolve(&self, addr: Ipv4Addr) -> Option<NodeId> {
        self.addr_table.get(&addr).copied()
    }

    /// 节点各接口上的地址（按设备创建顺序）
    pub fn node_addresses(&self, node: NodeId) -> Vec<Ipv4Addr> {
        let Some(n) = self.node(node) else {
            return Vec::new();
        };
        n.devices
            .iter()
            .filter_map(|d| self.devices[d.0].ipv4.map(|i| i.addr))
            .collect()
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    pub fn set_routing_salt(&mut self, salt: u64) {
        self.routing.set_hash_salt(salt);
    }

    /// 基于当前全部链路计算每个节点的转发表
    pub fn populate_routing_tables(&mut self) {
        let mut adj: Vec<Vec<NodeId>> = vec![Vec::new(); self.nodes.len()];
        for link in &self.links {
            adj[link.from.0].push(link.to);
        }
        self.routing.populate(&adj, self.links.len());
        info!(
            nodes = self.nodes.len(),
            links = self.links.len(),
            "全局路由表已生成"
        );
    }

    /// 创建数据包
    pub fn make_packet(
        &mut self,
        flow_id: u64,
        size_bytes: u32,
        src: NodeId,
        dst: NodeId,
        transport: Transport,
    ) -> Packet {
        let id = self.next_pkt_id;
        self.next_pkt_id = self.next_pkt_id.wrapping_add(1);
        Packet {
            id,
            flow_id,
            size_bytes,
            src,
            dst,
            hops: 0,
            transport,
        }
    }
}
