//! 网络模拟模块
//!
//! 此模块包含网络模拟的核心组件：节点与设备、点到点链路、数据包、全局路由与逐跳转发。

// 子模块声明
mod deliver_packet;
mod forward;
mod id;
mod link;
mod link_ready;
mod net_world;
mod network;
mod node;
mod packet;
mod routing;
mod stats;
mod transport;

// 重新导出公共接口
pub use deliver_packet::DeliverPacket;
pub use id::{AppId, DeviceId, LinkId, NodeId};
pub use link::{Link, LinkProfile};
pub use link_ready::LinkReady;
pub use net_world::NetWorld;
pub use network::Network;
pub use node::{Device, Ipv4Interface, Node};
pub use packet::Packet;
pub use routing::RoutingTable;
pub use stats::Stats;
pub use transport::{TcpSegment, Transport};
