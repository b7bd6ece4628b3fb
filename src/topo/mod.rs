//! 拓扑构建
//!
//! 星形子网与 IPv4 地址分配。

pub mod address;
pub mod star;

pub use address::{Ipv4AddressHelper, Ipv4InterfaceContainer};
pub use star::{StarTopology, build_star, connect_hubs};
