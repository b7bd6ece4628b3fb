//! 星形拓扑构建
//!
//! 一个 hub 加 N 个 spoke，hub 到每个 spoke 一条相同参数的点到点链路。
//! 两个星形之间用 `connect_hubs` 连接 hub。

use std::net::Ipv4Addr;

use super::address::{Ipv4AddressHelper, Ipv4InterfaceContainer};
use crate::engine::{DevicePair, Engine, LinkProfile};
use crate::error::{ExperimentError, Result};
use crate::net::{DeviceId, NodeId};
use crate::proto::StackConfig;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct StarTopology {
    name: String,
    hub: NodeId,
    spokes: Vec<NodeId>,
    /// hub 侧第 i 个设备连向 spoke i
    hub_devices: Vec<DeviceId>,
    spoke_devices: Vec<DeviceId>,
    addresses: Option<Ipv4InterfaceContainer>,
}

/// 构建星形拓扑
///
/// 节点命名为 `{name}-hub`、`{name}-spoke{i}`。
pub fn build_star<E: Engine + ?Sized>(
    engine: &mut E,
    name: &str,
    spoke_count: u32,
    profile: &LinkProfile,
) -> Result<StarTopology> {
    if spoke_count == 0 {
        return Err(ExperimentError::InvalidSpokeCount(spoke_count));
    }

    let hub = engine.create_node(&format!("{name}-hub"));
    let n = spoke_count as usize;
    let mut spokes = Vec::with_capacity(n);
    let mut hub_devices = Vec::with_capacity(n);
    let mut spoke_devices = Vec::with_capacity(n);
    for i in 0..n {
        let spoke = engine.create_node(&format!("{name}-spoke{i}"));
        let DevicePair { a, b } = engine.install_p2p_link(hub, spoke, profile)?;
        spokes.push(spoke);
        hub_devices.push(a);
        spoke_devices.push(b);
    }
    debug!(name, spoke_count, rate_bps = profile.data_rate_bps, "构建星形拓扑");

    Ok(StarTopology {
        name: name.to_string(),
        hub,
        spokes,
        hub_devices,
        spoke_devices,
        addresses: None,
    })
}

/// 用一条点到点链路连接两个 hub
pub fn connect_hubs<E: Engine + ?Sized>(
    engine: &mut E,
    hub_a: NodeId,
    hub_b: NodeId,
    profile: &LinkProfile,
) -> Result<DevicePair> {
    if hub_a == hub_b {
        return Err(ExperimentError::SelfLoop(hub_a));
    }
    engine.install_p2p_link(hub_a, hub_b, profile)
}

impl StarTopology {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hub(&self) -> NodeId {
        self.hub
    }

    pub fn spoke_count(&self) -> usize {
        self.spokes.len()
    }

    pub fn spoke(&self, i: usize) -> Option<NodeId> {
        self.spokes.get(i).copied()
    }

    pub fn spokes(&self) -> &[NodeId] {
        &self.spokes
    }

    pub fn hub_devices(&self) -> &[DeviceId] {
        &self.hub_devices
    }

    pub fn spoke_devices(&self) -> &[DeviceId] {
        &self.spoke_devices
    }

    /// 在 hub 与所有 spoke 上安装协议栈
    pub fn install_stack<E: Engine + ?Sized>(
        &self,
        engine: &mut E,
        stack: &StackConfig,
    ) -> Result<()> {
        engine.install_stack(self.hub, stack)?;
        for &spoke in &self.spokes {
            engine.install_stack(spoke, stack)?;
        }
        Ok(())
    }

    /// 地址分配顺序：hub 侧设备 i，然后 spoke 设备 i
    pub fn devices_in_order(&self) -> Vec<DeviceId> {
        self.hub_devices
            .iter()
            .zip(&self.spoke_devices)
            .flat_map(|(&h, &s)| [h, s])
            .collect()
    }

    /// 用 `helper` 当前网段给本星形的所有设备分配地址
    pub fn assign_ipv4_addresses<E: Engine + ?Sized>(
        &mut self,
        engine: &mut E,
        helper: &mut Ipv4AddressHelper,
    ) -> Result<&Ipv4InterfaceContainer> {
        let ifaces = helper.assign(engine, &self.devices_in_order())?;
        let ifaces = &*self.addresses.insert(ifaces);
        Ok(ifaces)
    }

    pub fn addresses(&self) -> Option<&Ipv4InterfaceContainer> {
        self.addresses.as_ref()
    }

    pub fn is_addressed(&self) -> bool {
        self.addresses.is_some()
    }

    pub fn spoke_ipv4_address(&self, i: usize) -> Option<Ipv4Addr> {
        self.addresses.as_ref()?.address_of(*self.spoke_devices.get(i)?)
    }

    pub fn hub_ipv4_address(&self, i: usize) -> Option<Ipv4Addr> {
        self.addresses.as_ref()?.address_of(*self.hub_devices.get(i)?)
    }
}
