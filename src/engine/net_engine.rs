//! 自带的离散事件网络引擎

use std::net::{Ipv4Addr, SocketAddrV4};

use super::{DevicePair, Engine, LinkProfile};
use crate::app::{AppStart, BulkSend};
use crate::error::{ExperimentError, Result};
use crate::net::{AppId, DeviceId, NetWorld, Network, NodeId};
use crate::proto::StackConfig;
use crate::sim::{SimTime, Simulator};
use tracing::{info, warn};

/// 仿真器 + 网络世界
#[derive(Default)]
pub struct NetEngine {
    sim: Simulator,
    world: NetWorld,
}

impl NetEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn network(&self) -> &Network {
        &self.world.net
    }

    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    fn check_node(&self, node: NodeId) -> Result<()> {
        if node.0 < self.world.net.node_count() {
            Ok(())
        } else {
            Err(ExperimentError::UnknownNode(node))
        }
    }
}

impl Engine for NetEngine {
    fn set_seed(&mut self, seed: u64) {
        self.world.net.set_routing_salt(seed);
    }

    fn create_node(&mut self, name: &str) -> NodeId {
        self.world.net.add_node(name)
    }

    fn install_p2p_link(
        &mut self,
        a: NodeId,
        b: NodeId,
        profile: &LinkProfile,
    ) -> Result<DevicePair> {
        self.check_node(a)?;
        self.check_node(b)?;
        if a == b {
            return Err(ExperimentError::SelfLoop(a));
        }
        let (a, b) = self.world.net.connect_p2p(a, b, profile);
        Ok(DevicePair { a, b })
    }

    fn install_stack(&mut self, node: NodeId, stack: &StackConfig) -> Result<()> {
        self.check_node(node)?;
        self.world.net.install_stack(node, stack.clone());
        Ok(())
    }

    fn assign_ipv4(&mut self, dev: DeviceId, addr: Ipv4Addr, mask: Ipv4Addr) -> Result<()> {
        if self.world.net.assign_ipv4(dev, addr, mask) {
            Ok(())
        } else {
            Err(ExperimentError::UnknownDevice(dev))
        }
    }

    fn install_sink(&mut self, node: NodeId, port: u16, start: SimTime) -> Result<AppId> {
        self.check_node(node)?;
        let app = self.world.net.apps.add_sink(node, port);
        self.sim.schedule(start, AppStart { app });
        Ok(app)
    }

    fn install_bulk_send(
        &mut self,
        node: NodeId,
        remote: SocketAddrV4,
        max_bytes: u64,
        start: SimTime,
    ) -> Result<AppId> {
        self.check_node(node)?;
        let bulk = BulkSend::new(node, remote).with_max_bytes(max_bytes);
        let app = self.world.net.apps.add_bulk_send(bulk);
        self.sim.schedule(start, AppStart { app });
        Ok(app)
    }

    fn populate_routing_tables(&mut self) {
        self.world.net.populate_routing_tables();
    }

    fn run(&mut self, stop: SimTime) -> Result<()> {
        if stop < self.sim.now() {
            return Err(ExperimentError::Engine(format!(
                "停止时间 {stop:?} 早于当前时间 {:?}",
                self.sim.now()
            )));
        }
        let net = &self.world.net;
        if net.routing().is_stale(net.link_count()) {
            warn!("路由表未生成或已过期，跨节点的包会被丢弃");
        }
        self.sim.run_until(stop, &mut self.world);

        let stats = &self.world.net.stats;
        info!(
            delivered_pkts = stats.delivered_pkts,
            dropped_pkts = stats.dropped_pkts,
            unroutable_pkts = stats.unroutable_pkts,
            tcp_conns = self.world.net.tcp.len(),
            "引擎运行结束"
        );
        Ok(())
    }

    fn sink_total_rx(&self, app: AppId) -> Result<u64> {
        self.world
            .net
            .apps
            .sink(app)
            .map(|s| s.total_rx())
            .ok_or(ExperimentError::UnknownApp(app))
    }
}
