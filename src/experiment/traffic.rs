//! 流量配置
//!
//! 接收端星形的每个 spoke 上一个 sink，发送端星形的 spoke i 向接收端 spoke i 发送。

use std::net::SocketAddrV4;

use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::{ExperimentError, Result};
use crate::net::{AppId, NodeId};
use crate::sim::SimTime;
use crate::topo::StarTopology;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficOpts {
    pub port: u16,
    pub sink_start: SimTime,
    pub source_start: SimTime,
    /// 0 表示不限量
    pub max_bytes: u64,
}

impl Default for TrafficOpts {
    fn default() -> Self {
        Self {
            port: 5000,
            sink_start: SimTime::from_secs(1),
            source_start: SimTime::from_secs(2),
            max_bytes: 0,
        }
    }
}

/// 一对收发端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowPair {
    pub index: usize,
    pub sender: NodeId,
    pub receiver: NodeId,
    pub remote: SocketAddrV4,
    pub sink: AppId,
    pub source: AppId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrafficPlan {
    flows: Vec<FlowPair>,
}

impl TrafficPlan {
    pub fn flows(&self) -> &[FlowPair] {
        &self.flows
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// 按下标顺序的 sink
    pub fn sinks(&self) -> impl Iterator<Item = AppId> + '_ {
        self.flows.iter().map(|f| f.sink)
    }
}

/// 在两个已分配地址的星形之间布置批量传输。
///
/// 先装完所有 sink，再装所有 sender。
pub fn wire_bulk_traffic<E: Engine + ?Sized>(
    engine: &mut E,
    receivers: &StarTopology,
    senders: &StarTopology,
    opts: &TrafficOpts,
) -> Result<TrafficPlan> {
    if receivers.spoke_count() != senders.spoke_count() {
        return Err(ExperimentError::MismatchedStars {
            a: receivers.spoke_count(),
            b: senders.spoke_count(),
        });
    }
    if !receivers.is_addressed() {
        return Err(ExperimentError::Unaddressed(receivers.name().to_string()));
    }

    let mut sinks = Vec::with_capacity(receivers.spoke_count());
    for &node in receivers.spokes() {
        sinks.push(engine.install_sink(node, opts.port, opts.sink_start)?);
    }

    let mut flows = Vec::with_capacity(sinks.len());
    for (i, (&sender, sink)) in senders.spokes().iter().zip(sinks).enumerate() {
        let addr = receivers
            .spoke_ipv4_address(i)
            .ok_or_else(|| ExperimentError::Unaddressed(receivers.name().to_string()))?;
        let remote = SocketAddrV4::new(addr, opts.port);
        let source = engine.install_bulk_send(sender, remote, opts.max_bytes, opts.source_start)?;
        debug!(index = i, ?sender, %remote, "布置批量传输");
        flows.push(FlowPair {
            index: i,
            sender,
            receiver: receivers.spokes()[i],
            remote,
            sink,
            source,
        });
    }
    Ok(TrafficPlan { flows })
}
