//! 逐跳转发
//!
//! 包在节点上查路由表选下一跳，进入该方向链路的队列；链路空闲时开始序列化，
//! 发送完成（depart）触发 `LinkReady`，到达（depart + latency）触发 `DeliverPacket`。

use super::deliver_packet::DeliverPacket;
use super::id::{LinkId, NodeId};
use super::link_ready::LinkReady;
use super::network::Network;
use super::packet::Packet;
use super::transport::Transport;
use crate::sim::Simulator;
use tracing::{debug, trace};

impl Network {
    /// 包到达（或在本地产生于）节点 `at`
    #[tracing::instrument(skip(self, pkt, sim), fields(pkt_id = pkt.id, flow_id = pkt.flow_id, at = ?at))]
    pub fn receive(&mut self, at: NodeId, pkt: Packet, sim: &mut Simulator) {
        if self.stack(at).is_none() {
            debug!("节点未安装协议栈，丢弃");
            self.stats.no_stack_pkts += 1;
            return;
        }
        if pkt.arrived_at(at) {
            self.on_delivered(at, pkt, sim);
        } else {
            self.forward_from(at, pkt, sim);
        }
    }

    /// 从节点 `from` 向目的地方向发送一跳
    pub fn forward_from(&mut self, from: NodeId, pkt: Packet, sim: &mut Simulator) {
        let next = self.routing().next_hop(from, pkt.dst, pkt.flow_id);
        let Some(link_id) = next.and_then(|to| self.link_between(from, to)) else {
            debug!(?from, dst = ?pkt.dst, "无路由，丢弃");
            self.stats.unroutable_pkts += 1;
            return;
        };

        let link = self.link_mut(link_id);
        let size = pkt.size_bytes as u64;
        if let Err(pkt) = link.queue.enqueue(pkt) {
            trace!(
                pkt_id = pkt.id,
                ?link_id,
                q_bytes = link.queue.bytes(),
                q_cap_bytes = link.queue.capacity_bytes(),
                "队列已满，尾丢弃"
            );
            self.stats.dropped_pkts += 1;
            self.stats.dropped_bytes += size;
            return;
        }
        if !link.busy {
            self.start_tx(link_id, sim);
        }
    }

    /// 链路空闲：取队首开始发送
    fn start_tx(&mut self, link_id: LinkId, sim: &mut Simulator) {
        let now = sim.now();
        let link = self.link_mut(link_id);
        let Some(pkt) = link.queue.dequeue() else {
            link.busy = false;
            return;
        };
        link.busy = true;
        let depart = now.saturating_add(link.tx_time(pkt.size_bytes));
        let arrive = depart.saturating_add(link.latency);
        let to = link.to;
        trace!(pkt_id = pkt.id, ?link_id, ?depart, ?arrive, "开始发送");

        sim.schedule(
            arrive,
            DeliverPacket {
                to,
                pkt: pkt.advance(),
            },
        );
        sim.schedule(depart, LinkReady { link_id });
    }

    pub(crate) fn on_link_ready(&mut self, link_id: LinkId, sim: &mut Simulator) {
        self.link_mut(link_id).busy = false;
        self.start_tx(link_id, sim);
    }

    /// 数据包送达目的节点：计入统计并交给传输层
    fn on_delivered(&mut self, at: NodeId, pkt: Packet, sim: &mut Simulator) {
        self.stats.delivered_pkts += 1;
        self.stats.delivered_bytes += pkt.size_bytes as u64;
        trace!(pkt_id = pkt.id, hops = pkt.hops, "送达");

        if let Transport::Tcp(seg) = pkt.transport {
            // 规避同时借用 `self` 与 `self.tcp`
            let mut tcp = std::mem::take(&mut self.tcp);
            tcp.on_segment(pkt.flow_id, at, seg, sim, self);
            self.tcp = tcp;
        }
    }
}
