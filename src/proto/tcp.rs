//! TCP（简化版）协议实现
//!
//! 支持 bulk 传输实验所需的功能：
//! - SYN / SYN-ACK 建连（目的端口无监听时 SYN 被丢弃，靠 RTO 重试）
//! - 数据段/累计 ACK，接收端缓存乱序段
//! - 3 dupACK 快速重传 + NewReno 快速恢复（部分 ACK 重传下一个空洞）
//! - RFC 6298 RTT 估计与指数退避 RTO，超时后 cwnd 回到 1 MSS 从 snd_una 重发
//! - 窗口增长/回退委托给 `CongestionOps`
//!
//! 注意：不实现 FIN/RST、窗口通告、SACK、延迟 ACK。

use std::collections::{BTreeMap, HashMap};

use crate::net::{AppId, NetWorld, Network, NodeId, TcpSegment, Transport};
use crate::proto::cc::{CongestionEvent, CongestionOps, TcpCb, TcpVariant};
use crate::sim::{Event, SimTime, Simulator, World};
use tracing::{debug, trace};

/// 一个 TCP 连接的唯一标识（复用 `flow_id` 的语义）。
pub type TcpConnId = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct TcpConfig {
    /// MSS（数据段载荷大小，字节）
    pub mss: u32,
    /// 每个段在线上附加的头部字节（TCP/IP 40B + PPP 2B）
    pub header_bytes: u32,
    /// 初始 cwnd（段）
    pub init_cwnd_segs: u32,
    /// 初始 ssthresh（字节）
    pub init_ssthresh_bytes: u64,
    /// 接收窗口（字节），限制在途数据量
    pub rcv_wnd_bytes: u64,
    pub dup_ack_threshold: u32,
    /// 初始 RTO
    pub init_rto: SimTime,
    pub min_rto: SimTime,
    /// 最大 RTO（用于退避上限）
    pub max_rto: SimTime,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            mss: 536,
            header_bytes: 42,
            init_cwnd_segs: 10,
            init_ssthresh_bytes: u64::MAX,
            rcv_wnd_bytes: 131_072,
            dup_ack_threshold: 3,
            init_rto: SimTime::from_secs(1),
            min_rto: SimTime::from_secs(1),
            max_rto: SimTime::from_secs(60),
        }
    }
}

/// 连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpState {
    SynSent,
    Established,
}

#[derive(Debug, Clone)]
struct SentSeg {
    len: u32,
    sent_at: SimTime,
    retrans: bool,
}

/// RFC 6298 RTT 估计
#[derive(Debug, Clone, Default)]
pub struct RttEstimator {
    srtt: Option<SimTime>,
    rttvar: SimTime,
}

impl RttEstimator {
    /// 时钟粒度
    const GRANULARITY: SimTime = SimTime(1_000_000);

    pub fn sample(&mut self, r: SimTime) {
        match self.srtt {
            None => {
                self.srtt = Some(r);
                self.rttvar = SimTime(r.0 / 2);
            }
            Some(srtt) => {
                let err = srtt.0.abs_diff(r.0);
                self.rttvar = SimTime((3 * self.rttvar.0 + err) / 4);
                self.srtt = Some(SimTime((7 * srtt.0 + r.0) / 8));
            }
        }
    }

    pub fn srtt(&self) -> Option<SimTime> {
        self.srtt
    }

    pub fn rto(&self, cfg: &TcpConfig) -> SimTime {
        let Some(srtt) = self.srtt else {
            return cfg.init_rto;
        };
        let var = SimTime(self.rttvar.0.saturating_mul(4)).max(Self::GRANULARITY);
        srtt.saturating_add(var).clamp(cfg.min_rto, cfg.max_rto.max(cfg.min_rto))
    }
}

#[derive(Debug)]
pub struct TcpConn {
    pub id: TcpConnId,
    pub src: NodeId,
    pub dst: NodeId,
    pub dst_port: u16,
    pub cfg: TcpConfig,
    state: TcpState,
    cc: Box<dyn CongestionOps>,
    tcb: TcpCb,
    /// 0 表示不限量
    max_bytes: u64,

    // sender
    high_tx: u64,
    dup_acks: u32,
    recover: Option<u64>,
    rtt: RttEstimator,
    rto: SimTime,
    timer_gen: u64,
    timer_armed: bool,
    syn_sent_at: Option<SimTime>,
    syn_retransmitted: bool,
    inflight: BTreeMap<u64, SentSeg>, // seq -> segment

    // receiver
    sink: Option<AppId>,
    rcv_nxt: u64,
    ooo: BTreeMap<u64, u32>,

    // stats
    established_at: Option<SimTime>,
    retransmits: u64,
    timeouts: u64,
}

impl TcpConn {
    pub fn new(
        id: TcpConnId,
        src: NodeId,
        dst: NodeId,
        dst_port: u16,
        max_bytes: u64,
        cfg: TcpConfig,
        variant: TcpVariant,
    ) -> Self {
        let mss = cfg.mss.max(1);
        let cwnd = (cfg.init_cwnd_segs.max(1) as u64).saturating_mul(mss as u64);
        let ssthresh = cfg.init_ssthresh_bytes.max(2 * mss as u64);
        let rto = cfg.init_rto;
        Self {
            id,
            src,
            dst,
            dst_port,
            cfg,
            state: TcpState::SynSent,
            cc: variant.build(),
            tcb: TcpCb::new(mss, cwnd, ssthresh),
            max_bytes,
            high_tx: 0,
            dup_acks: 0,
            recover: None,
            rtt: RttEstimator::default(),
            rto,
            timer_gen: 0,
            timer_armed: false,
            syn_sent_at: None,
            syn_retransmitted: false,
            inflight: BTreeMap::new(),
            sink: None,
            rcv_nxt: 0,
            ooo: BTreeMap::new(),
            established_at: None,
            retransmits: 0,
            timeouts: 0,
        }
    }

    pub fn state(&self) -> TcpState {
        self.state
    }

    pub fn congestion_ops(&self) -> &str {
        self.cc.name()
    }

    pub fn cwnd_bytes(&self) -> u64 {
        self.tcb.cwnd
    }

    pub fn ssthresh_bytes(&self) -> u64 {
        self.tcb.ssthresh
    }

    pub fn bytes_acked(&self) -> u64 {
        self.tcb.snd_una
    }

    /// 接收端按序交付给应用的字节数
    pub fn bytes_received(&self) -> u64 {
        self.rcv_nxt
    }

    pub fn srtt(&self) -> Option<SimTime> {
        self.rtt.srtt()
    }

    pub fn established_at(&self) -> Option<SimTime> {
        self.established_at
    }

    pub fn retransmits(&self) -> u64 {
        self.retransmits
    }

    pub fn timeouts(&self) -> u64 {
        self.timeouts
    }

    fn emit(
        &self,
        seg: TcpSegment,
        from: NodeId,
        to: NodeId,
        payload: u32,
        sim: &mut Simulator,
        net: &mut Network,
    ) {
        let size = payload.saturating_add(self.cfg.header_bytes);
        let pkt = net.make_packet(self.id, size, from, to, Transport::Tcp(seg));
        net.forward_from(from, pkt, sim);
    }

    fn arm_timer(&mut self, sim: &mut Simulator) {
        self.timer_gen = self.timer_gen.wrapping_add(1);
        self.timer_armed = true;
        sim.schedule_in(
            self.rto,
            TcpRto {
                conn_id: self.id,
                generation: self.timer_gen,
            },
        );
    }

    fn cancel_timer(&mut self) {
        self.timer_gen = self.timer_gen.wrapping_add(1);
        self.timer_armed = false;
    }

    fn send_syn(&mut self, sim: &mut Simulator, net: &mut Network) {
        if self.syn_sent_at.is_some() {
            self.syn_retransmitted = true;
        }
        self.syn_sent_at = Some(sim.now());
        self.emit(
            TcpSegment::Syn {
                dst_port: self.dst_port,
            },
            self.src,
            self.dst,
            0,
            sim,
            net,
        );
        self.arm_timer(sim);
    }

    fn transmit(&mut self, seq: u64, len: u32, sim: &mut Simulator, net: &mut Network) {
        let retrans = seq < self.high_tx;
        if retrans {
            self.retransmits += 1;
        }
        self.high_tx = self.high_tx.max(seq + len as u64);
        self.inflight.insert(
            seq,
            SentSeg {
                len,
                sent_at: sim.now(),
                retrans,
            },
        );
        trace!(conn_id = self.id, seq, len, retrans, "发送数据段");
        self.emit(TcpSegment::Data { seq, len }, self.src, self.dst, len, sim, net);
        if !self.timer_armed {
            self.arm_timer(sim);
        }
    }

    /// 在 min(cwnd, rwnd) 允许的范围内发送新数据
    fn send_data_if_possible(&mut self, sim: &mut Simulator, net: &mut Network) {
        if self.state != TcpState::Established {
            return;
        }
        let mss = self.tcb.mss();
        let wnd = self.tcb.cwnd.min(self.cfg.rcv_wnd_bytes).max(mss);
        loop {
            let remaining = if self.max_bytes == 0 {
                u64::MAX
            } else {
                self.max_bytes.saturating_sub(self.tcb.snd_nxt)
            };
            let len = mss.min(remaining);
            if len == 0 || self.tcb.bytes_in_flight() + len > wnd {
                break;
            }
            let seq = self.tcb.snd_nxt;
            self.transmit(seq, len as u32, sim, net);
            self.tcb.snd_nxt += len;
        }
    }

    fn retransmit_head(&mut self, sim: &mut Simulator, net: &mut Network) {
        let seq = self.tcb.snd_una;
        let len = self.inflight.get(&seq).map_or_else(
            || self.tcb.mss().min(self.high_tx.saturating_sub(seq)) as u32,
            |s| s.len,
        );
        if len > 0 {
            self.transmit(seq, len, sim, net);
        }
    }

    fn on_syn_ack(&mut self, sim: &mut Simulator, net: &mut Network) {
        if self.state != TcpState::SynSent {
            return;
        }
        let now = sim.now();
        self.state = TcpState::Established;
        self.established_at = Some(now);
        if let (Some(at), false) = (self.syn_sent_at, self.syn_retransmitted) {
            let sample = now.saturating_sub(at);
            self.rtt.sample(sample);
            self.tcb.last_rtt = Some(sample);
            self.tcb.min_rtt = Some(sample);
        }
        self.rto = self.rtt.rto(&self.cfg);
        self.cancel_timer();
        debug!(conn_id = self.id, cc = self.cc.name(), "连接已建立");
        self.send_data_if_possible(sim, net);
    }

    fn on_ack(&mut self, ack: u64, sim: &mut Simulator, net: &mut Network) {
        if self.state != TcpState::Established {
            return;
        }
        self.tcb.now = sim.now();

        if ack > self.tcb.snd_una {
            self.on_new_ack(ack, sim, net);
        } else if ack == self.tcb.snd_una && self.tcb.bytes_in_flight() > 0 {
            self.on_dup_ack(sim, net);
        }
    }

    fn on_new_ack(&mut self, ack: u64, sim: &mut Simulator, net: &mut Network) {
        let now = sim.now();
        let mss = self.tcb.mss();
        let acked_bytes = ack - self.tcb.snd_una;

        // 最新被完整确认且未重传过的段给出 RTT 样本（Karn）
        let mut sample = None;
        let done: Vec<u64> = self
            .inflight
            .range(..ack)
            .filter(|(s, seg)| *s + seg.len as u64 <= ack)
            .map(|(s, _)| *s)
            .collect();
        for s in done {
            if let Some(seg) = self.inflight.remove(&s) {
                if !seg.retrans {
                    sample = Some(now.saturating_sub(seg.sent_at));
                }
            }
        }

        self.tcb.snd_una = ack;
        self.tcb.snd_nxt = self.tcb.snd_nxt.max(ack);
        self.high_tx = self.high_tx.max(ack);
        if let Some(r) = sample {
            self.rtt.sample(r);
            self.tcb.last_rtt = Some(r);
            self.tcb.min_rtt = Some(self.tcb.min_rtt.map_or(r, |m| m.min(r)));
        }
        self.rto = self.rtt.rto(&self.cfg);

        let segments_acked = acked_bytes.div_ceil(mss) as u32;
        self.cc.pkts_acked(&self.tcb, segments_acked, sample);

        match self.recover {
            Some(recover) if ack < recover => {
                // 部分 ACK：重传下一个空洞，窗口收缩已确认的量
                self.tcb.cwnd = self.tcb.cwnd.saturating_sub(acked_bytes).saturating_add(mss).max(mss);
                self.retransmit_head(sim, net);
            }
            Some(_) => {
                self.recover = None;
                self.dup_acks = 0;
                self.tcb.cwnd = self.tcb.ssthresh.max(mss);
                self.cc.on_event(&self.tcb, CongestionEvent::RecoveryExit);
            }
            None => {
                self.dup_acks = 0;
                self.cc.increase_window(&mut self.tcb, segments_acked);
                self.tcb.cwnd = self.tcb.cwnd.max(mss);
            }
        }

        if self.tcb.bytes_in_flight() == 0 {
            self.cancel_timer();
        } else {
            self.arm_timer(sim);
        }
        self.send_data_if_possible(sim, net);
    }

    fn on_dup_ack(&mut self, sim: &mut Simulator, net: &mut Network) {
        let mss = self.tcb.mss();
        self.dup_acks = self.dup_acks.saturating_add(1);

        if self.recover.is_none() && self.dup_acks == self.cfg.dup_ack_threshold {
            let in_flight = self.tcb.bytes_in_flight();
            let ssthresh = self.cc.ssthresh(&self.tcb, in_flight).max(2 * mss);
            self.tcb.ssthresh = ssthresh;
            self.tcb.cwnd = ssthresh.saturating_add(3 * mss);
            self.recover = Some(self.high_tx);
            self.cc.on_event(&self.tcb, CongestionEvent::FastRetransmit);
            debug!(conn_id = self.id, ssthresh, "快速重传");
            self.retransmit_head(sim, net);
            self.arm_timer(sim);
        } else if self.recover.is_some() {
            // 快速恢复：每个额外 dupACK 膨胀一个 MSS
            self.tcb.cwnd = self.tcb.cwnd.saturating_add(mss);
            self.send_data_if_possible(sim, net);
        }
    }

    fn on_timeout(&mut self, sim: &mut Simulator, net: &mut Network) {
        self.timer_armed = false;
        self.timeouts += 1;
        self.rto = SimTime(self.rto.0.saturating_mul(2)).min(self.cfg.max_rto);

        if self.state == TcpState::SynSent {
            debug!(conn_id = self.id, rto = ?self.rto, "SYN 超时重发");
            self.send_syn(sim, net);
            return;
        }
        let in_flight = self.tcb.bytes_in_flight();
        if in_flight == 0 {
            return;
        }

        let mss = self.tcb.mss();
        self.tcb.now = sim.now();
        self.tcb.ssthresh = self.cc.ssthresh(&self.tcb, in_flight).max(2 * mss);
        self.tcb.cwnd = mss;
        self.recover = None;
        self.dup_acks = 0;
        self.cc.on_event(&self.tcb, CongestionEvent::Timeout);
        debug!(conn_id = self.id, seq = self.tcb.snd_una, rto = ?self.rto, "RTO 超时，从 snd_una 重发");

        self.inflight.clear();
        self.tcb.snd_nxt = self.tcb.snd_una;
        self.send_data_if_possible(sim, net);
    }

    fn on_syn(&mut self, dst_port: u16, sim: &mut Simulator, net: &mut Network) {
        let Some(sink) = net.apps.listener(self.dst, dst_port) else {
            debug!(conn_id = self.id, node = ?self.dst, port = dst_port, "端口无监听，丢弃 SYN");
            return;
        };
        if self.sink.is_none() {
            net.apps.accept(sink);
            self.sink = Some(sink);
        }
        self.emit(TcpSegment::SynAck, self.dst, self.src, 0, sim, net);
    }

    fn on_data(&mut self, seq: u64, len: u32, sim: &mut Simulator, net: &mut Network) {
        let Some(sink) = self.sink else {
            return;
        };
        let mut delivered = 0u64;
        if seq == self.rcv_nxt {
            self.rcv_nxt += len as u64;
            delivered += len as u64;
            while let Some(l) = self.ooo.remove(&self.rcv_nxt) {
                self.rcv_nxt += l as u64;
                delivered += l as u64;
            }
            self.ooo = self.ooo.split_off(&self.rcv_nxt);
        } else if seq > self.rcv_nxt {
            self.ooo.entry(seq).or_insert(len);
        }
        if delivered > 0 {
            net.apps.deliver(sink, delivered);
        }
        // 无论是否乱序都回累计 ACK（dupACK 体现为 ack 不前进）
        self.emit(
            TcpSegment::Ack { ack: self.rcv_nxt },
            self.dst,
            self.src,
            0,
            sim,
            net,
        );
    }
}

#[derive(Debug, Default)]
pub struct TcpStack {
    conns: HashMap<TcpConnId, TcpConn>,
    next_id: TcpConnId,
}

impl TcpStack {
    pub fn next_conn_id(&mut self) -> TcpConnId {
        self.next_id += 1;
        self.next_id
    }

    pub fn get(&self, id: TcpConnId) -> Option<&TcpConn> {
        self.conns.get(&id)
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }

    /// 登记连接并发出 SYN
    pub fn connect(&mut self, conn: TcpConn, sim: &mut Simulator, net: &mut Network) {
        let id = conn.id;
        let conn = self.conns.entry(id).or_insert(conn);
        debug!(conn_id = id, src = ?conn.src, dst = ?conn.dst, port = conn.dst_port, "发起连接");
        conn.send_syn(sim, net);
    }

    pub(crate) fn on_segment(
        &mut self,
        conn_id: TcpConnId,
        at: NodeId,
        seg: TcpSegment,
        sim: &mut Simulator,
        net: &mut Network,
    ) {
        let Some(conn) = self.conns.get_mut(&conn_id) else {
            return;
        };
        match seg {
            TcpSegment::Syn { dst_port } if at == conn.dst => conn.on_syn(dst_port, sim, net),
            TcpSegment::Data { seq, len } if at == conn.dst => conn.on_data(seq, len, sim, net),
            TcpSegment::SynAck if at == conn.src => conn.on_syn_ack(sim, net),
            TcpSegment::Ack { ack } if at == conn.src => conn.on_ack(ack, sim, net),
            // 不是该方向的端点：理论上不会发生
            _ => {}
        }
    }

    fn on_rto(&mut self, conn_id: TcpConnId, generation: u64, sim: &mut Simulator, net: &mut Network) {
        let Some(conn) = self.conns.get_mut(&conn_id) else {
            return;
        };
        if !conn.timer_armed || conn.timer_gen != generation {
            return;
        }
        conn.on_timeout(sim, net);
    }
}

/// TCP RTO 事件：只有最近一次设置的定时器（generation 相同）才生效
#[derive(Debug)]
pub struct TcpRto {
    pub conn_id: TcpConnId,
    pub generation: u64,
}

impl Event for TcpRto {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let TcpRto { conn_id, generation } = *self;
        let w = NetWorld::downcast(world);
        // 规避同时借用 `w.net` 与 `w.net.tcp`
        let mut tcp = std::mem::take(&mut w.net.tcp);
        tcp.on_rto(conn_id, generation, sim, &mut w.net);
        w.net.tcp = tcp;
    }
}
