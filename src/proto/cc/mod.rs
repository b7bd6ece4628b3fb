//! 拥塞控制（congestion control）
//!
//! TCP 连接把窗口增长与丢包后的门限计算委托给 `CongestionOps`。
//! 每个变体一个文件，规则取自各自的论文/RFC，做了仿真所需的简化。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sim::SimTime;

mod bic;
mod highspeed;
mod htcp;
mod hybla;
mod illinois;
mod new_reno;
mod scalable;
mod vegas;
mod veno;
mod westwood;
mod yeah;

pub use bic::Bic;
pub use highspeed::HighSpeed;
pub use htcp::Htcp;
pub use hybla::Hybla;
pub use illinois::Illinois;
pub use new_reno::NewReno;
pub use scalable::Scalable;
pub use vegas::Vegas;
pub use veno::Veno;
pub use westwood::Westwood;
pub use yeah::Yeah;

/// 拥塞控制看到的连接状态（字节为单位）
#[derive(Debug, Clone, PartialEq)]
pub struct TcpCb {
    pub cwnd: u64,
    pub ssthresh: u64,
    pub mss: u32,
    pub now: SimTime,
    /// 第一个未确认字节
    pub snd_una: u64,
    /// 下一个要发送的字节
    pub snd_nxt: u64,
    pub last_rtt: Option<SimTime>,
    pub min_rtt: Option<SimTime>,
}

impl TcpCb {
    pub fn new(mss: u32, cwnd: u64, ssthresh: u64) -> Self {
        Self {
            cwnd,
            ssthresh,
            mss,
            now: SimTime::ZERO,
            snd_una: 0,
            snd_nxt: 0,
            last_rtt: None,
            min_rtt: None,
        }
    }

    pub fn mss(&self) -> u64 {
        self.mss as u64
    }

    pub fn in_slow_start(&self) -> bool {
        self.cwnd < self.ssthresh
    }

    pub fn cwnd_segs(&self) -> u64 {
        self.cwnd / self.mss().max(1)
    }

    pub fn bytes_in_flight(&self) -> u64 {
        self.snd_nxt.saturating_sub(self.snd_una)
    }
}

/// 通知拥塞控制的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CongestionEvent {
    /// 3 个重复 ACK，进入快速恢复
    FastRetransmit,
    /// 超时重传
    Timeout,
    /// 快速恢复结束
    RecoveryExit,
}

/// 拥塞控制算法接口
pub trait CongestionOps: fmt::Debug + Send {
    fn name(&self) -> &'static str;

    /// 收到推进 snd_una 的 ACK 后增长 cwnd
    fn increase_window(&mut self, tcb: &mut TcpCb, segments_acked: u32);

    /// 发生丢包时的新 ssthresh（字节）
    fn ssthresh(&mut self, tcb: &TcpCb, bytes_in_flight: u64) -> u64;

    /// 每个新 ACK 调用一次，`rtt` 为本次 RTT 样本（重传段不采样）
    fn pkts_acked(&mut self, _tcb: &TcpCb, _segments_acked: u32, _rtt: Option<SimTime>) {}

    fn on_event(&mut self, _tcb: &TcpCb, _ev: CongestionEvent) {}
}

/// 慢启动：每个被确认的段让 cwnd 增加一个 MSS，不越过 ssthresh。
/// 返回剩余未消耗的段数（用于切换到拥塞避免）。
pub(crate) fn slow_start(tcb: &mut TcpCb, segments_acked: u32) -> u32 {
    let mut left = segments_acked;
    while left > 0 && tcb.in_slow_start() {
        tcb.cwnd = tcb.cwnd.saturating_add(tcb.mss()).min(tcb.ssthresh.max(tcb.mss()));
        left -= 1;
    }
    left
}

/// Reno 拥塞避免：每个被确认的段增加 max(1, mss^2/cwnd)
pub(crate) fn reno_avoidance(tcb: &mut TcpCb, segments_acked: u32) {
    let mss = tcb.mss();
    for _ in 0..segments_acked {
        let inc = (mss.saturating_mul(mss) / tcb.cwnd.max(1)).max(1);
        tcb.cwnd = tcb.cwnd.saturating_add(inc);
    }
}

/// 丢包后减半（至少 2 个 MSS）
pub(crate) fn reno_ssthresh(tcb: &TcpCb, bytes_in_flight: u64) -> u64 {
    (bytes_in_flight / 2).max(2 * tcb.mss())
}

/// 以浮点增量增长 cwnd，小数部分累计到 `frac`
pub(crate) fn grow_fractional(tcb: &mut TcpCb, frac: &mut f64, inc_bytes: f64) {
    if !inc_bytes.is_finite() || inc_bytes <= 0.0 {
        return;
    }
    *frac += inc_bytes;
    let whole = frac.floor();
    if whole >= 1.0 {
        *frac -= whole;
        tcb.cwnd = tcb.cwnd.saturating_add(whole as u64);
    }
}

/// 引擎层的传输协议标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TcpVariant {
    #[default]
    NewReno,
    Hybla,
    HighSpeed,
    Htcp,
    Vegas,
    Scalable,
    Veno,
    Bic,
    Yeah,
    Illinois,
    Westwood,
}

impl TcpVariant {
    pub const ALL: [TcpVariant; 11] = [
        TcpVariant::NewReno,
        TcpVariant::Hybla,
        TcpVariant::HighSpeed,
        TcpVariant::Htcp,
        TcpVariant::Vegas,
        TcpVariant::Scalable,
        TcpVariant::Veno,
        TcpVariant::Bic,
        TcpVariant::Yeah,
        TcpVariant::Illinois,
        TcpVariant::Westwood,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TcpVariant::NewReno => "TcpNewReno",
            TcpVariant::Hybla => "TcpHybla",
            TcpVariant::HighSpeed => "TcpHighSpeed",
            TcpVariant::Htcp => "TcpHtcp",
            TcpVariant::Vegas => "TcpVegas",
            TcpVariant::Scalable => "TcpScalable",
            TcpVariant::Veno => "TcpVeno",
            TcpVariant::Bic => "TcpBic",
            TcpVariant::Yeah => "TcpYeah",
            TcpVariant::Illinois => "TcpIllinois",
            TcpVariant::Westwood => "TcpWestwood",
        }
    }

    /// 为一条新连接实例化拥塞控制状态
    pub fn build(self) -> Box<dyn CongestionOps> {
        match self {
            TcpVariant::NewReno => Box::new(NewReno),
            TcpVariant::Hybla => Box::new(Hybla::default()),
            TcpVariant::HighSpeed => Box::new(HighSpeed::default()),
            TcpVariant::Htcp => Box::new(Htcp::default()),
            TcpVariant::Vegas => Box::new(Vegas::default()),
            TcpVariant::Scalable => Box::new(Scalable::default()),
            TcpVariant::Veno => Box::new(Veno::default()),
            TcpVariant::Bic => Box::new(Bic::default()),
            TcpVariant::Yeah => Box::new(Yeah::default()),
            TcpVariant::Illinois => Box::new(Illinois::default()),
            TcpVariant::Westwood => Box::new(Westwood::default()),
        }
    }
}

impl fmt::Display for TcpVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 以“一个 RTT 的数据全部被确认”为一轮的计数器（Vegas 一族使用）
#[derive(Debug, Clone, Default)]
pub(crate) struct RoundTracker {
    beg_snd_nxt: u64,
}

impl RoundTracker {
    /// 本轮是否结束；结束时以当前 snd_nxt 开始新一轮
    pub(crate) fn round_done(&mut self, tcb: &TcpCb) -> bool {
        if tcb.snd_una >= self.beg_snd_nxt {
            self.beg_snd_nxt = tcb.snd_nxt;
            true
        } else {
            false
        }
    }
}

/// 一轮内的 RTT 统计
#[derive(Debug, Clone, Default)]
pub(crate) struct RttRound {
    pub base_rtt: Option<SimTime>,
    pub min_rtt: Option<SimTime>,
    pub max_rtt: Option<SimTime>,
    pub sum_ns: u128,
    pub cnt: u32,
}

impl RttRound {
    pub(crate) fn sample(&mut self, rtt: SimTime) {
        self.base_rtt = Some(self.base_rtt.map_or(rtt, |b| b.min(rtt)));
        self.min_rtt = Some(self.min_rtt.map_or(rtt, |m| m.min(rtt)));
        self.max_rtt = Some(self.max_rtt.map_or(rtt, |m| m.max(rtt)));
        self.sum_ns += rtt.0 as u128;
        self.cnt += 1;
    }

    pub(crate) fn avg_rtt(&self) -> Option<SimTime> {
        (self.cnt > 0).then(|| SimTime((self.sum_ns / self.cnt as u128) as u64))
    }

    /// 清空本轮数据（保留 base_rtt）
    pub(crate) fn reset_round(&mut self) {
        self.min_rtt = None;
        self.max_rtt = None;
        self.sum_ns = 0;
        self.cnt = 0;
    }
}
