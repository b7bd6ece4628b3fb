//! 双星形 TCP 瓶颈实验
//!
//! 搭建两个星形子网，hub 之间用一条慢链路相连；发送端星形的每个 spoke
//! 向接收端星形对应下标的 spoke 做批量传输，运行结束后汇总各 sink 的吞吐量。
//!
//! 流程：Configured → TopologyBuilt → Addressed → Wired → Routed → Running → Reported

pub mod protocol;
pub mod report;
pub mod traffic;

pub use protocol::{PROTOCOL_NAMES, variant_for_name};
pub use report::{SinkThroughput, ThroughputReport, format_g, megabits};
pub use traffic::{FlowPair, TrafficOpts, TrafficPlan, wire_bulk_traffic};

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::engine::{DevicePair, Engine, LinkProfile};
use crate::error::Result;
use crate::proto::StackConfig;
use crate::sim::SimTime;
use crate::topo::{Ipv4AddressHelper, Ipv4InterfaceContainer, StarTopology, build_star, connect_hubs};
use tracing::info;

/// 实验参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperimentConfig {
    pub n_spokes: u32,
    pub protocol: String,
    pub seed: u64,
    pub spoke_link: LinkProfile,
    /// hub 之间的链路（瓶颈）
    pub interconnect_link: LinkProfile,
    pub star_a_base: Ipv4Addr,
    pub star_b_base: Ipv4Addr,
    pub interconnect_base: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub traffic: TrafficOpts,
    pub stop_time: SimTime,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            n_spokes: 8,
            protocol: "TcpHybla".to_string(),
            seed: 1,
            spoke_link: LinkProfile::mbps(5, SimTime::from_millis(10)),
            interconnect_link: LinkProfile::mbps(1, SimTime::from_millis(20)),
            star_a_base: Ipv4Addr::new(10, 1, 1, 0),
            star_b_base: Ipv4Addr::new(10, 2, 1, 0),
            interconnect_base: Ipv4Addr::new(10, 3, 1, 0),
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            traffic: TrafficOpts::default(),
            stop_time: SimTime::from_secs(60),
        }
    }
}

impl ExperimentConfig {
    /// 从 JSON 读取；缺省字段取默认值
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// 按协议名得到协议栈配置；未知名字使用默认传输协议
    pub fn stack(&self) -> StackConfig {
        let mut stack = StackConfig::default();
        stack.select_protocol(&self.protocol);
        stack
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Configured,
    TopologyBuilt,
    Addressed,
    Wired,
    Routed,
    Running,
    Reported,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// 搭建完成、尚未运行的实验
#[derive(Debug, Clone)]
pub struct ExperimentSetup {
    phase: Phase,
    pub star_a: StarTopology,
    pub star_b: StarTopology,
    pub interconnect: DevicePair,
    pub interconnect_addresses: Ipv4InterfaceContainer,
    pub plan: TrafficPlan,
    pub stack: StackConfig,
}

fn enter(phase: &mut Phase, next: Phase) {
    info!(from = %phase, to = %next, "实验阶段切换");
    *phase = next;
}

/// 搭建拓扑、分配地址、布置流量并生成路由
pub fn build_experiment<E: Engine + ?Sized>(
    engine: &mut E,
    cfg: &ExperimentConfig,
) -> Result<ExperimentSetup> {
    let mut phase = Phase::Configured;
    let stack = cfg.stack();
    info!(
        n_spokes = cfg.n_spokes,
        protocol = %cfg.protocol,
        transport = %stack.transport,
        seed = cfg.seed,
        "配置实验"
    );
    engine.set_seed(cfg.seed);

    // 每个 spoke 占两个地址（hub 侧 + spoke 侧），建拓扑之前先确认网段放得下
    let star_hosts = 2 * u64::from(cfg.n_spokes);
    for base in [cfg.star_a_base, cfg.star_b_base] {
        Ipv4AddressHelper::new(base, cfg.netmask)?.check_capacity(star_hosts)?;
    }

    let mut star_a = build_star(engine, "a", cfg.n_spokes, &cfg.spoke_link)?;
    let mut star_b = build_star(engine, "b", cfg.n_spokes, &cfg.spoke_link)?;
    star_a.install_stack(engine, &stack)?;
    star_b.install_stack(engine, &stack)?;
    let interconnect = connect_hubs(engine, star_a.hub(), star_b.hub(), &cfg.interconnect_link)?;
    enter(&mut phase, Phase::TopologyBuilt);

    let mut helper = Ipv4AddressHelper::new(cfg.star_a_base, cfg.netmask)?;
    star_a.assign_ipv4_addresses(engine, &mut helper)?;
    helper.set_base(cfg.star_b_base, cfg.netmask)?;
    star_b.assign_ipv4_addresses(engine, &mut helper)?;
    helper.set_base(cfg.interconnect_base, cfg.netmask)?;
    let interconnect_addresses = helper.assign(engine, &[interconnect.a, interconnect.b])?;
    enter(&mut phase, Phase::Addressed);

    let plan = wire_bulk_traffic(engine, &star_a, &star_b, &cfg.traffic)?;
    enter(&mut phase, Phase::Wired);

    engine.populate_routing_tables();
    enter(&mut phase, Phase::Routed);

    Ok(ExperimentSetup {
        phase,
        star_a,
        star_b,
        interconnect,
        interconnect_addresses,
        plan,
        stack,
    })
}

impl ExperimentSetup {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 运行到 `stop` 并读取所有 sink 的计数
    pub fn run<E: Engine + ?Sized>(
        &mut self,
        engine: &mut E,
        stop: SimTime,
    ) -> Result<ThroughputReport> {
        enter(&mut self.phase, Phase::Running);
        engine.run(stop)?;

        let bytes = self
            .plan
            .sinks()
            .map(|app| engine.sink_total_rx(app))
            .collect::<Result<Vec<_>>>()?;
        let report = ThroughputReport::from_rx_bytes(&bytes, stop.as_secs_f64());
        enter(&mut self.phase, Phase::Reported);
        info!(
            total_rx_bytes = report.total_rx_bytes,
            throughput_mbps = report.throughput_mbps,
            "实验结束"
        );
        Ok(report)
    }
}

/// 完整跑一次实验
pub fn run_experiment<E: Engine + ?Sized>(
    engine: &mut E,
    cfg: &ExperimentConfig,
) -> Result<ThroughputReport> {
    let mut setup = build_experiment(engine, cfg)?;
    setup.run(engine, cfg.stop_time)
}
