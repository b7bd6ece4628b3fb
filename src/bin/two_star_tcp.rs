//! 双星形 TCP 瓶颈实验
//!
//! 两个星形子网的 hub 之间通过 1Mbps/20ms 链路相连，发送端每个 spoke
//! 向接收端对应 spoke 做批量传输，60 秒后输出每个 sink 的吞吐量。

use std::process::ExitCode;

use clap::Parser;
use star_tcp_sim::engine::NetEngine;
use star_tcp_sim::experiment::{ExperimentConfig, run_experiment};

#[derive(Debug, Parser)]
#[command(name = "two_star_tcp", about = "双星形拓扑 TCP 瓶颈实验")]
struct Args {
    /// 每个星形的 spoke 数
    #[arg(long = "nSpokes", default_value_t = 8)]
    n_spokes: u32,

    /// 使用的 TCP 协议（TcpNewReno、TcpHybla、TcpWestwood ...）
    #[arg(long = "Protocol", default_value = "TcpHybla")]
    protocol: String,
}

fn main() -> ExitCode {
    // 日志写 stderr，stdout 只留给结果
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let cfg = ExperimentConfig {
        n_spokes: args.n_spokes,
        protocol: args.protocol,
        ..ExperimentConfig::default()
    };

    let mut engine = NetEngine::new();
    match run_experiment(&mut engine, &cfg) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("two_star_tcp: {e}");
            ExitCode::FAILURE
        }
    }
}
