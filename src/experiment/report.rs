//! 吞吐量汇总

use std::fmt;

use serde::Serialize;

/// 字节数 -> 兆比特
pub fn megabits(bytes: u64) -> f64 {
    bytes as f64 * 1e-6 * 8.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinkThroughput {
    pub index: usize,
    pub rx_bytes: u64,
    pub total_rx_mb: f64,
    pub throughput_mbps: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThroughputReport {
    pub stop_secs: f64,
    pub sinks: Vec<SinkThroughput>,
    pub total_rx_bytes: u64,
    pub total_rx_mb: f64,
    pub throughput_mbps: f64,
}

impl ThroughputReport {
    /// `bytes[i]` 为第 i 个 sink 的累计接收字节；汇总按总字节数计算。
    pub fn from_rx_bytes(bytes: &[u64], stop_secs: f64) -> Self {
        let rate = |mb: f64| if stop_secs > 0.0 { mb / stop_secs } else { 0.0 };
        let sinks = bytes
            .iter()
            .enumerate()
            .map(|(index, &rx_bytes)| {
                let mb = megabits(rx_bytes);
                SinkThroughput {
                    index,
                    rx_bytes,
                    total_rx_mb: mb,
                    throughput_mbps: rate(mb),
                }
            })
            .collect();
        let total_rx_bytes = bytes.iter().sum();
        let total_rx_mb = megabits(total_rx_bytes);
        Self {
            stop_secs,
            sinks,
            total_rx_bytes,
            total_rx_mb,
            throughput_mbps: rate(total_rx_mb),
        }
    }
}

impl fmt::Display for ThroughputReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.sinks {
            writeln!(
                f,
                "Sink {}\tTotalRx: {}Mb\tThroughput: {}Mbps",
                s.index,
                format_g(s.total_rx_mb),
                format_g(s.throughput_mbps)
            )?;
        }
        writeln!(f)?;
        write!(
            f,
            "Totals\tTotalRx: {}Mb\tThroughput: {}Mbps",
            format_g(self.total_rx_mb),
            format_g(self.throughput_mbps)
        )
    }
}

/// 与 C 的 `%g` 一致：6 位有效数字，去掉末尾的 0，指数 < -4 或 >= 6 时用科学计数法
pub fn format_g(x: f64) -> String {
    const PREC: i32 = 6;
    if x == 0.0 {
        return "0".to_string();
    }
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // 先按有效数字舍入，再取指数，避免 9.999995 这类进位问题
    let sci = format!("{:.*e}", (PREC - 1) as usize, x);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= PREC {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (PREC - 1 - exp) as usize;
        trim_zeros(&format!("{x:.decimals$}")).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
