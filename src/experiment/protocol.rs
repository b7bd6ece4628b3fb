//! 拥塞控制选择
//!
//! 协议名到 `TcpVariant` 的映射。选择结果写进 `StackConfig`，随协议栈安装到节点上。

use crate::proto::{StackConfig, TcpVariant};
use tracing::debug;

/// 可接受的协议名（`TcpWestwoodPlus` 与 `TcpWestwood` 指向同一个实现）
pub const PROTOCOL_NAMES: [&str; 12] = [
    "TcpNewReno",
    "TcpHybla",
    "TcpHighSpeed",
    "TcpHtcp",
    "TcpVegas",
    "TcpScalable",
    "TcpVeno",
    "TcpBic",
    "TcpYeah",
    "TcpIllinois",
    "TcpWestwood",
    "TcpWestwoodPlus",
];

pub fn variant_for_name(name: &str) -> Option<TcpVariant> {
    let v = match name {
        "TcpNewReno" => TcpVariant::NewReno,
        "TcpHybla" => TcpVariant::Hybla,
        "TcpHighSpeed" => TcpVariant::HighSpeed,
        "TcpHtcp" => TcpVariant::Htcp,
        "TcpVegas" => TcpVariant::Vegas,
        "TcpScalable" => TcpVariant::Scalable,
        "TcpVeno" => TcpVariant::Veno,
        "TcpBic" => TcpVariant::Bic,
        "TcpYeah" => TcpVariant::Yeah,
        "TcpIllinois" => TcpVariant::Illinois,
        "TcpWestwood" | "TcpWestwoodPlus" => TcpVariant::Westwood,
        _ => return None,
    };
    Some(v)
}

impl StackConfig {
    /// 按名字切换传输协议；未知名字保持原选择不变。
    ///
    /// 返回是否发生了切换。
    pub fn select_protocol(&mut self, name: &str) -> bool {
        match variant_for_name(name) {
            Some(v) => {
                self.transport = v;
                true
            }
            None => {
                debug!(name, kept = %self.transport, "未知协议名，保持当前传输协议");
                false
            }
        }
    }
}
