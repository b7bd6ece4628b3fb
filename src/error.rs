//! 实验错误类型

use std::net::Ipv4Addr;

use thiserror::Error;

use crate::net::{AppId, DeviceId, NodeId};

pub type Result<T, E = ExperimentError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("spoke 数必须 >= 1，实际为 {0}")]
    InvalidSpokeCount(u32),

    #[error("点到点链路两端是同一个节点 {0:?}")]
    SelfLoop(NodeId),

    #[error("非法网段 {base}/{mask}：掩码不连续或基地址含主机位")]
    InvalidNetwork { base: Ipv4Addr, mask: Ipv4Addr },

    #[error("网段 {base}/{mask} 剩余 {available} 个主机地址，需要 {requested} 个")]
    AddressExhausted {
        base: Ipv4Addr,
        mask: Ipv4Addr,
        requested: usize,
        available: usize,
    },

    #[error("网段 {base}/{mask} 与已使用的网段重叠")]
    AddressOverlap { base: Ipv4Addr, mask: Ipv4Addr },

    #[error("星形拓扑 `{0}` 尚未分配地址")]
    Unaddressed(String),

    #[error("两个星形拓扑规模不一致：{a} vs {b}")]
    MismatchedStars { a: usize, b: usize },

    #[error("未知节点 {0:?}")]
    UnknownNode(NodeId),

    #[error("未知设备 {0:?}")]
    UnknownDevice(DeviceId),

    #[error("未知应用 {0:?}（或不是 sink）")]
    UnknownApp(AppId),

    #[error("仿真引擎失败：{0}")]
    Engine(String),

    #[error("实验配置解析失败：{0}")]
    Config(#[from] serde_json::Error),
}
