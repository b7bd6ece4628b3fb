//! 传输层/协议模块
//!
//! 简化 TCP 与可插拔的拥塞控制变体。

pub mod cc;
pub mod tcp;

pub use cc::TcpVariant;
pub use tcp::TcpConfig;

/// 安装到节点上的协议栈配置。
///
/// `transport` 决定该节点上新建 TCP socket 使用的拥塞控制。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackConfig {
    pub transport: TcpVariant,
    pub tcp: TcpConfig,
}

impl StackConfig {
    pub fn with_transport(transport: TcpVariant) -> Self {
        Self {
            transport,
            tcp: TcpConfig::default(),
        }
    }
}
