//! 统计信息
//!
//! 定义网络仿真统计数据结构。

/// 网络统计信息
#[derive(Debug, Default, Clone)]
pub struct Stats {
    pub delivered_pkts: u64,
    pub delivered_bytes: u64,
    /// 队列溢出丢包
    pub dropped_pkts: u64,
    pub dropped_bytes: u64,
    /// 路由表中没有下一跳
    pub unroutable_pkts: u64,
    /// 到达未安装协议栈的节点
    pub no_stack_pkts: u64,
}
