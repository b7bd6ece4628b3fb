//! 仿真核心模块
//!
//! 此模块包含事件驱动仿真的核心组件，如仿真时间、事件、世界和仿真器。

// 子模块声明
mod event;
mod simulator;
mod time;

// 重新导出公共接口
pub use event::{Event, World};
pub use simulator::Simulator;
pub use time::SimTime;
