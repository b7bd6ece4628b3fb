//! 事件与世界 trait
//!
//! 仿真器只认识这两个接口：事件负责改变世界状态，世界由上层（网络引擎）实现。

use super::simulator::Simulator;
use std::any::Any;

/// 事件：在调度时刻被执行一次，执行时拿到所有权（`self: Box<Self>`）。
pub trait Event: Send + 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World);
}

/// 仿真世界：事件通过 `as_any_mut` 向下转型到具体世界类型。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// 每个事件执行完后回调一次
    fn on_tick(&mut self, _sim: &mut Simulator) {}
}
