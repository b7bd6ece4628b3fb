pub mod app;
pub mod engine;
pub mod error;
pub mod experiment;
pub mod net;
pub mod proto;
pub mod queue;
pub mod sim;
pub mod topo;

pub use error::{ExperimentError, Result};

#[cfg(test)]
mod test;
