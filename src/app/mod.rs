pub mod bootstrap;
pub mod orchestrator;
pub mod refresher;

#[cfg(test)]
pub(crate) mod scripted;

pub use orchestrator::SnapshotOrchestrator;
pub use refresher::{spawn_periodic_refresh, RefreshHandle, RefreshRound};
