use std::path::Path;
use std::sync::Arc;

use crate::app::SnapshotOrchestrator;
use crate::config::{load_config, validate_config, Config};
use crate::error::Result;

/// Resolve the effective config: the given JSON file, or the builtin profile.
pub fn resolve_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            load_config(path)
        }
        None => {
            let config = Config::builtin();
            validate_config(&config)?;
            Ok(config)
        }
    }
}

/// Entry point used by `main` to wire the fetcher stack.
pub fn build_orchestrator(config: Config) -> SnapshotOrchestrator {
    log::debug!(
        "Wiring snapshot fetcher for index `{}` at {} ({:?} mode)",
        config.upstream.index_name,
        config.upstream.base_url,
        config.refresh
    );
    SnapshotOrchestrator::from_config(Arc::new(config))
}
