mod cli;

use std::time::Duration;

use clap::Parser;

use market_snapshot::app::bootstrap::{build_orchestrator, resolve_config};
use market_snapshot::app::spawn_periodic_refresh;
use market_snapshot::utils::{current_human_timestamp, format_timestamp};
use market_snapshot::Result;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    init_logger();

    if let Err(err) = run(Cli::parse()).await {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Fetch { pretty } => {
            let orchestrator = build_orchestrator(config);
            let snapshot = orchestrator.fetch_market_snapshot().await;
            let envelope = snapshot.to_envelope();
            let text = if pretty {
                serde_json::to_string_pretty(&envelope)?
            } else {
                serde_json::to_string(&envelope)?
            };
            println!("{text}");
        }
        Commands::Watch {
            interval_secs,
            rounds,
        } => {
            let orchestrator = build_orchestrator(config);
            let handle = spawn_periodic_refresh(
                orchestrator.clone(),
                Duration::from_secs(interval_secs.max(1)),
            );
            let mut updates = handle.subscribe();

            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let latest = *updates.borrow_and_update();
                        let Some(round) = latest else {
                            continue;
                        };
                        let updated = orchestrator
                            .cache()
                            .last_updated()
                            .map(format_timestamp)
                            .unwrap_or_else(|| "never".to_string());
                        match round.failure {
                            None => log::info!(
                                "[{}] round {}: {} records (generation {})",
                                current_human_timestamp(),
                                round.round,
                                round.cached_records,
                                orchestrator.cache().generation()
                            ),
                            Some(kind) => log::warn!(
                                "[{}] round {} failed ({}); serving {} records last updated {}",
                                current_human_timestamp(),
                                round.round,
                                kind,
                                round.cached_records,
                                updated
                            ),
                        }
                        if rounds.is_some_and(|limit| round.round >= limit) {
                            break;
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        log::info!("Interrupted; stopping refresh loop");
                        break;
                    }
                }
            }

            handle.stop();
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
