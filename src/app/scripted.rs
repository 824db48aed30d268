//! Network-free `SnapshotSource` for exercising the orchestration layer.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use crate::fetch::{FetchError, FetchResult, SnapshotSource};
use crate::records::{Record, Snapshot};

#[derive(Debug, Clone)]
pub enum Outcome {
    Data(Snapshot),
    /// Snapshot holding one record tagged with the 1-based call number.
    Numbered,
    Unavailable,
    Malformed,
    /// Never completes within any reasonable bound.
    Hang,
}

pub struct ScriptedSource {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Outcome,
    latency: Duration,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn always(outcome: Outcome) -> Self {
        Self::scripted(Vec::new(), outcome)
    }

    pub fn scripted(script: Vec<Outcome>, fallback: Outcome) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn snapshot_of(symbols: &[&str]) -> Snapshot {
    symbols
        .iter()
        .map(|symbol| {
            let mut record = Record::new();
            record.insert("symbol".to_string(), json!(symbol));
            record
        })
        .collect::<Vec<_>>()
        .into()
}

#[async_trait]
impl SnapshotSource for ScriptedSource {
    async fn fetch_snapshot(&self) -> FetchResult<Snapshot> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match outcome {
            Outcome::Data(snapshot) => Ok(snapshot),
            Outcome::Numbered => Ok(snapshot_of(&[&format!("SYM{call}")])),
            Outcome::Unavailable => Err(FetchError::from_status(
                "http://upstream.test/api",
                StatusCode::SERVICE_UNAVAILABLE,
            )),
            Outcome::Malformed => Err(FetchError::malformed("body is not valid JSON")),
            Outcome::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                Ok(Snapshot::empty())
            }
        }
    }
}
