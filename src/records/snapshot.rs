use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One upstream row, kept exactly as the market site returned it.
pub type Record = serde_json::Map<String, Value>;

/// Ordered batch of index records from a single successful retrieval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    records: Vec<Record>,
}

impl Snapshot {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Wrap the records in the `{"data": [...]}` shape served to clients.
    pub fn to_envelope(&self) -> Value {
        json!({ "data": self.records })
    }
}

impl From<Vec<Record>> for Snapshot {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}
