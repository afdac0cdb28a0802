use crate::config::DatasetEntry;
use crate::error::{ExplorerError, ExplorerResult};

/// Static mapping from dataset label to source identifier, fixed at startup.
#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    entries: Vec<DatasetEntry>,
}

impl DatasetRegistry {
    pub fn new(entries: Vec<DatasetEntry>) -> Self {
        DatasetRegistry { entries }
    }

    /// Labels in registration order.
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn resolve(&self, label: &str) -> ExplorerResult<&str> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.source.as_str())
            .ok_or_else(|| ExplorerError::UnknownDataset(label.to_string()))
    }
}
