//! Mock mark source for testing without database access.
//!
//! Serves payloads from memory (or from JSON files on disk) as if they were
//! live web service responses, and counts how often it is asked.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::MarkCode;

use super::error::SourceError;
use super::source::MarkSource;

#[derive(Debug, Default)]
struct MockState {
    payloads: HashMap<MarkCode, String>,
    unavailable: bool,
    calls: usize,
}

/// Mock source that serves canned payloads.
///
/// Clones share state, so a test can hand one clone to a fetcher and keep
/// another to inspect call counts or simulate an outage.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    state: Arc<Mutex<MockState>>,
}

impl MockSource {
    /// Create an empty mock source. Every mark is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load payloads from a directory.
    ///
    /// Expects files named `{CODE}.json` (e.g., `ABCD.json`).
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let data_dir = data_dir.as_ref();
        let mock = Self::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            SourceError::Unavailable(format!("failed to read mock data directory: {}", e))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                SourceError::Unavailable(format!("failed to read directory entry: {}", e))
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let Some(code) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| MarkCode::parse(s).ok())
            else {
                continue;
            };

            let json = std::fs::read_to_string(&path).map_err(|e| {
                SourceError::Unavailable(format!("failed to read {:?}: {}", path, e))
            })?;

            mock.insert(code, json);
        }

        Ok(mock)
    }

    /// Add a payload, builder style.
    pub fn with_mark(self, code: MarkCode, payload: impl Into<String>) -> Self {
        self.insert(code, payload);
        self
    }

    /// Add or replace a payload.
    pub fn insert(&self, code: MarkCode, payload: impl Into<String>) {
        self.lock().payloads.insert(code, payload.into());
    }

    /// Simulate the source being unreachable (or reachable again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Number of fetches made so far, including failed ones.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    /// Codes with a payload.
    pub fn available_marks(&self) -> Vec<MarkCode> {
        self.lock().payloads.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MarkSource for MockSource {
    fn fetch(&self, code: &MarkCode) -> Result<Option<String>, SourceError> {
        let mut state = self.lock();
        state.calls += 1;

        if state.unavailable {
            return Err(SourceError::Unavailable(format!(
                "mock source is offline (asked for {code})"
            )));
        }

        Ok(state.payloads.get(code).cloned())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
