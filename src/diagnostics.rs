//! Diagnostics sink for non-fatal failures
//!
//! Lookups that swallow errors (modification times) still report them here so
//! misconfigured storage shows up while debugging.

use std::sync::{Arc, Mutex};

pub trait Diagnostics: Send + Sync {
    fn record(&self, message: &str, context: &[(&str, String)]);
}

/// Forwards records to `tracing` when debugging is enabled.
#[derive(Debug, Clone, Default)]
pub struct TracingDiagnostics {
    enabled: bool,
}

impl TracingDiagnostics {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Diagnostics for TracingDiagnostics {
    fn record(&self, message: &str, context: &[(&str, String)]) {
        if !self.enabled {
            return;
        }

        let context = context
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!(context = %context, "{}", message);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticRecord {
    pub message: String,
    pub context: Vec<(String, String)>,
}

#[derive(Clone, Default)]
pub struct MockDiagnostics {
    records: Arc<Mutex<Vec<DiagnosticRecord>>>,
}

impl MockDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl Diagnostics for MockDiagnostics {
    fn record(&self, message: &str, context: &[(&str, String)]) {
        self.records.lock().unwrap().push(DiagnosticRecord {
            message: message.to_string(),
            context: context
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
        });
    }
}
