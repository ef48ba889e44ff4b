//! Types for the ingest pipeline.

use assetry_core::AssetError;
use serde::Serialize;

/// A variant that was generated and stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoredVariant {
    pub label: String,
    pub key: String,
    pub url: String,
}

/// A variant that could not be generated or stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VariantFailure {
    pub label: String,
    pub key: String,
    pub error: String,
}

impl VariantFailure {
    pub fn to_error(&self) -> AssetError {
        AssetError::VariantWrite {
            key: self.key.clone(),
            message: self.error.clone(),
        }
    }
}

pub type VariantResult = Result<StoredVariant, VariantFailure>;

/// Outcome of the variant fan-out for one or more ingests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VariantReport {
    pub stored: Vec<StoredVariant>,
    pub failed: Vec<VariantFailure>,
    /// Tasks still running in the background when the report was taken.
    pub pending: usize,
}

impl VariantReport {
    pub fn from_results(results: impl IntoIterator<Item = VariantResult>) -> Self {
        let mut report = VariantReport::default();
        for result in results {
            report.record(result);
        }
        report
    }

    pub fn record(&mut self, result: VariantResult) {
        match result {
            Ok(stored) => self.stored.push(stored),
            Err(failure) => self.failed.push(failure),
        }
    }

    pub fn merge(&mut self, other: VariantReport) {
        self.stored.extend(other.stored);
        self.failed.extend(other.failed);
        self.pending += other.pending;
    }

    pub fn is_complete(&self) -> bool {
        self.pending == 0 && self.failed.is_empty()
    }
}

/// Result of a successful ingest.
#[derive(Clone, Debug, Serialize)]
pub struct IngestOutcome {
    /// Public URL of the original.
    pub url: String,
    /// Canonical store key of the original.
    pub key: String,
    /// The upload carried the original-only marker, so no variants were derived.
    pub original_only: bool,
    pub variants: VariantReport,
}
