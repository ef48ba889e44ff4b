//! Ingest pipeline: allocate → read → store original → derive variants.

pub mod gather;
pub mod types;

mod pipeline;

pub use gather::{gather_best_effort, VariantTracker};
pub use pipeline::IngestPipeline;
pub use types::{IngestOutcome, StoredVariant, VariantFailure, VariantReport, VariantResult};
