//! Assetry Processing Library
//!
//! This crate turns host uploads into stored originals plus resized variants, and exposes
//! the host-facing [`AssetAdapter`] with its read, delete and existence operations.

pub mod adapter;
pub mod image;
pub mod naming;
pub mod sizes;
pub mod upload;
pub mod variants;

// Re-export commonly used types
pub use adapter::{AssetAdapter, AssetLocator, ServePassThrough};
pub use image::{ImageResizer, ResizePlan};
pub use naming::{
    is_original_only, split_filename, AllocatedName, DatedDirectory, FixedDirectory,
    NameAllocator, SequentialNameAllocator, TargetDirectory,
};
pub use sizes::{SizeSpecSource, StaticSizes};
pub use upload::{
    gather_best_effort, IngestOutcome, IngestPipeline, StoredVariant, VariantFailure,
    VariantReport, VariantTracker,
};
pub use variants::{BlockingGenerator, VariantGenerator};
