//! Image processing module
//!
//! Provides the default variant generator used on ingest.

pub mod resizer;

pub use resizer::{ImageResizer, ResizePlan};
