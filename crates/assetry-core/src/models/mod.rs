//! Data models shared by the storage and processing crates.

mod sizes;
mod upload;

pub use sizes::*;
pub use upload::*;
