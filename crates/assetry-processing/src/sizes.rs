//! Where the active image size table comes from.
//!
//! The table is queried on every ingest, so a source backed by mutable host state (a theme
//! switch, a reloaded config file) takes effect for the next upload without a restart.

use assetry_core::ImageSizes;

pub trait SizeSpecSource: Send + Sync {
    fn image_sizes(&self) -> ImageSizes;
}

/// A fixed table, typically the one loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticSizes(pub ImageSizes);

impl SizeSpecSource for StaticSizes {
    fn image_sizes(&self) -> ImageSizes {
        self.0.clone()
    }
}

impl<F> SizeSpecSource for F
where
    F: Fn() -> ImageSizes + Send + Sync,
{
    fn image_sizes(&self) -> ImageSizes {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetry_core::Dimensions;
    use std::sync::{Arc, RwLock};

    #[test]
    fn closure_source_sees_updates() {
        let table = Arc::new(RwLock::new(ImageSizes::new()));
        let shared = Arc::clone(&table);
        let source = move || shared.read().unwrap().clone();

        assert!(source.image_sizes().is_empty());

        table
            .write()
            .unwrap()
            .insert("s".to_string(), Dimensions::new(Some(300), None));
        assert_eq!(source.image_sizes().len(), 1);
    }
}
