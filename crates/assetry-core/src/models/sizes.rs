//! Image size specifications.
//!
//! The host supplies a named table of target sizes (`{"small": {"width": 300}}`).
//! Each entry becomes a [`SizeSpec`] whose label is derived from its dimensions only,
//! so two names with the same dimensions share one variant directory.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Named size table as configured by the host, keyed by size name.
pub type ImageSizes = BTreeMap<String, Dimensions>;

/// Target dimensions for a variant. Either side may be absent; a zero side counts as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Dimensions {
    pub fn new(width: Option<u32>, height: Option<u32>) -> Self {
        Self { width, height }
    }

    /// Same dimensions with zero sides cleared.
    pub fn normalized(self) -> Self {
        Self {
            width: self.width.filter(|w| *w > 0),
            height: self.height.filter(|h| *h > 0),
        }
    }

    /// Directory label: `w<width>` then `h<height>`, each only when present and non-zero.
    ///
    /// Returns `None` when neither dimension is set.
    pub fn label(&self) -> Option<String> {
        let dimensions = self.normalized();
        let mut label = String::new();
        if let Some(width) = dimensions.width {
            label.push_str(&format!("w{}", width));
        }
        if let Some(height) = dimensions.height {
            label.push_str(&format!("h{}", height));
        }
        if label.is_empty() {
            None
        } else {
            Some(label)
        }
    }
}

/// A variant descriptor with its derived label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeSpec {
    pub label: String,
    pub dimensions: Dimensions,
}

impl SizeSpec {
    pub fn from_dimensions(dimensions: Dimensions) -> Option<Self> {
        let dimensions = dimensions.normalized();
        dimensions.label().map(|label| SizeSpec { label, dimensions })
    }
}

/// Turn a named size table into size specs.
///
/// Entries with no dimensions are skipped. When several names derive the same label the
/// first in name order is kept.
pub fn size_specs(sizes: &ImageSizes) -> Vec<SizeSpec> {
    let mut seen = HashSet::new();
    let mut specs = Vec::with_capacity(sizes.len());

    for (name, dimensions) in sizes {
        let Some(spec) = SizeSpec::from_dimensions(*dimensions) else {
            tracing::warn!(size = %name, "Image size has neither width nor height, skipping");
            continue;
        };
        if !seen.insert(spec.label.clone()) {
            tracing::debug!(size = %name, label = %spec.label, "Duplicate image size label, skipping");
            continue;
        }
        specs.push(spec);
    }

    specs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_from_dimensions() {
        assert_eq!(Dimensions::new(Some(300), Some(200)).label().unwrap(), "w300h200");
        assert_eq!(Dimensions::new(Some(300), None).label().unwrap(), "w300");
        assert_eq!(Dimensions::new(None, Some(200)).label().unwrap(), "h200");
        assert_eq!(Dimensions::new(None, None).label(), None);
    }

    #[test]
    fn size_specs_skip_empty_and_duplicates() {
        let mut sizes = ImageSizes::new();
        sizes.insert("a-small".to_string(), Dimensions::new(Some(300), None));
        sizes.insert("b-empty".to_string(), Dimensions::default());
        sizes.insert("c-alias".to_string(), Dimensions::new(Some(300), None));
        sizes.insert("d-large".to_string(), Dimensions::new(Some(1000), Some(800)));

        let specs = size_specs(&sizes);
        let labels: Vec<_> = specs.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["w300", "w1000h800"]);
    }

    #[test]
    fn zero_sides_are_absent() {
        assert_eq!(Dimensions::new(Some(0), None).label(), None);
        assert_eq!(Dimensions::new(Some(0), Some(0)).label(), None);
        assert_eq!(Dimensions::new(Some(0), Some(200)).label().unwrap(), "h200");

        let spec = SizeSpec::from_dimensions(Dimensions::new(Some(300), Some(0))).unwrap();
        assert_eq!(spec.label, "w300");
        assert_eq!(spec.dimensions, Dimensions::new(Some(300), None));
    }

    #[test]
    fn zero_width_entries_are_skipped() {
        let sizes: ImageSizes =
            serde_json::from_str(r#"{"broken": {"width": 0}, "ok": {"width": 100}}"#).unwrap();
        let labels: Vec<_> = size_specs(&sizes).into_iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["w100"]);
    }

    #[test]
    fn empty_table_has_no_specs() {
        assert!(size_specs(&ImageSizes::new()).is_empty());
    }

    #[test]
    fn deserializes_host_size_table() {
        let sizes: ImageSizes = serde_json::from_str(
            r#"{"xs": {"width": 100}, "m": {"width": 600, "height": 400}, "tall": {"height": 900}}"#,
        )
        .unwrap();
        assert_eq!(sizes["xs"], Dimensions::new(Some(100), None));
        assert_eq!(sizes["m"], Dimensions::new(Some(600), Some(400)));
        assert_eq!(sizes["tall"], Dimensions::new(None, Some(900)));
    }
}
