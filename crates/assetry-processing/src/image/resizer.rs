//! Image resizer - the default variant generator
//!
//! Resizes without enlargement: a target larger than the source keeps the source size.
//! With a single dimension the aspect ratio is preserved; with both, the image is scaled
//! to cover the box and center-cropped. The output keeps the input's format.

use crate::variants::VariantGenerator;
use assetry_core::Dimensions;
use async_trait::async_trait;
use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::io::Cursor;

/// What to do with a source image of a given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePlan {
    /// Target is not smaller than the source; keep the original bytes.
    Keep,
    /// Scale proportionally to exactly these dimensions.
    Scale { width: u32, height: u32 },
    /// Scale to cover, then center-crop to these dimensions.
    Fill { width: u32, height: u32 },
}

impl ResizePlan {
    pub fn for_source(source_width: u32, source_height: u32, target: Dimensions) -> Self {
        if source_width == 0 || source_height == 0 {
            return ResizePlan::Keep;
        }
        let target = Dimensions::new(
            target.width.filter(|w| *w > 0),
            target.height.filter(|h| *h > 0),
        );

        match (target.width, target.height) {
            (Some(width), None) if width < source_width => {
                let height = scaled(source_height, width, source_width);
                ResizePlan::Scale { width, height }
            }
            (None, Some(height)) if height < source_height => {
                let width = scaled(source_width, height, source_height);
                ResizePlan::Scale { width, height }
            }
            (Some(width), Some(height)) if width < source_width || height < source_height => {
                ResizePlan::Fill {
                    width: width.clamp(1, source_width),
                    height: height.clamp(1, source_height),
                }
            }
            _ => ResizePlan::Keep,
        }
    }
}

fn scaled(side: u32, numerator: u32, denominator: u32) -> u32 {
    let value = (side as f64 * numerator as f64 / denominator as f64).round() as u32;
    value.max(1)
}

/// Default [`VariantGenerator`] built on the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageResizer;

impl ImageResizer {
    /// Synchronous resize; CPU-bound, call from a blocking context.
    pub fn resize_blocking(data: &[u8], dimensions: Dimensions) -> Result<Bytes, anyhow::Error> {
        let reader = image::ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| anyhow::anyhow!("Unrecognized image format"))?;
        let img = reader.decode()?;

        let (source_width, source_height) = img.dimensions();
        let resized: DynamicImage = match ResizePlan::for_source(source_width, source_height, dimensions)
        {
            ResizePlan::Keep => {
                tracing::debug!(
                    width = source_width,
                    height = source_height,
                    "Variant target not smaller than source, keeping original bytes"
                );
                return Ok(Bytes::copy_from_slice(data));
            }
            ResizePlan::Scale { width, height } => {
                img.resize_exact(width, height, FilterType::Lanczos3)
            }
            ResizePlan::Fill { width, height } => {
                img.resize_to_fill(width, height, FilterType::Lanczos3)
            }
        };

        let (width, height) = resized.dimensions();
        let estimated_size = (width * height * 3) as usize;
        let mut buffer = Vec::with_capacity(estimated_size);
        let mut cursor = Cursor::new(&mut buffer);
        resized.write_to(&mut cursor, format)?;

        Ok(Bytes::from(buffer))
    }
}

#[async_trait]
impl VariantGenerator for ImageResizer {
    async fn resize(&self, data: Bytes, dimensions: Dimensions) -> anyhow::Result<Bytes> {
        tokio::task::spawn_blocking(move || Self::resize_blocking(&data, dimensions)).await?
    }
}
