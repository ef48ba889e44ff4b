//! Variant generation seam.
//!
//! The ingest pipeline only needs "bytes in, resized bytes out". Async generators implement
//! [`VariantGenerator`] directly; plain synchronous resize functions are wrapped in
//! [`BlockingGenerator`], which moves them onto the blocking pool.

use assetry_core::Dimensions;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

#[async_trait]
pub trait VariantGenerator: Send + Sync {
    /// Produce a resized copy of `data` fitting `dimensions`.
    async fn resize(&self, data: Bytes, dimensions: Dimensions) -> anyhow::Result<Bytes>;
}

/// Adapts a synchronous resize function to [`VariantGenerator`].
pub struct BlockingGenerator<F> {
    resize: Arc<F>,
}

impl<F> BlockingGenerator<F>
where
    F: Fn(&[u8], Dimensions) -> anyhow::Result<Bytes> + Send + Sync + 'static,
{
    pub fn new(resize: F) -> Self {
        Self {
            resize: Arc::new(resize),
        }
    }
}

#[async_trait]
impl<F> VariantGenerator for BlockingGenerator<F>
where
    F: Fn(&[u8], Dimensions) -> anyhow::Result<Bytes> + Send + Sync + 'static,
{
    async fn resize(&self, data: Bytes, dimensions: Dimensions) -> anyhow::Result<Bytes> {
        let resize = Arc::clone(&self.resize);
        // Image decode is CPU-bound; run off the async pool to avoid blocking other tasks.
        tokio::task::spawn_blocking(move || resize(&data, dimensions)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blocking_generator_runs_sync_function() {
        let generator = BlockingGenerator::new(|data: &[u8], dims: Dimensions| {
            let mut out = data.to_vec();
            out.extend_from_slice(dims.label().unwrap_or_default().as_bytes());
            Ok(Bytes::from(out))
        });

        let out = generator
            .resize(Bytes::from_static(b"img:"), Dimensions::new(Some(10), None))
            .await
            .unwrap();
        assert_eq!(out, Bytes::from_static(b"img:w10"));
    }

    #[tokio::test]
    async fn blocking_generator_propagates_errors() {
        let generator = BlockingGenerator::new(|_: &[u8], _: Dimensions| -> anyhow::Result<Bytes> {
            Err(anyhow::anyhow!("corrupt image"))
        });

        let err = generator
            .resize(Bytes::new(), Dimensions::new(Some(10), None))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("corrupt image"));
    }
}
