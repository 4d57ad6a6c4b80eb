use image::RgbImage;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Duration;
use crate::config::ExportConfig;
use crate::errors::ExportError;
use crate::pipeline::pdf::assemble_pdf;
use crate::pipeline::{PageSpec, QuoteLayout, Rasterizer};

/// Runs PDF exports on the blocking pool, a bounded number at a time.
#[derive(Clone)]
pub struct Exporter {
    rasterizer: Arc<dyn Rasterizer>,
    permits: Arc<Semaphore>,
    page: PageSpec,
    timeout_secs: u64,
}

impl Exporter {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, config: &ExportConfig) -> Self {
        Self {
            rasterizer,
            permits: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            page: PageSpec::from(config),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Rasterizes `layout` and places it on a single PDF page.
    pub async fn export(&self, layout: QuoteLayout, title: String) -> Result<Vec<u8>, ExportError> {
        let _permit = self.permits.acquire().await.map_err(|_| ExportError::QueueClosed)?;

        let rasterizer = self.rasterizer.clone();
        let page = self.page;
        tracing::debug!("Starting export of {}", title);

        let job = tokio::task::spawn_blocking(move || {
            let raster: RgbImage = rasterizer.rasterize(&layout)?;
            tracing::debug!("Captured preview at {}x{}", raster.width(), raster.height());
            assemble_pdf(raster, page, &title)
        });

        match tokio::time::timeout(Duration::from_secs(self.timeout_secs), job).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(ExportError::TaskPanic(join_error.to_string())),
            Err(_) => Err(ExportError::Timeout(self.timeout_secs)),
        }
    }
}
