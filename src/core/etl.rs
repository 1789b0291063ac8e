use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// 依序執行 extract -> transform -> load，回傳輸出檔路徑
    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("🚀 Starting recipe cleaning");

        let raw = self.pipeline.extract().await?;
        let result = self.pipeline.transform(raw).await?;
        let output_path = self.pipeline.load(result).await?;

        tracing::info!("✅ Finished in {:?}", started.elapsed());
        Ok(output_path)
    }
}
