use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting keyword ETL process...");

        // Extract
        let sources = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} files", sources.len());

        // Transform
        let result = self.pipeline.transform(sources).await?;
        let kept: usize = result.files.iter().map(|f| f.filtered_data().len()).sum();
        tracing::info!(
            "🔧 Transformed {} files ({} keywords kept, {} files failed)",
            result.files.len(),
            kept,
            result.failures.len()
        );
        for failure in &result.failures {
            tracing::warn!("⚠️ {}: {}", failure.file_name, failure.reason);
        }

        // Load
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("💾 Output saved to: {}", output_path);

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FileFailure, SourceFile, StageCounts, TransformResult};
    use crate::core::{FileResult, Record};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingPipeline {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Pipeline for RecordingPipeline {
        async fn extract(&self) -> Result<Vec<SourceFile>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![SourceFile::new("a.csv", b"Keyword,Volume\n".to_vec())])
        }

        async fn transform(&self, files: Vec<SourceFile>) -> Result<TransformResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let file = FileResult::new(
                files[0].file_name.clone(),
                "A",
                vec![Record::new("polo", 100)],
                vec![Record::new("polo", 100)],
                StageCounts::default(),
            );
            Ok(TransformResult {
                files: vec![file],
                failures: vec![FileFailure {
                    file_name: "b.csv".to_string(),
                    reason: "The file is empty".to_string(),
                }],
            })
        }

        async fn load(&self, result: TransformResult) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("out/{}.zip", result.files.len()))
        }
    }

    #[tokio::test]
    async fn test_engine_runs_all_phases() {
        let engine = EtlEngine::new(RecordingPipeline::default());
        let output = engine.run().await.unwrap();

        assert_eq!(output, "out/1.zip");
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 3);
    }
}
