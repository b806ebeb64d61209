use crate::adapters::tabular::is_supported;
use crate::core::formatter::{file_stem, format_sheet_name};
use crate::core::pipeline::FilePipeline;
use crate::core::report::{build_report, ReportWriter};
use crate::core::{ConfigProvider, Pipeline, Storage, TransformResult};
use crate::domain::model::{FileCollection, FileFailure, SourceFile, ToolKind};
use crate::utils::error::{EtlError, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct KeywordPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    files: Arc<Mutex<FileCollection>>,
    read_failures: Mutex<Vec<FileFailure>>,
}

impl<S: Storage, C: ConfigProvider> KeywordPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            files: Arc::new(Mutex::new(FileCollection::new())),
            read_failures: Mutex::new(Vec::new()),
        }
    }

    /// 已處理檔案的集合；可在 load 之前重新命名或移除工作表
    pub fn collection(&self) -> Arc<Mutex<FileCollection>> {
        Arc::clone(&self.files)
    }
}

fn display_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string()
}

fn sheet_name_for(tool: ToolKind, file_name: &str) -> String {
    match tool {
        ToolKind::Filter => format_sheet_name(file_name),
        ToolKind::Relevancy => file_stem(file_name).to_string(),
    }
}

fn failure(file_name: impl Into<String>, error: &EtlError) -> FileFailure {
    let reason = match error {
        EtlError::Input { source, .. } => source.to_string(),
        other => other.user_friendly_message(),
    };
    FileFailure {
        file_name: file_name.into(),
        reason,
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for KeywordPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<SourceFile>> {
        let inputs = self.config.input_files();
        let supported: Vec<&String> = inputs.iter().filter(|path| is_supported(path)).collect();

        for skipped in inputs.iter().filter(|path| !is_supported(path)) {
            tracing::warn!("⏭️ Skipping unsupported file: {}", skipped);
        }

        if supported.is_empty() {
            return Err(EtlError::ValidationError {
                message: "No valid Excel or CSV files found".to_string(),
            });
        }

        let mut sources = Vec::with_capacity(supported.len());
        let mut failures = Vec::new();
        for path in supported {
            tracing::debug!("Reading input file: {}", path);
            match self.storage.read_file(path).await {
                Ok(bytes) => sources.push(SourceFile::new(display_name(path), bytes)),
                Err(e) => {
                    tracing::warn!("❌ Failed to read {}: {}", path, e);
                    failures.push(failure(display_name(path), &e));
                }
            }
        }

        self.read_failures.lock().await.extend(failures);
        Ok(sources)
    }

    async fn transform(&self, files: Vec<SourceFile>) -> Result<TransformResult> {
        let tool = self.config.tool();
        let pipeline = Arc::new(FilePipeline::new(self.config.pipeline_options())?);

        tracing::info!("🔧 Processing {} files with the {} tool", files.len(), tool);

        // 每個檔案一個工作；結果依上傳順序收集
        let handles: Vec<_> = files
            .into_iter()
            .map(|source| {
                let pipeline = Arc::clone(&pipeline);
                let file_name = source.file_name.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    let sheet_name = sheet_name_for(tool, &source.file_name);
                    pipeline.process_source(&source, &sheet_name)
                });
                (file_name, handle)
            })
            .collect();

        let mut failures = std::mem::take(&mut *self.read_failures.lock().await);
        let mut processed = Vec::new();

        for (file_name, handle) in handles {
            match handle.await {
                Ok(Ok(result)) => {
                    tracing::debug!(
                        "✅ {}: {} of {} rows kept",
                        file_name,
                        result.filtered_data().len(),
                        result.original_data().len()
                    );
                    processed.push(result);
                }
                Ok(Err(e)) => {
                    tracing::warn!("❌ {}", e.user_friendly_message());
                    failures.push(failure(file_name, &e));
                }
                Err(join_error) => {
                    let e = EtlError::ProcessingError {
                        message: format!("Worker for {} stopped: {}", file_name, join_error),
                    };
                    tracing::error!("❌ {}", e);
                    failures.push(failure(file_name, &e));
                }
            }
        }

        if processed.is_empty() {
            return Err(EtlError::NoFilesProcessed {
                failed: failures.len(),
            });
        }

        {
            let mut collection = self.files.lock().await;
            for result in &processed {
                collection.push(result.clone());
            }
            tracing::info!(
                "🧹 Removed rows: {} below volume, {} default stores, {} custom words",
                collection.total_volume_filtered(),
                collection.total_store_filtered(),
                collection.total_custom_filtered()
            );
        }

        Ok(TransformResult {
            files: processed,
            failures,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let tool = self.config.tool();
        let report_options = self.config.report_options();

        let archive = {
            let collection = self.files.lock().await;
            let report = build_report(tool, collection.as_slice(), &report_options);
            tracing::debug!(
                "Creating ZIP file with {} sheets from {} files",
                report.sheets.len(),
                collection.len()
            );
            ReportWriter::new(tool, &report_options).write_archive(
                &report,
                collection.as_slice(),
                &result.failures,
            )?
        };

        let output_path = Path::new(self.config.output_path())
            .join(format!("{}.zip", self.config.output_name()))
            .to_string_lossy()
            .into_owned();

        tracing::debug!("Writing ZIP file ({} bytes) to storage", archive.len());
        self.storage.write_file(&output_path, &archive).await?;

        Ok(output_path)
    }
}
