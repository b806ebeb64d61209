use crate::adapters::tabular::read_table;
use crate::core::dedup::deduplicate_keywords;
use crate::core::exclusion::{apply_exclusion_tiers, ExclusionFilter, ForbiddenWords};
use crate::core::formatter::{canonicalize, format_data, resolve_columns, HeaderMatching};
use crate::core::volume::filter_by_volume;
use crate::core::{Column, FileResult, RawTable};
use crate::domain::constants::DEFAULT_MIN_VOLUME;
use crate::domain::model::{SourceFile, StageCounts, ToolKind};
use crate::utils::error::{EtlError, InputError, Result};

/// 單一檔案處理管道的設定
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub columns: Vec<Column>,
    pub header_matching: HeaderMatching,
    pub require_intent: bool,
    pub min_volume: u64,
    pub forbidden: ForbiddenWords,
    pub remove_duplicates: bool,
}

impl PipelineOptions {
    /// 主要工具：Keyword / Intent / Volume，過濾商店名稱，Intent 必填
    pub fn keyword_filter() -> Self {
        Self {
            columns: vec![Column::Keyword, Column::Intent, Column::Volume],
            header_matching: HeaderMatching::Exact,
            require_intent: true,
            min_volume: DEFAULT_MIN_VOLUME,
            forbidden: ForbiddenWords::with_default_stores(),
            remove_duplicates: false,
        }
    }

    /// 競爭對手分析：Keyword / Position / Volume / Type，不過濾商店名稱
    pub fn relevancy() -> Self {
        Self {
            columns: vec![Column::Keyword, Column::Position, Column::Volume, Column::Type],
            header_matching: HeaderMatching::Fallback,
            require_intent: false,
            min_volume: DEFAULT_MIN_VOLUME,
            forbidden: ForbiddenWords::empty(),
            remove_duplicates: false,
        }
    }

    pub fn for_tool(tool: ToolKind) -> Self {
        match tool {
            ToolKind::Filter => Self::keyword_filter(),
            ToolKind::Relevancy => Self::relevancy(),
        }
    }
}

/// 格式化 -> 搜尋量過濾 -> 禁用字過濾 (預設、自訂) -> (選擇性) 去重
#[derive(Debug, Clone)]
pub struct FilePipeline {
    options: PipelineOptions,
    defaults: ExclusionFilter,
    custom: ExclusionFilter,
}

impl FilePipeline {
    pub fn new(options: PipelineOptions) -> Result<Self> {
        let defaults = ExclusionFilter::new(options.forbidden.defaults())?;
        let custom = ExclusionFilter::new(options.forbidden.custom())?;
        Ok(Self {
            options,
            defaults,
            custom,
        })
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// 讀取並處理一個上傳檔案；錯誤會附上檔名
    pub fn process_source(&self, source: &SourceFile, sheet_name: &str) -> Result<FileResult> {
        read_table(&source.file_name, &source.bytes)
            .and_then(|table| self.process(&source.file_name, sheet_name, &table))
            .map_err(|e| EtlError::input(source.file_name.clone(), e))
    }

    pub fn process(
        &self,
        file_name: &str,
        sheet_name: &str,
        table: &RawTable,
    ) -> std::result::Result<FileResult, InputError> {
        let opts = &self.options;
        let column_map = resolve_columns(&table.headers, &opts.columns, opts.header_matching)?;
        let rows = canonicalize(table, &column_map);

        let original_data = format_data(&rows, &opts.columns, false);
        let formatted = if opts.require_intent {
            format_data(&rows, &opts.columns, true)
        } else {
            original_data.clone()
        };
        let mut stages = StageCounts {
            intent_filtered_rows: original_data.len() - formatted.len(),
            ..StageCounts::default()
        };

        let before_volume = formatted.len();
        let volume_filtered = filter_by_volume(formatted, opts.min_volume);
        stages.volume_filtered_rows = before_volume - volume_filtered.len();

        let exclusion = apply_exclusion_tiers(volume_filtered, &self.defaults, &self.custom);
        stages.store_filtered_rows = exclusion.removed_by_defaults;
        stages.custom_store_filtered_rows = exclusion.removed_by_custom;

        tracing::debug!(
            "📋 {}: {} rows, intent -{}, volume -{}, stores -{}, custom -{}",
            file_name,
            original_data.len(),
            stages.intent_filtered_rows,
            stages.volume_filtered_rows,
            stages.store_filtered_rows,
            stages.custom_store_filtered_rows
        );

        let result = FileResult::new(file_name, sheet_name, original_data, exclusion.kept, stages);

        if opts.remove_duplicates {
            let deduped = deduplicate_keywords(result.filtered_data());
            return Ok(result.with_filtered_data(deduped));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RawRecord;
    use serde_json::{json, Value};

    fn table(headers: &[&str], rows: &[&[Value]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|cells| {
                    headers
                        .iter()
                        .zip(cells.iter())
                        .map(|(h, v)| (*h, v.clone()))
                        .collect::<RawRecord>()
                })
                .collect(),
        }
    }

    #[test]
    fn test_brand_and_volume_filters_end_to_end() {
        let mut options = PipelineOptions::keyword_filter();
        options.forbidden = ForbiddenWords::empty();
        options.forbidden.add_custom("nike");
        let pipeline = FilePipeline::new(options).unwrap();

        let input = table(
            &["Keyword", "Volume", "Intent"],
            &[
                &[json!("Nike Shoes"), json!("1,200"), json!("commercial")],
                &[json!("running tips"), json!("50"), json!("informational")],
            ],
        );
        let result = pipeline.process("shoes.csv", "Shoes", &input).unwrap();
        let counts = result.counts();

        assert!(result.filtered_data().is_empty());
        assert_eq!(counts.filtered_rows, 0);
        assert_eq!(counts.stages.volume_filtered_rows, 1);
        assert_eq!(
            counts.stages.store_filtered_rows + counts.stages.custom_store_filtered_rows,
            1
        );
    }

    #[test]
    fn test_counters_partition_original_rows() {
        let mut options = PipelineOptions::keyword_filter();
        options.forbidden.add_custom("cheap");
        options.remove_duplicates = true;
        let pipeline = FilePipeline::new(options).unwrap();

        let input = table(
            &["Keyword", "Intent", "Volume", "CPC (USD)"],
            &[
                &[json!("polo shirt"), json!("commercial"), json!("2,400"), json!("0.8")],
                &[json!("polo shirts"), json!("commercial"), json!("900"), json!("0.8")],
                &[json!("lacoste polo"), json!("navigational"), json!("9,000"), json!("1.1")],
                &[json!("cheap polo"), json!("commercial"), json!("300"), json!("0.2")],
                &[json!("polo history"), json!(""), json!("500"), json!("0.1")],
                &[json!("polo fit"), json!("informational"), json!("40"), json!("0.1")],
            ],
        );
        let result = pipeline.process("polo.csv", "Polo", &input).unwrap();
        let counts = result.counts();
        let s = counts.stages;

        assert_eq!(counts.original_rows, 6);
        assert_eq!(s.intent_filtered_rows, 1);
        assert_eq!(s.volume_filtered_rows, 1);
        assert_eq!(s.store_filtered_rows, 1);
        assert_eq!(s.custom_store_filtered_rows, 1);
        assert_eq!(s.duplicate_rows, 1);
        assert_eq!(counts.filtered_rows, 1);
        assert_eq!(
            counts.original_rows,
            counts.filtered_rows
                + s.intent_filtered_rows
                + s.volume_filtered_rows
                + s.store_filtered_rows
                + s.custom_store_filtered_rows
                + s.duplicate_rows
        );
        assert_eq!(result.filtered_data()[0].keyword, "polo shirt");
        assert_eq!(result.filtered_data()[0].volume, 2400);
    }

    #[test]
    fn test_relevancy_options_use_fallback_headers() {
        let pipeline = FilePipeline::new(PipelineOptions::relevancy()).unwrap();
        let input = table(
            &["keyword", "Position", "Search Volume", "Position Type", "URL"],
            &[
                &[json!("nike air max"), json!("3"), json!("12,000"), json!("Organic"), json!("https://a")],
                &[json!("socks"), json!(""), json!("20"), json!("Organic"), json!("https://b")],
            ],
        );
        let result = pipeline.process("competitor.csv", "competitor", &input).unwrap();

        // 分析工具預設不過濾品牌
        assert_eq!(result.filtered_data().len(), 1);
        let row = &result.filtered_data()[0];
        assert_eq!(row.keyword, "nike air max");
        assert_eq!(row.position.as_deref(), Some("3"));
        assert_eq!(row.kind.as_deref(), Some("Organic"));
        assert_eq!(row.intent, None);
    }

    #[test]
    fn test_missing_columns_are_input_fatal() {
        let pipeline = FilePipeline::new(PipelineOptions::keyword_filter()).unwrap();
        let input = table(&["Keyword", "Search Volume"], &[]);
        let err = pipeline.process("x.csv", "X", &input).unwrap_err();
        assert_eq!(err, InputError::MissingColumns(vec!["Volume".to_string()]));
    }

    #[test]
    fn test_process_source_attaches_file_name() {
        let pipeline = FilePipeline::new(PipelineOptions::keyword_filter()).unwrap();
        let source = SourceFile::new("empty.csv", Vec::new());
        let err = pipeline.process_source(&source, "Empty").unwrap_err();
        match err {
            EtlError::Input { file_name, source } => {
                assert_eq!(file_name, "empty.csv");
                assert_eq!(source, InputError::FileEmpty);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
