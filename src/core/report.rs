use crate::core::aggregate::{build_opportunities, OpportunityReport};
use crate::core::{Column, FileResult, Record};
use crate::domain::constants::{EMPTY_SHEET_PLACEHOLDER, NO_OPPORTUNITIES_PLACEHOLDER};
use crate::domain::model::{FileFailure, FilterCounts, ToolKind};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const SUMMARY_SHEET: &str = "Summary";
pub const ALL_KEYWORDS_SHEET: &str = "All Keywords";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportOptions {
    pub include_summary: bool,
    pub questions_only: bool,
    pub main_keyword: Option<String>,
}

/// 報表中的一個工作表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    fn new(name: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            name: name.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Report {
    pub sheets: Vec<Sheet>,
}

impl Report {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// 依序為重複的工作表名稱加上 ` (2)`、` (3)` 等後綴
    fn push_unique(&mut self, mut sheet: Sheet, used: &mut HashSet<String>) {
        let base = sheet.name.clone();
        let mut suffix = 2;
        while used.contains(&sheet.name) {
            sheet.name = format!("{} ({})", base, suffix);
            suffix += 1;
        }
        used.insert(sheet.name.clone());
        self.sheets.push(sheet);
    }
}

fn record_sheet(file: &FileResult, columns: &[Column]) -> Sheet {
    let headers: Vec<&str> = columns.iter().map(|c| c.header()).collect();
    let mut sheet = Sheet::new(file.sheet_name(), &headers);

    if file.filtered_data().is_empty() {
        sheet.push_row([EMPTY_SHEET_PLACEHOLDER]);
        return sheet;
    }

    for record in file.filtered_data() {
        sheet.push_row(
            columns
                .iter()
                .map(|c| record.field(*c).unwrap_or_default()),
        );
    }
    sheet
}

fn percent_of(part: u64, total: u64) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", part as f64 / total as f64 * 100.0)
}

/// 主要工具的報表：摘要、每個檔案一個工作表、以及合併的 "All Keywords"
pub fn build_filter_report(files: &[FileResult], include_summary: bool) -> Report {
    let mut report = Report::default();
    let mut used = HashSet::new();
    let columns = [Column::Keyword, Column::Intent, Column::Volume];

    if include_summary {
        let mut summaries: Vec<(&str, usize, u64)> = files
            .iter()
            .map(|f| (f.sheet_name(), f.filtered_data().len(), f.total_volume()))
            .collect();
        summaries.sort_by(|a, b| b.2.cmp(&a.2));

        let grand_total: u64 = summaries.iter().map(|s| s.2).sum();
        let keyword_total: usize = summaries.iter().map(|s| s.1).sum();

        let mut summary = Sheet::new(
            SUMMARY_SHEET,
            &[
                "Sheet Name",
                "Number of Keywords",
                "Total Search Volume",
                "% of Total Volume",
            ],
        );
        for (name, keywords, volume) in &summaries {
            summary.push_row([
                name.to_string(),
                keywords.to_string(),
                volume.to_string(),
                percent_of(*volume, grand_total),
            ]);
        }
        summary.push_row([
            "TOTAL".to_string(),
            keyword_total.to_string(),
            grand_total.to_string(),
            percent_of(grand_total, grand_total),
        ]);
        report.push_unique(summary, &mut used);
    }

    for file in files {
        report.push_unique(record_sheet(file, &columns), &mut used);
    }

    let mut combined: Vec<(&FileResult, &Record)> = files
        .iter()
        .flat_map(|f| f.filtered_data().iter().map(move |r| (f, r)))
        .collect();
    combined.sort_by(|a, b| b.1.volume.cmp(&a.1.volume));

    let mut all = Sheet::new(ALL_KEYWORDS_SHEET, &["Keyword", "Intent", "Volume", "Source"]);
    for (file, record) in combined {
        all.push_row([
            record.keyword.clone(),
            record.intent.clone().unwrap_or_default(),
            record.volume.to_string(),
            file.sheet_name().to_string(),
        ]);
    }
    if all.rows.is_empty() {
        all.push_row([EMPTY_SHEET_PLACEHOLDER]);
    }
    report.push_unique(all, &mut used);

    report
}

fn format_position(rank: f64) -> String {
    if rank.fract() == 0.0 {
        format!("{}", rank as i64)
    } else {
        rank.to_string()
    }
}

/// 競爭對手分析報表：每個競爭對手一個工作表，以及 (選擇性) 含關鍵字機會排名的摘要
pub fn build_relevancy_report(files: &[FileResult], options: &ReportOptions) -> Report {
    let mut report = Report::default();
    let mut used = HashSet::new();
    let columns = [Column::Keyword, Column::Position, Column::Volume, Column::Type];

    for file in files {
        report.push_unique(record_sheet(file, &columns), &mut used);
    }

    if !options.include_summary {
        return report;
    }

    let opportunities = build_opportunities(files, options.questions_only);
    report.push_unique(relevancy_summary(files.len(), &opportunities, options), &mut used);
    report
}

fn relevancy_summary(
    competitor_count: usize,
    opportunities: &OpportunityReport,
    options: &ReportOptions,
) -> Sheet {
    let main_keyword = options
        .main_keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .unwrap_or("Not specified");

    let mut sheet = Sheet::new(SUMMARY_SHEET, &["Keyword Relevancy Analysis"]);
    sheet.push_row(["Main Keyword", main_keyword]);
    sheet.push_row(["Competitors".to_string(), competitor_count.to_string()]);
    sheet.push_row(Vec::<String>::new());
    sheet.push_row([
        "Keyword",
        "Best Position",
        "Total Volume",
        "Type",
        "Occurrences",
        "Details",
    ]);

    if opportunities.is_empty() {
        sheet.push_row([NO_OPPORTUNITIES_PLACEHOLDER]);
        return sheet;
    }

    for occurrence in &opportunities.opportunities {
        let best = occurrence.best_position();
        sheet.push_row([
            occurrence.keyword.clone(),
            format_position(best),
            occurrence.total_volume.to_string(),
            occurrence.kind.clone(),
            occurrence.occurrences.to_string(),
            occurrence.competitor_details(),
        ]);
    }
    sheet
}

pub fn build_report(tool: ToolKind, files: &[FileResult], options: &ReportOptions) -> Report {
    match tool {
        ToolKind::Filter => build_filter_report(files, options.include_summary),
        ToolKind::Relevancy => build_relevancy_report(files, options),
    }
}

#[derive(Debug, Serialize)]
struct FileManifest<'a> {
    file_name: &'a str,
    sheet_name: &'a str,
    #[serde(flatten)]
    counts: FilterCounts,
}

#[derive(Debug, Serialize)]
struct ReportManifest<'a> {
    tool: ToolKind,
    generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    main_keyword: Option<&'a str>,
    sheets: Vec<&'a str>,
    files: Vec<FileManifest<'a>>,
    failures: &'a [FileFailure],
}

/// 檔名中不允許的字元改為底線
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "sheet".to_string()
    } else {
        trimmed.to_string()
    }
}

fn sheet_to_csv(sheet: &Sheet) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    writer.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        writer.write_record(row)?;
    }
    writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to finish CSV sheet '{}': {}", sheet.name, e),
    })
}

/// 將報表寫成 ZIP：每個工作表一個 CSV，外加 `summary.json`
pub struct ReportWriter<'a> {
    tool: ToolKind,
    options: &'a ReportOptions,
}

impl<'a> ReportWriter<'a> {
    pub fn new(tool: ToolKind, options: &'a ReportOptions) -> Self {
        Self { tool, options }
    }

    pub fn write_archive(
        &self,
        report: &Report,
        files: &[FileResult],
        failures: &[FileFailure],
    ) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        for (index, sheet) in report.sheets.iter().enumerate() {
            let entry = format!("{:02}_{}.csv", index + 1, sanitize_file_name(&sheet.name));
            tracing::debug!("Writing sheet '{}' ({} rows) as {}", sheet.name, sheet.rows.len(), entry);
            zip.start_file(entry, options)?;
            zip.write_all(&sheet_to_csv(sheet)?)?;
        }

        let manifest = ReportManifest {
            tool: self.tool,
            generated_at: Utc::now(),
            main_keyword: self.options.main_keyword.as_deref(),
            sheets: report.sheets.iter().map(|s| s.name.as_str()).collect(),
            files: files
                .iter()
                .map(|f| FileManifest {
                    file_name: f.file_name(),
                    sheet_name: f.sheet_name(),
                    counts: f.counts(),
                })
                .collect(),
            failures,
        };
        zip.start_file("summary.json", options)?;
        zip.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}
