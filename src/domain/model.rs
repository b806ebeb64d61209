use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 輸入檔案中的一列原始資料，鍵為 (已修剪的) 表頭名稱
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub data: HashMap<String, serde_json::Value>,
}

impl RawRecord {
    pub fn get(&self, header: &str) -> Option<&serde_json::Value> {
        self.data.get(header)
    }
}

impl<K: Into<String>> FromIterator<(K, serde_json::Value)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, serde_json::Value)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// 已解析的表格：表頭與資料列
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
}

/// 上傳的原始檔案內容
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Keyword,
    Position,
    Volume,
    Type,
    Intent,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Keyword,
        Column::Position,
        Column::Volume,
        Column::Type,
        Column::Intent,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Column::Keyword => "Keyword",
            Column::Position => "Position",
            Column::Volume => "Volume",
            Column::Type => "Type",
            Column::Intent => "Intent",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// 投影後的一列關鍵字資料。
///
/// `Keyword` 與 `Volume` 一定存在；其餘欄位只有在被要求時才是 `Some`，
/// 且內容永遠是字串 (來源缺值時為空字串)。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Keyword")]
    pub keyword: String,
    #[serde(rename = "Position", default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(rename = "Volume")]
    pub volume: u64,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "Intent", default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

impl Record {
    pub fn new(keyword: impl Into<String>, volume: u64) -> Self {
        Self {
            keyword: keyword.into(),
            volume,
            ..Self::default()
        }
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    /// 取得欄位的文字內容；未投影的欄位回傳 `None`
    pub fn field(&self, column: Column) -> Option<String> {
        match column {
            Column::Keyword => Some(self.keyword.clone()),
            Column::Volume => Some(self.volume.to_string()),
            Column::Position => self.position.clone(),
            Column::Type => self.kind.clone(),
            Column::Intent => self.intent.clone(),
        }
    }

    /// 依欄位順序列出所有存在的欄位值
    pub fn field_values(&self) -> Vec<String> {
        Column::ALL
            .iter()
            .filter_map(|column| self.field(*column))
            .collect()
    }
}

/// 每個處理階段移除的列數
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub intent_filtered_rows: usize,
    pub volume_filtered_rows: usize,
    pub store_filtered_rows: usize,
    pub custom_store_filtered_rows: usize,
    pub duplicate_rows: usize,
}

/// `FileResult` 的計數摘要，全部由資料推導而來
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCounts {
    pub original_rows: usize,
    pub filtered_rows: usize,
    #[serde(flatten)]
    pub stages: StageCounts,
}

/// 單一上傳檔案的處理結果。
///
/// 建立後只有 `sheet_name` 可以更名，`filtered_data` 只會被去重整批替換；
/// 兩者都透過回傳新值完成，不會就地修改。
#[derive(Debug, Clone, PartialEq)]
pub struct FileResult {
    id: String,
    file_name: String,
    sheet_name: String,
    original_data: Vec<Record>,
    filtered_data: Vec<Record>,
    stages: StageCounts,
}

impl FileResult {
    pub fn new(
        file_name: impl Into<String>,
        sheet_name: impl Into<String>,
        original_data: Vec<Record>,
        filtered_data: Vec<Record>,
        stages: StageCounts,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_name: file_name.into(),
            sheet_name: sheet_name.into(),
            original_data,
            filtered_data,
            stages,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn original_data(&self) -> &[Record] {
        &self.original_data
    }

    pub fn filtered_data(&self) -> &[Record] {
        &self.filtered_data
    }

    pub fn counts(&self) -> FilterCounts {
        FilterCounts {
            original_rows: self.original_data.len(),
            filtered_rows: self.filtered_data.len(),
            stages: self.stages,
        }
    }

    pub fn total_volume(&self) -> u64 {
        self.filtered_data.iter().map(|r| r.volume).sum()
    }

    pub fn renamed(self, sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            ..self
        }
    }

    /// 以新的資料列取代 `filtered_data`，被移除的列數記為重複
    pub fn with_filtered_data(self, filtered_data: Vec<Record>) -> Self {
        let removed = self.filtered_data.len().saturating_sub(filtered_data.len());
        let mut stages = self.stages;
        stages.duplicate_rows += removed;
        Self {
            filtered_data,
            stages,
            ..self
        }
    }
}

/// 記憶體中的檔案清單，順序即上傳順序
#[derive(Debug, Clone, Default)]
pub struct FileCollection {
    files: Vec<FileResult>,
}

impl FileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, file: FileResult) {
        self.files.push(file);
    }

    pub fn remove(&mut self, id: &str) -> Option<FileResult> {
        let index = self.files.iter().position(|f| f.id() == id)?;
        Some(self.files.remove(index))
    }

    pub fn rename(&mut self, id: &str, sheet_name: &str) -> bool {
        let Some(index) = self.files.iter().position(|f| f.id() == id) else {
            return false;
        };
        let current = self.files.remove(index);
        self.files.insert(index, current.renamed(sheet_name));
        true
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn get(&self, id: &str) -> Option<&FileResult> {
        self.files.iter().find(|f| f.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileResult> {
        self.files.iter()
    }

    pub fn as_slice(&self) -> &[FileResult] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_volume_filtered(&self) -> usize {
        self.files
            .iter()
            .map(|f| f.counts().stages.volume_filtered_rows)
            .sum()
    }

    pub fn total_store_filtered(&self) -> usize {
        self.files
            .iter()
            .map(|f| f.counts().stages.store_filtered_rows)
            .sum()
    }

    pub fn total_custom_filtered(&self) -> usize {
        self.files
            .iter()
            .map(|f| f.counts().stages.custom_store_filtered_rows)
            .sum()
    }
}

impl<'a> IntoIterator for &'a FileCollection {
    type Item = &'a FileResult;
    type IntoIter = std::slice::Iter<'a, FileResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// 處理失敗的檔案與使用者可讀的原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub files: Vec<FileResult>,
    pub failures: Vec<FileFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Competitor {
    pub name: String,
    pub position: String,
    pub volume: u64,
}

/// 跨檔案彙總時，單一關鍵字的出現紀錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordOccurrence {
    pub keyword: String,
    pub position: String,
    pub volume: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub occurrences: usize,
    pub total_volume: u64,
    pub competitors: Vec<Competitor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// 品牌/商店過濾與整合報表
    #[default]
    Filter,
    /// 競爭對手關鍵字重疊分析
    Relevancy,
}

impl ToolKind {
    pub fn default_output_name(&self) -> &'static str {
        match self {
            ToolKind::Filter => "combined_filtered_data",
            ToolKind::Relevancy => "kw_relevancy_analysis",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolKind::Filter => f.write_str("filter"),
            ToolKind::Relevancy => f.write_str("relevancy"),
        }
    }
}
