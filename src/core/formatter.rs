use crate::core::volume::parse_volume;
use crate::core::{Column, RawRecord, RawTable, Record};
use crate::utils::error::InputError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// 表頭比對方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMatching {
    /// 表頭 (修剪後) 必須與欄位名稱完全相同
    #[default]
    Exact,
    /// 不分大小寫，並接受常見的替代名稱
    Fallback,
}

impl HeaderMatching {
    fn aliases(&self, column: Column) -> &'static [&'static str] {
        match (self, column) {
            (HeaderMatching::Exact, _) => &[],
            (HeaderMatching::Fallback, Column::Keyword) => &["keyword"],
            (HeaderMatching::Fallback, Column::Position) => &["position"],
            (HeaderMatching::Fallback, Column::Volume) => &["search volume", "volume"],
            (HeaderMatching::Fallback, Column::Type) => &["position type", "type"],
            (HeaderMatching::Fallback, Column::Intent) => &["intent", "keyword intents"],
        }
    }

    fn find<'a>(&self, headers: &'a [String], column: Column) -> Option<&'a String> {
        match self {
            HeaderMatching::Exact => headers.iter().find(|h| h.trim() == column.header()),
            HeaderMatching::Fallback => self.aliases(column).iter().find_map(|alias| {
                headers
                    .iter()
                    .find(|h| h.trim().to_lowercase() == *alias)
            }),
        }
    }
}

/// 欄位 -> 來源表頭
pub type ColumnMap = HashMap<Column, String>;

/// 找出每個要求欄位對應的來源表頭；缺少 Keyword 或搜尋量欄位時回傳錯誤
pub fn resolve_columns(
    headers: &[String],
    columns: &[Column],
    matching: HeaderMatching,
) -> Result<ColumnMap, InputError> {
    let mut resolved = ColumnMap::new();
    let mut missing = Vec::new();

    for column in with_required(columns) {
        match matching.find(headers, column) {
            Some(header) => {
                resolved.insert(column, header.clone());
            }
            None if matches!(column, Column::Keyword | Column::Volume) => {
                missing.push(column.header().to_string());
            }
            None => {}
        }
    }

    if !missing.is_empty() {
        return Err(InputError::MissingColumns(missing));
    }

    Ok(resolved)
}

/// 將資料列改以標準欄位名稱為鍵，未對應的欄位會被丟棄
pub fn canonicalize(table: &RawTable, map: &ColumnMap) -> Vec<RawRecord> {
    table
        .rows
        .iter()
        .map(|row| {
            map.iter()
                .map(|(column, header)| {
                    let value = row.get(header).cloned().unwrap_or(Value::Null);
                    (column.header(), value)
                })
                .collect()
        })
        .collect()
}

/// Keyword 與 Volume 永遠包含在內，並維持欄位的標準順序
fn with_required(columns: &[Column]) -> Vec<Column> {
    Column::ALL
        .iter()
        .copied()
        .filter(|c| matches!(c, Column::Keyword | Column::Volume) || columns.contains(c))
        .collect()
}

fn text_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// 將資料列投影為固定欄位的 [`Record`]。
///
/// 缺值轉為空字串、搜尋量以 [`parse_volume`] 解析 (負數視為 0)。
/// `filter_empty_intent` 開啟且要求 Intent 欄位時，丟棄 Intent 為空的列。
pub fn format_data(rows: &[RawRecord], columns: &[Column], filter_empty_intent: bool) -> Vec<Record> {
    let columns = with_required(columns);
    let wants = |column: Column| columns.contains(&column);
    let field = |row: &RawRecord, column: Column| text_value(row.get(column.header()));

    rows.iter()
        .map(|row| Record {
            keyword: field(row, Column::Keyword),
            volume: row
                .get(Column::Volume.header())
                .map(parse_volume)
                .unwrap_or(0)
                .max(0) as u64,
            position: wants(Column::Position).then(|| field(row, Column::Position)),
            kind: wants(Column::Type).then(|| field(row, Column::Type)),
            intent: wants(Column::Intent).then(|| field(row, Column::Intent).trim().to_string()),
        })
        .filter(|record| {
            !(filter_empty_intent && record.intent.as_deref().is_some_and(str::is_empty))
        })
        .collect()
}

/// `running-shoes_fr_2024.csv` -> `Running Shoes`
pub fn format_sheet_name(file_name: &str) -> String {
    let stem = file_stem(file_name);
    let keyword_part = stem.split('_').next().unwrap_or_default();

    keyword_part
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 第一個 `.` 之前的檔名
pub fn file_stem(file_name: &str) -> &str {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    base.split('.').next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(pairs: &[(&str, Value)]) -> RawRecord {
        pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_format_data_projects_and_coerces() {
        let rows = vec![raw(&[
            ("Keyword", json!("polo shirt")),
            ("Volume", json!("1,200")),
            ("Intent", json!(" commercial ")),
            ("CPC (USD)", json!("1.20")),
        ])];
        let records = format_data(&rows, &[Column::Keyword, Column::Intent, Column::Volume], false);

        assert_eq!(
            records,
            vec![Record::new("polo shirt", 1200).with_intent("commercial")]
        );
        assert_eq!(records[0].position, None);
    }

    #[test]
    fn test_format_data_defaults_missing_fields() {
        let rows = vec![raw(&[("Keyword", Value::Null), ("Position", json!(4))])];
        let records = format_data(&rows, &[Column::Position, Column::Type], false);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].keyword, "");
        assert_eq!(records[0].volume, 0);
        assert_eq!(records[0].position.as_deref(), Some("4"));
        assert_eq!(records[0].kind.as_deref(), Some(""));
    }

    #[test]
    fn test_format_data_negative_volume_clamps_to_zero() {
        let rows = vec![raw(&[("Keyword", json!("x")), ("Volume", json!("-40"))])];
        assert_eq!(format_data(&rows, &[], false)[0].volume, 0);
    }

    #[test]
    fn test_format_data_drops_empty_intent_when_requested() {
        let rows = vec![
            raw(&[("Keyword", json!("a")), ("Volume", json!(10)), ("Intent", json!(""))]),
            raw(&[("Keyword", json!("b")), ("Volume", json!(20)), ("Intent", json!("informational"))]),
            raw(&[("Keyword", json!("c")), ("Volume", json!(30))]),
        ];

        let kept = format_data(&rows, &[Column::Intent], true);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].keyword, "b");

        // 沒有要求 Intent 欄位時不做過濾
        assert_eq!(format_data(&rows, &[], true).len(), 3);
        assert_eq!(format_data(&rows, &[Column::Intent], false).len(), 3);
    }

    #[test]
    fn test_resolve_columns_exact_is_case_sensitive() {
        let found = resolve_columns(
            &headers(&[" Keyword ", "Volume", "Intent"]),
            &[Column::Intent],
            HeaderMatching::Exact,
        )
        .unwrap();
        assert_eq!(found.get(&Column::Keyword).map(String::as_str), Some(" Keyword "));
        assert_eq!(found.get(&Column::Intent).map(String::as_str), Some("Intent"));

        let err = resolve_columns(&headers(&["keyword", "volume"]), &[], HeaderMatching::Exact)
            .unwrap_err();
        assert_eq!(
            err,
            InputError::MissingColumns(vec!["Keyword".to_string(), "Volume".to_string()])
        );
    }

    #[test]
    fn test_resolve_columns_fallback_aliases() {
        let found = resolve_columns(
            &headers(&["keyword", "Position", "Search Volume", "Position Type", "URL"]),
            &[Column::Position, Column::Type],
            HeaderMatching::Fallback,
        )
        .unwrap();
        assert_eq!(found.get(&Column::Volume).map(String::as_str), Some("Search Volume"));
        assert_eq!(found.get(&Column::Type).map(String::as_str), Some("Position Type"));
        assert_eq!(found.len(), 4);

        let err = resolve_columns(&headers(&["Keyword", "CPC"]), &[], HeaderMatching::Fallback)
            .unwrap_err();
        assert_eq!(err, InputError::MissingColumns(vec!["Volume".to_string()]));
    }

    #[test]
    fn test_canonicalize_renames_headers() {
        let table = RawTable {
            headers: headers(&["keyword", "Search Volume", "Keyword Difficulty"]),
            rows: vec![raw(&[
                ("keyword", json!("linen shirt")),
                ("Search Volume", json!("880")),
                ("Keyword Difficulty", json!(35)),
            ])],
        };
        let map = resolve_columns(&table.headers, &[], HeaderMatching::Fallback).unwrap();
        let rows = canonicalize(&table, &map);

        assert_eq!(rows[0].get("Keyword"), Some(&json!("linen shirt")));
        assert_eq!(rows[0].get("Volume"), Some(&json!("880")));
        assert!(rows[0].get("Keyword Difficulty").is_none());
    }

    #[test]
    fn test_format_sheet_name() {
        assert_eq!(format_sheet_name("running-shoes_fr_2024.csv"), "Running Shoes");
        assert_eq!(format_sheet_name("POLO.xlsx"), "Polo");
        assert_eq!(format_sheet_name("exports/linen-SHIRT.v2.csv"), "Linen Shirt");
        assert_eq!(file_stem("competitor-a.2024.xlsx"), "competitor-a");
    }
}
