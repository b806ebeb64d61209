use crate::domain::model::{RawRecord, RawTable};
use crate::utils::error::InputError;
use calamine::{Data, Reader};
use serde_json::Value;
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Workbook,
}

impl FileFormat {
    /// 依副檔名判斷格式 (不分大小寫)；不支援的檔案回傳 `None`
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = std::path::Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_lowercase();
        match extension.as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" | "xls" => Some(FileFormat::Workbook),
            _ => None,
        }
    }
}

pub fn is_supported(file_name: &str) -> bool {
    FileFormat::from_file_name(file_name).is_some()
}

/// 讀取 CSV 或試算表的第一個工作表
pub fn read_table(file_name: &str, bytes: &[u8]) -> Result<RawTable, InputError> {
    let format = FileFormat::from_file_name(file_name)
        .ok_or_else(|| InputError::UnsupportedFileType(file_name.to_string()))?;

    if bytes.is_empty() {
        return Err(InputError::FileEmpty);
    }

    let grid = match format {
        FileFormat::Csv => read_csv_grid(bytes)?,
        FileFormat::Workbook => read_workbook_grid(bytes)?,
    };

    table_from_grid(grid)
}

fn read_csv_grid(bytes: &[u8]) -> Result<Vec<Vec<Value>>, InputError> {
    let text = std::str::from_utf8(bytes).map_err(|_| InputError::InvalidCsvFormat)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|_| InputError::InvalidCsvFormat)?;
        grid.push(
            record
                .iter()
                .map(|cell| {
                    if cell.is_empty() {
                        Value::Null
                    } else {
                        Value::String(cell.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(grid)
}

fn read_workbook_grid(bytes: &[u8]) -> Result<Vec<Vec<Value>>, InputError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|_| InputError::InvalidWorkbookFormat)?;

    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(InputError::NoSheetsFound)?;

    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|_| InputError::SheetParsing)?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_value).collect())
        .collect())
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Data::String(s) => Value::String(s.clone()),
        other => Value::String(other.to_string()),
    }
}

fn is_blank(cell: &Value) -> bool {
    match cell {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn table_from_grid(grid: Vec<Vec<Value>>) -> Result<RawTable, InputError> {
    let mut rows = grid
        .into_iter()
        .filter(|row| !row.iter().all(is_blank));

    let header_row = rows.next().ok_or(InputError::EmptySheet)?;
    // 第一列必須至少有一個非數字的文字儲存格才算是表頭
    let has_text_header = header_row.iter().any(|cell| match cell {
        Value::String(s) => !s.trim().is_empty() && s.trim().parse::<f64>().is_err(),
        _ => false,
    });
    if !has_text_header {
        return Err(InputError::NoHeadersFound);
    }

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| match cell {
            Value::Null => String::new(),
            Value::String(s) => s.trim().to_string(),
            other => other.to_string(),
        })
        .collect();

    let records = rows
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .filter(|(_, header)| !header.is_empty())
                .map(|(i, header)| (header.clone(), row.get(i).cloned().unwrap_or(Value::Null)))
                .collect::<RawRecord>()
        })
        .collect();

    Ok(RawTable {
        headers: headers.into_iter().filter(|h| !h.is_empty()).collect(),
        rows: records,
    })
}
