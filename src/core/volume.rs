use crate::core::Record;
use serde_json::Value;

/// 將各種格式的搜尋量轉為整數。
///
/// 數字原樣回傳 (浮點數向零截斷)；字串會先移除逗號與空白，
/// 再解析開頭的十進位整數；其他型別或無法解析時回傳 0。
pub fn parse_volume(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_u64().map(|v| i64::try_from(v).unwrap_or(i64::MAX)))
            .or_else(|| number.as_f64().map(|v| v as i64))
            .unwrap_or(0),
        Value::String(text) => parse_volume_str(text),
        _ => 0,
    }
}

pub fn parse_volume_str(text: &str) -> i64 {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    parse_leading_integer(&cleaned).unwrap_or(0)
}

fn parse_leading_integer(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // 超出範圍時取上限
    let magnitude: i64 = digits[..end].parse().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// 移除搜尋量低於門檻的列；門檻為 0 時不做任何過濾
pub fn filter_by_volume(rows: Vec<Record>, min_volume: u64) -> Vec<Record> {
    if min_volume == 0 {
        return rows;
    }

    rows.into_iter()
        .filter(|row| row.volume >= min_volume)
        .collect()
}
