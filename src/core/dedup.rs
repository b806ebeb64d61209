use crate::core::keyword::normalize_keyword;
use crate::core::Record;
use std::collections::HashMap;

/// 以正規化後的關鍵字分組，每組保留搜尋量最高的一列。
///
/// 搜尋量相同時保留最先出現的列；輸出順序為各組第一次出現的順序。
pub fn deduplicate_keywords(rows: &[Record]) -> Vec<Record> {
    let mut winners: Vec<&Record> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let key = normalize_keyword(&row.keyword);
        match index.get(&key).copied() {
            Some(slot) => {
                if row.volume > winners[slot].volume {
                    winners[slot] = row;
                }
            }
            None => {
                index.insert(key, winners.len());
                winners.push(row);
            }
        }
    }

    winners.into_iter().cloned().collect()
}
