use crate::core::Record;
use crate::domain::constants::DEFAULT_STORES;
use crate::utils::error::{EtlError, Result};
use regex::Regex;

/// 禁用字清單：內建的商店名稱與使用者自訂的字詞。
///
/// 兩層清單只用於統計是哪一層移除了資料列。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForbiddenWords {
    defaults: Vec<String>,
    custom: Vec<String>,
}

impl Default for ForbiddenWords {
    fn default() -> Self {
        Self::with_default_stores()
    }
}

impl ForbiddenWords {
    pub fn empty() -> Self {
        Self {
            defaults: Vec::new(),
            custom: Vec::new(),
        }
    }

    pub fn with_default_stores() -> Self {
        Self {
            defaults: DEFAULT_STORES.iter().map(|s| s.to_string()).collect(),
            custom: Vec::new(),
        }
    }

    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }

    pub fn custom(&self) -> &[String] {
        &self.custom
    }

    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty() && self.custom.is_empty()
    }

    /// 加入自訂字詞 (修剪並轉小寫)；空字串或已存在於任一層時回傳 false
    pub fn add_custom(&mut self, word: &str) -> bool {
        let word = word.trim().to_lowercase();
        if word.is_empty() || self.defaults.contains(&word) || self.custom.contains(&word) {
            return false;
        }
        self.custom.push(word);
        true
    }

    pub fn remove_custom(&mut self, word: &str) -> bool {
        let before = self.custom.len();
        self.custom.retain(|w| w != word);
        self.custom.len() != before
    }

    pub fn remove_default(&mut self, word: &str) -> bool {
        let before = self.defaults.len();
        self.defaults.retain(|w| w != word);
        self.defaults.len() != before
    }

    pub fn clear_defaults(&mut self) {
        self.defaults.clear();
    }

    pub fn restore_defaults(&mut self) {
        self.defaults = DEFAULT_STORES.iter().map(|s| s.to_string()).collect();
    }
}

/// 以整字比對 (不分大小寫) 的禁用字過濾器
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    pattern: Option<Regex>,
}

impl ExclusionFilter {
    pub fn new<S: AsRef<str>>(words: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = words
            .iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .map(|w| regex::escape(&w))
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).map_err(
            |e| EtlError::ConfigError {
                message: format!("Invalid forbidden word list: {}", e),
            },
        )?;

        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn is_excluded(&self, row: &Record) -> bool {
        let Some(pattern) = &self.pattern else {
            return false;
        };
        row.field_values()
            .iter()
            .any(|value| pattern.is_match(&value.to_lowercase()))
    }

    pub fn filter_excluded(&self, rows: Vec<Record>) -> Vec<Record> {
        if self.pattern.is_none() {
            return rows;
        }
        rows.into_iter().filter(|row| !self.is_excluded(row)).collect()
    }
}

/// 兩階段過濾的結果，兩個計數互不重疊
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TieredExclusion {
    pub kept: Vec<Record>,
    pub removed_by_defaults: usize,
    pub removed_by_custom: usize,
}

/// 先以預設清單過濾，再對剩下的列套用自訂清單
pub fn apply_exclusion_tiers(
    rows: Vec<Record>,
    defaults: &ExclusionFilter,
    custom: &ExclusionFilter,
) -> TieredExclusion {
    let before = rows.len();
    let after_defaults = defaults.filter_excluded(rows);
    let removed_by_defaults = before - after_defaults.len();

    let before_custom = after_defaults.len();
    let kept = custom.filter_excluded(after_defaults);
    let removed_by_custom = before_custom - kept.len();

    TieredExclusion {
        kept,
        removed_by_defaults,
        removed_by_custom,
    }
}
