use crate::core::keyword::is_question_keyword;
use crate::core::{FileResult, Record};
use crate::domain::model::{Competitor, KeywordOccurrence};
use std::collections::HashMap;

/// 無法解析為數字 (或為 0) 的排名一律視為最差名次
pub const WORST_POSITION: f64 = 999.0;

/// 將排名字串轉為可比較的數值，空白、非數字與 0 回傳 [`WORST_POSITION`]
pub fn position_rank(position: &str) -> f64 {
    let trimmed = position.trim();
    if trimmed.is_empty() {
        return WORST_POSITION;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value != 0.0 => value,
        _ => WORST_POSITION,
    }
}

impl KeywordOccurrence {
    fn first_seen(row: &Record, source: &str) -> Self {
        let position = row.position.clone().unwrap_or_default();
        Self {
            keyword: row.keyword.clone(),
            position: position.clone(),
            volume: row.volume,
            kind: row.kind.clone().unwrap_or_default(),
            occurrences: 1,
            total_volume: row.volume,
            competitors: vec![Competitor {
                name: source.to_string(),
                position,
                volume: row.volume,
            }],
        }
    }

    fn merge(&mut self, row: &Record, source: &str) {
        let position = row.position.clone().unwrap_or_default();
        match self.competitors.iter_mut().find(|c| c.name == source) {
            Some(existing) => {
                // 同一來源重複出現時只更新為較好的排名
                if position_rank(&position) < position_rank(&existing.position) {
                    existing.position = position;
                }
            }
            None => {
                self.occurrences += 1;
                self.total_volume += row.volume;
                self.competitors.push(Competitor {
                    name: source.to_string(),
                    position,
                    volume: row.volume,
                });
            }
        }
    }

    /// 所有來源中最好的排名
    pub fn best_position(&self) -> f64 {
        self.competitors
            .iter()
            .map(|c| position_rank(&c.position))
            .fold(WORST_POSITION, f64::min)
    }

    /// 例如 `Brand A(#3), Brand B(#1)`
    pub fn competitor_details(&self) -> String {
        self.competitors
            .iter()
            .map(|c| format!("{}(#{})", c.name, c.position))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// 彙總所有檔案的過濾後資料，依第一次出現的順序回傳
pub fn aggregate(files: &[FileResult]) -> Vec<KeywordOccurrence> {
    aggregate_matching(files, |_| true)
}

/// 同 [`aggregate`]，但只納入符合條件的列
pub fn aggregate_matching<F>(files: &[FileResult], include: F) -> Vec<KeywordOccurrence>
where
    F: Fn(&Record) -> bool,
{
    let mut entries: Vec<KeywordOccurrence> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for file in files {
        let source = file.sheet_name();
        for row in file.filtered_data().iter().filter(|r| include(*r)) {
            let key = row.keyword.to_lowercase();
            if key.is_empty() {
                continue;
            }

            match index.get(&key).copied() {
                Some(slot) => entries[slot].merge(row, source),
                None => {
                    index.insert(key, entries.len());
                    entries.push(KeywordOccurrence::first_seen(row, source));
                }
            }
        }
    }

    entries
}

/// 依出現次數、再依總搜尋量由高到低排序；完全相同時維持原順序
pub fn rank(mut occurrences: Vec<KeywordOccurrence>) -> Vec<KeywordOccurrence> {
    occurrences.sort_by(|a, b| {
        b.occurrences
            .cmp(&a.occurrences)
            .then_with(|| b.total_volume.cmp(&a.total_volume))
    });
    occurrences
}

/// 排序後的關鍵字機會清單
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpportunityReport {
    pub opportunities: Vec<KeywordOccurrence>,
}

impl OpportunityReport {
    /// 沒有任何列符合條件
    pub fn is_empty(&self) -> bool {
        self.opportunities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.opportunities.len()
    }
}

pub fn build_opportunities(files: &[FileResult], questions_only: bool) -> OpportunityReport {
    let occurrences = if questions_only {
        aggregate_matching(files, |row| is_question_keyword(&row.keyword))
    } else {
        aggregate(files)
    };

    let opportunities = rank(occurrences);
    tracing::debug!(
        "Aggregated {} keyword opportunities from {} files",
        opportunities.len(),
        files.len()
    );
    OpportunityReport { opportunities }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::StageCounts;

    fn file(sheet: &str, rows: Vec<Record>) -> FileResult {
        FileResult::new(
            format!("{}.csv", sheet),
            sheet,
            rows.clone(),
            rows,
            StageCounts::default(),
        )
    }

    fn row(keyword: &str, volume: u64, position: &str) -> Record {
        Record::new(keyword, volume)
            .with_position(position)
            .with_kind("Organic")
    }

    #[test]
    fn test_position_rank_coercion() {
        assert_eq!(position_rank("3"), 3.0);
        assert_eq!(position_rank(" 12 "), 12.0);
        assert_eq!(position_rank(""), WORST_POSITION);
        assert_eq!(position_rank("n/a"), WORST_POSITION);
        assert_eq!(position_rank("0"), WORST_POSITION);
    }

    #[test]
    fn test_keyword_across_two_sources() {
        let files = vec![
            file("A", vec![row("shoes", 100, "3")]),
            file("B", vec![row("shoes", 200, "1")]),
        ];
        let occurrences = aggregate(&files);

        assert_eq!(occurrences.len(), 1);
        let shoes = &occurrences[0];
        assert_eq!(shoes.occurrences, 2);
        assert_eq!(shoes.total_volume, 300);
        assert_eq!(shoes.competitors.len(), 2);
        assert_eq!(shoes.competitors[0].name, "A");
        assert_eq!(shoes.competitors[1].name, "B");
        assert_eq!(shoes.best_position(), 1.0);
        assert_eq!(shoes.competitor_details(), "A(#3), B(#1)");
    }

    #[test]
    fn test_duplicate_within_source_only_tightens_position() {
        let files = vec![file(
            "A",
            vec![row("shoes", 100, "5"), row("Shoes", 999, "1"), row("shoes", 10, "")],
        )];
        let occurrences = aggregate(&files);

        let shoes = &occurrences[0];
        assert_eq!(shoes.occurrences, 1);
        assert_eq!(shoes.total_volume, 100);
        assert_eq!(shoes.keyword, "shoes");
        assert_eq!(shoes.competitors.len(), 1);
        assert_eq!(shoes.competitors[0].position, "1");
        assert_eq!(shoes.competitors[0].volume, 100);
    }

    #[test]
    fn test_empty_keywords_are_skipped() {
        let files = vec![file("A", vec![row("", 500, "1"), row("polo", 10, "2")])];
        let occurrences = aggregate(&files);
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].keyword, "polo");
    }

    #[test]
    fn test_rank_orders_by_occurrences_then_volume_then_insertion() {
        let files = vec![
            file(
                "A",
                vec![
                    row("solo high", 900, "1"),
                    row("tie one", 50, "2"),
                    row("tie two", 50, "3"),
                    row("shared", 10, "4"),
                ],
            ),
            file("B", vec![row("shared", 20, "1")]),
        ];
        let ranked = rank(aggregate(&files));
        let keywords: Vec<&str> = ranked.iter().map(|o| o.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["shared", "solo high", "tie one", "tie two"]);
    }

    #[test]
    fn test_question_filter_and_empty_state() {
        let files = vec![file(
            "A",
            vec![row("polo shirt", 100, "1"), row("how to fold a polo", 40, "2")],
        )];

        let questions = build_opportunities(&files, true);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions.opportunities[0].keyword, "how to fold a polo");

        let none = build_opportunities(&[], false);
        assert!(none.is_empty());
    }
}
