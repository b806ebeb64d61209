use crate::domain::constants::QUESTION_WORDS;
use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// U+0300..U+036F 組合用附加符號
const COMBINING_DIACRITICS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

static SEPARATOR_REGEX: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();
static SUFFIX_RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

fn separator_regex() -> &'static Regex {
    SEPARATOR_REGEX.get_or_init(|| {
        Regex::new(r#"[-_&/\\,.~’'"“”()\[\]{}]"#).expect("separator regex is valid")
    })
}

fn whitespace_regex() -> &'static Regex {
    WHITESPACE_REGEX.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex is valid"))
}

/// 依序套用的字尾規則，每條都作用在前一條的輸出上
fn suffix_rules() -> &'static [(Regex, &'static str)] {
    SUFFIX_RULES.get_or_init(|| {
        [
            ("s$", ""),
            ("es$", ""),
            ("ies$", "y"),
            ("aux$", "al"),
            ("eux$", "eu"),
        ]
        .into_iter()
        .map(|(pattern, replacement)| {
            (
                Regex::new(pattern).expect("suffix regex is valid"),
                replacement,
            )
        })
        .collect()
    })
}

/// 將關鍵字正規化，只用於比較是否相等，不可用於顯示。
///
/// 小寫化、去除重音、展開連字 (œ æ ø ß)、標點轉空白，
/// 最後以簡單的字尾規則近似詞幹還原。
pub fn normalize_keyword(keyword: &str) -> String {
    if keyword.is_empty() {
        return String::new();
    }

    let folded: String = keyword
        .to_lowercase()
        .nfd()
        .filter(|c| !COMBINING_DIACRITICS.contains(c))
        .fold(String::with_capacity(keyword.len()), |mut out, c| {
            match c {
                'œ' => out.push_str("oe"),
                'æ' => out.push_str("ae"),
                'ø' => out.push('o'),
                'ß' => out.push_str("ss"),
                other => out.push(other),
            }
            out
        });

    let spaced = separator_regex().replace_all(&folded, " ");
    let mut normalized = whitespace_regex()
        .replace_all(&spaced, " ")
        .trim()
        .to_string();

    for (rule, replacement) in suffix_rules() {
        normalized = rule.replace(&normalized, *replacement).into_owned();
    }

    normalized
}

/// 關鍵字是否為問句：以疑問詞開頭 (純字首比對)，或包含前後皆為空白的疑問詞
pub fn is_question_keyword(keyword: &str) -> bool {
    let lowered = keyword.trim().to_lowercase();
    if lowered.is_empty() {
        return false;
    }

    QUESTION_WORDS
        .iter()
        .any(|word| lowered.starts_with(word) || lowered.contains(&format!(" {} ", word)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators_collapse_to_single_space() {
        assert_eq!(normalize_keyword("t-shirt"), normalize_keyword("t shirt"));
        assert_eq!(normalize_keyword("t-shirt"), "t shirt");
        assert_eq!(normalize_keyword("  Polo_(Homme) / Slim  "), "polo homme slim");
    }

    #[test]
    fn test_accents_and_ligatures_are_folded() {
        assert_eq!(normalize_keyword("café"), normalize_keyword("cafe"));
        assert_eq!(normalize_keyword("Jaquette Façon Œuvre"), "jaquette facon oeuvre");
        assert_eq!(normalize_keyword("straße"), "strasse");
        assert_eq!(normalize_keyword("Ærø"), "aero");
        assert_eq!(normalize_keyword("niño"), "nino");
    }

    #[test]
    fn test_plural_suffixes() {
        assert_eq!(normalize_keyword("polo shirts"), "polo shirt");
        assert_eq!(normalize_keyword("chevaux"), "cheval");
        assert_eq!(normalize_keyword("cheveux"), "cheveu");
    }

    #[test]
    fn test_suffix_rules_chain_on_the_same_string() {
        // "s" 與 "es" 會先後作用在同一個字串上
        assert_eq!(normalize_keyword("chess"), "ch");
    }

    #[test]
    fn test_known_false_positive_merges() {
        // 已知的誤判："news" 與 "new" 會被視為同一個字
        assert_eq!(normalize_keyword("news"), normalize_keyword("new"));
        assert_eq!(normalize_keyword("bus"), normalize_keyword("bu"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_keyword(""), "");
        assert_eq!(normalize_keyword("  --  "), "");
    }

    #[test]
    fn test_question_keywords() {
        assert!(is_question_keyword("How to wash a polo"));
        assert!(is_question_keyword("polo shirt what size"));
        assert!(is_question_keyword("Comment laver un polo"));
        assert!(is_question_keyword("polo où acheter"));
        assert!(is_question_keyword("est-ce que le lin rétrécit"));
        assert!(is_question_keyword("comment?"));
        assert!(is_question_keyword("Pourquoi?"));
        assert!(!is_question_keyword("polo shirt"));
        assert!(!is_question_keyword("chemise en lin"));
        assert!(!is_question_keyword(""));
    }

    #[test]
    fn test_question_prefix_is_not_whole_word() {
        // 字首比對也會接受以疑問詞開頭的一般字詞 (已知的誤判)
        assert!(is_question_keyword("howto guide"));
        assert!(is_question_keyword("whatsapp polo"));
        assert!(is_question_keyword("however polo"));
        // 句中的疑問詞仍需前後都是空白
        assert!(!is_question_keyword("polo showhow"));
    }

    #[test]
    fn test_only_latin_diacritics_are_stripped() {
        assert_eq!(normalize_keyword("résumé"), "resume");
        // 其他文字的組合符號 (例如天城文母音符號) 必須保留
        assert_ne!(normalize_keyword("कि"), normalize_keyword("क"));
        assert_eq!(normalize_keyword("कि"), "कि");
    }
}
