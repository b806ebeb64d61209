/// 預設會被過濾掉的電商/品牌名稱
pub const DEFAULT_STORES: &[&str] = &[
    "lacoste", "zalando", "asos", "amazon", "farfetch", "mytheresa",
    "net-a-porter", "matchesfashion", "ssense", "nordstrom", "shopbop",
    "luisaviaroma", "ralph lauren", "tommy hilfiger", "calvin klein",
    "hugo boss", "nike", "adidas", "puma", "the outnet", "yoox",
    "end clothing", "mr porter", "browns fashion", "flannels", "selfridges",
    "harrods", "bloomingdales", "saks fifth avenue", "neiman marcus",
    "bergdorf goodman", "galeries lafayette", "printemps", "la redoute",
    "spartoo", "about you", "boozt", "breuninger",
];

pub const DEFAULT_MIN_VOLUME: u64 = 100;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv"];

/// 英文與法文的疑問詞
pub const QUESTION_WORDS: &[&str] = &[
    "what", "how", "why", "when", "where", "who", "whom", "whose", "which",
    "can", "could", "should", "would", "will", "does", "do", "did", "is", "are",
    "was", "were",
    "comment", "pourquoi", "quand", "où", "qui", "quoi", "quel", "quelle",
    "quels", "quelles", "combien", "lequel", "laquelle", "lesquels",
    "lesquelles", "est-ce",
];

pub const EMPTY_SHEET_PLACEHOLDER: &str = "No results found - Keywords likely have 0 search volume";

pub const NO_OPPORTUNITIES_PLACEHOLDER: &str = "No keywords matched the selected filters";
