use crate::core::pipeline::PipelineOptions;
use crate::core::report::ReportOptions;
use crate::core::ConfigProvider;
use crate::domain::constants::SUPPORTED_EXTENSIONS;
use crate::domain::model::ToolKind;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub report: ReportConfig,
    pub input: InputConfig,
    pub filters: Option<FiltersConfig>,
    pub relevancy: Option<RelevancyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub name: Option<String>,
    pub output_path: String,
    pub tool: Option<ToolKind>,
    pub include_summary: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiltersConfig {
    pub min_volume: Option<u64>,
    pub default_stores: Option<bool>,
    pub custom_words: Option<Vec<String>>,
    pub remove_duplicates: Option<bool>,
    pub questions_only: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelevancyConfig {
    pub main_keyword: Option<String>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${KEYWORD_EXPORTS})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    fn filters(&self) -> FiltersConfig {
        self.filters.clone().unwrap_or_default()
    }

    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_file_extensions(
            "input.files",
            &self.input.files,
            SUPPORTED_EXTENSIONS,
        )?;

        crate::utils::validation::validate_path("report.output_path", &self.report.output_path)?;

        if let Some(name) = &self.report.name {
            crate::utils::validation::validate_non_empty_string("report.name", name)?;
        }

        if let Some(words) = self.filters.as_ref().and_then(|f| f.custom_words.as_ref()) {
            for word in words {
                crate::utils::validation::validate_non_empty_string("filters.custom_words", word)?;
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn input_files(&self) -> &[String] {
        &self.input.files
    }

    fn output_path(&self) -> &str {
        &self.report.output_path
    }

    fn output_name(&self) -> &str {
        self.report
            .name
            .as_deref()
            .unwrap_or_else(|| self.tool().default_output_name())
    }

    fn tool(&self) -> ToolKind {
        self.report.tool.unwrap_or_default()
    }

    fn pipeline_options(&self) -> PipelineOptions {
        let filters = self.filters();
        let mut options = PipelineOptions::for_tool(self.tool());

        if let Some(min_volume) = filters.min_volume {
            options.min_volume = min_volume;
        }
        if filters.default_stores == Some(false) {
            options.forbidden.clear_defaults();
        }
        for word in filters.custom_words.iter().flatten() {
            options.forbidden.add_custom(word);
        }
        options.remove_duplicates = filters.remove_duplicates.unwrap_or(false);
        options
    }

    fn report_options(&self) -> ReportOptions {
        ReportOptions {
            include_summary: self.report.include_summary.unwrap_or(true),
            questions_only: self.filters().questions_only.unwrap_or(false),
            main_keyword: self.relevancy.as_ref().and_then(|r| r.main_keyword.clone()),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
