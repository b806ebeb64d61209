pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use args::CliConfig;

#[cfg(feature = "cli")]
mod args {
    use crate::core::pipeline::PipelineOptions;
    use crate::core::report::ReportOptions;
    use crate::core::ConfigProvider;
    use crate::domain::constants::{DEFAULT_MIN_VOLUME, SUPPORTED_EXTENSIONS};
    use crate::domain::model::ToolKind;
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "keyword-etl")]
    #[command(about = "Clean, filter and combine keyword research exports")]
    pub struct CliConfig {
        #[arg(long, value_delimiter = ',', required = true, help = "Input .xlsx/.xls/.csv files")]
        pub input: Vec<String>,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, help = "Archive name without extension (defaults per tool)")]
        pub output_name: Option<String>,

        #[arg(long, value_enum, default_value_t = ToolKind::Filter)]
        pub tool: ToolKind,

        #[arg(long, default_value_t = DEFAULT_MIN_VOLUME)]
        pub min_volume: u64,

        #[arg(long, value_delimiter = ',', help = "Extra forbidden words (comma separated)")]
        pub custom_words: Vec<String>,

        #[arg(long, help = "Do not filter the built-in store names")]
        pub no_default_stores: bool,

        #[arg(long, help = "Keep only the highest-volume variant of similar keywords")]
        pub remove_duplicates: bool,

        #[arg(long, help = "Only question keywords in the relevancy summary")]
        pub questions_only: bool,

        #[arg(long)]
        pub main_keyword: Option<String>,

        #[arg(long, help = "Skip the summary sheet (the relevancy summary holds the opportunity table)")]
        pub no_summary: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl ConfigProvider for CliConfig {
        fn input_files(&self) -> &[String] {
            &self.input
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_name(&self) -> &str {
            self.output_name
                .as_deref()
                .unwrap_or_else(|| self.tool.default_output_name())
        }

        fn tool(&self) -> ToolKind {
            self.tool
        }

        fn pipeline_options(&self) -> PipelineOptions {
            let mut options = PipelineOptions::for_tool(self.tool);
            options.min_volume = self.min_volume;
            options.remove_duplicates = self.remove_duplicates;
            if self.no_default_stores {
                options.forbidden.clear_defaults();
            }
            for word in &self.custom_words {
                options.forbidden.add_custom(word);
            }
            options
        }

        fn report_options(&self) -> ReportOptions {
            ReportOptions {
                include_summary: !self.no_summary,
                questions_only: self.questions_only,
                main_keyword: self.main_keyword.clone(),
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_file_extensions("input", &self.input, SUPPORTED_EXTENSIONS)?;
            validation::validate_path("output_path", &self.output_path)?;
            if let Some(name) = &self.output_name {
                validation::validate_non_empty_string("output_name", name)?;
            }
            Ok(())
        }
    }

}
