pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlConfig;

pub use app::pipelines::KeywordPipeline;
pub use core::{etl::EtlEngine, pipeline::FilePipeline};
pub use utils::error::{EtlError, Result};
