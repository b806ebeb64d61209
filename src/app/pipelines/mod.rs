pub mod keyword_pipeline;

pub use keyword_pipeline::KeywordPipeline;
