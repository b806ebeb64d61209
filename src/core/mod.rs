pub mod aggregate;
pub mod dedup;
pub mod etl;
pub mod exclusion;
pub mod formatter;
pub mod keyword;
pub mod pipeline;
pub mod report;
pub mod volume;

pub use crate::domain::model::{Column, FileResult, RawRecord, RawTable, Record, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
