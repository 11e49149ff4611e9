pub mod etl;
pub mod export;
pub mod graph;
pub mod pipeline;
pub mod rules;

pub use crate::domain::model::{Dataset, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
