pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, toml_config::TomlConfig, CliConfig};
pub use self::core::{etl::EtlEngine, pipeline::SankeyPipeline, rules::build};
pub use domain::model::{Dataset, DiagramKind, DiagramSlot, FlowGraph, Link, Node};
pub use utils::error::{FlowError, Result};
