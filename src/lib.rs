pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{
    source::{FileSource, HttpSource},
    storage::LocalStorage,
};
#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::CleanerConfig;
pub use crate::core::{etl::EtlEngine, mapping::FieldMapping, pipeline::RecipePipeline};
pub use domain::model::{Ingredient, Recipe, RecipeCollection, RecordIssue, Step};
pub use utils::error::{EtlError, Result};
