pub mod etl;
pub mod mapping;
pub mod normalizer;
pub mod pipeline;
pub mod schema;

pub use crate::domain::model::{RecipeCollection, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, RecipeSource, Storage};
pub use crate::utils::error::Result;
