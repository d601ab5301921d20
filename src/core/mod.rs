pub mod etl;

pub use crate::domain::model::{RawArticle, ScoredArticle};
pub use crate::domain::ports::{EntityRecognizer, Pipeline, Storage};
pub use crate::utils::error::Result;
