//! Cone Search dispatch, background execution and cost prediction.

pub mod background;
pub mod dispatcher;
pub mod predict;

pub use background::{AsyncConeSearch, AsyncSearchAll, BackgroundTask, TaskState};
pub use dispatcher::{Candidate, CatalogSelector, ConeSearch, SearchOptions};
