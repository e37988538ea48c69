//! Builder API for assembling a model and its action catalogue.
//!
//! Most charts start from a fixed set of project actions. [`ModelBuilder`]
//! registers those up front so the returned [`Model`](crate::model::Model)
//! is ready for states to reference them.

pub mod error;
pub mod model;

pub use error::BuildError;
pub use model::ModelBuilder;
