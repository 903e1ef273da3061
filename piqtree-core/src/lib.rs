//! Shared primitives for the piqtree workspace.
//!
//! `piqtree-core` provides the foundation the other piqtree crates build on:
//!
//! - **Error types**: [`PiqtreeError`] and [`Result`] for structured error handling
//! - **Traits**: [`Annotated`] for described vocabulary, [`Summarizable`] for one-line summaries

pub mod error;
pub mod traits;

pub use error::{PiqtreeError, Result};
pub use traits::*;
