//! Generic parameterized data-access layer over SQLite.
//!
//! Every query in the crate flows through [`Store::execute`], which binds
//! parameters positionally as text and materializes results as ordered
//! column-name→value mappings. No business logic lives here.

mod access;
mod rows;

pub use access::{Store, StoreError};
pub use rows::{Row, RowSet};
