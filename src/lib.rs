//! Read-only access to the Things 3 database.
//!
//! [`Things`] is the entry point: it resolves the store location, runs the
//! parameterized queries from [`query`] through a read-only [`Database`], and
//! shapes the rows into [`model`] entities.

pub mod api;
pub mod db;
pub mod error;
pub mod filter;
pub mod model;
pub mod output;
pub mod paths;
pub mod query;
pub mod validate;

#[cfg(test)]
mod fixture;

pub use api::{link, show, Things};
pub use db::Database;
pub use error::{Error, Result};
pub use filter::{AreaQuery, Filter, TagQuery, TaskQuery};
pub use model::{Area, Entity, Status, Tag, Task, TaskType};
