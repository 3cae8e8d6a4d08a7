//! The cascading hierarchy resolver and its background worker.

mod resolver;
mod worker;

pub use resolver::{HierarchyResolver, LevelFetch, LevelResponse, ResolverSnapshot};
pub use worker::{DirectoryCommand, spawn};
