//! Remote collaborators, abstracted behind traits.
//!
//! The engine and resolver never talk to a concrete storage technology; they
//! see a query capability ([`RecordStore`]) and a per-level listing capability
//! ([`HierarchyDirectory`]). The in-memory implementations back the demo
//! binary and the test suite.

mod memory;

pub use memory::{MemoryDirectory, MemoryFixture, MemoryStore, load_fixture};

use thiserror::Error;

use crate::types::{HierarchyNode, Level, RecordField, SearchableRecord};

/// Failures a collaborator can report. All of them degrade to an empty result
/// at the engine boundary; none of them propagate past it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The remote call failed outright (network error, non-success status).
    #[error("backend request failed: {0}")]
    Unavailable(String),

    /// The response arrived but did not have the expected shape.
    #[error("malformed backend response: {0}")]
    Malformed(String),

    /// A child-level listing was requested without its mandatory parent id.
    #[error("listing {level:?} requires a parent id")]
    MissingParent { level: Level },
}

/// Query capability over the asset-record collection.
pub trait RecordStore: Send + Sync {
    /// Exact compound match on the `(code, check digit)` composite key.
    fn find_exact(
        &self,
        code: &str,
        check_digit: &str,
    ) -> Result<Vec<SearchableRecord>, BackendError>;

    /// Range scan `field >= lower AND field <= upper`, capped.
    fn scan_range(
        &self,
        field: RecordField,
        lower: &str,
        upper: &str,
        cap: usize,
    ) -> Result<Vec<SearchableRecord>, BackendError>;

    /// Substring scan over the pre-tokenized description array, capped.
    /// Documents with any token containing `token` qualify; callers narrow
    /// the candidates to the matching words themselves.
    fn scan_description_containing(
        &self,
        token: &str,
        cap: usize,
    ) -> Result<Vec<SearchableRecord>, BackendError>;
}

/// Listing capability over the four-level organizational hierarchy.
pub trait HierarchyDirectory: Send + Sync {
    /// List nodes at `level`, scoped to `parent_id` (mandatory for every
    /// level below [`Level::Unit`]) and optionally narrowed by a free-text
    /// filter.
    fn list(
        &self,
        level: Level,
        parent_id: Option<&str>,
        filter: Option<&str>,
    ) -> Result<Vec<HierarchyNode>, BackendError>;
}
