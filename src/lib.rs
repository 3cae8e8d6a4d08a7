//! Interactive search and resolution for a physical-asset registry.
//!
//! Two coupled subsystems make up the crate: a faceted search engine that
//! turns free text into typed, capped, de-duplicated result buckets, and a
//! cascading resolver for the four-level Unit → Agency → Sector → Location
//! hierarchy. Both guard against out-of-order asynchronous responses with
//! per-channel monotonic tokens and hand results back to their callers
//! through injected listeners; neither touches any ambient state.

pub mod backend;
pub mod chips;
pub mod debounce;
pub mod guard;
pub mod hierarchy;
pub mod normalize;
pub mod search;
pub mod types;

pub use backend::{BackendError, HierarchyDirectory, RecordStore};
pub use chips::{SelectedTerm, SelectionChipState};
pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use guard::RequestGuard;
pub use hierarchy::{HierarchyResolver, LevelFetch, LevelResponse, ResolverSnapshot};
pub use search::{EngineConfig, FacetResponse, FacetSearchEngine, Suggestion};
pub use types::{Facet, HierarchyNode, Level, ResolverSelection, SearchableRecord};
