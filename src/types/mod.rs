//! Types shared across the search engine and the hierarchy resolver.

mod facet;
mod hierarchy;
mod record;

pub use facet::Facet;
pub use hierarchy::{Agency, HierarchyNode, Level, Location, ResolverSelection, Sector, Unit};
pub use record::{RecordField, SearchableRecord};
