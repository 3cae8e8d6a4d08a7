//! Per-facet query shapes and limits.

use serde::{Deserialize, Serialize};

use crate::normalize::CaseFold;
use crate::types::{Facet, RecordField};

/// Highest code point, appended to a prefix to form the inclusive upper bound
/// of a range scan.
pub const RANGE_SENTINEL: char = '\u{10FFFF}';

/// How a facet's candidates are fetched from the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    /// Prefix range scan over one scalar field.
    Prefix { field: RecordField },
    /// Membership scan over the tokenized description array.
    Membership,
}

/// One row of the facet strategy table.
#[derive(Debug, Clone, Copy)]
pub struct FacetStrategy {
    pub facet: Facet,
    pub shape: QueryShape,
    pub fold: CaseFold,
}

/// The fixed strategy table. The composite-exact strategy is not listed here:
/// it preempts the whole fan-out whenever the input splits into a composite
/// pair.
pub const STRATEGIES: [FacetStrategy; 6] = [
    FacetStrategy {
        facet: Facet::Code,
        shape: QueryShape::Prefix {
            field: RecordField::AssetCode,
        },
        fold: CaseFold::Preserve,
    },
    FacetStrategy {
        facet: Facet::AtmNumber,
        shape: QueryShape::Prefix {
            field: RecordField::AtmNumber,
        },
        fold: CaseFold::Preserve,
    },
    FacetStrategy {
        facet: Facet::MaterialName,
        shape: QueryShape::Prefix {
            field: RecordField::MaterialName,
        },
        fold: CaseFold::Upper,
    },
    FacetStrategy {
        facet: Facet::LocationName,
        shape: QueryShape::Prefix {
            field: RecordField::LocationName,
        },
        fold: CaseFold::Upper,
    },
    FacetStrategy {
        facet: Facet::DescriptionToken,
        shape: QueryShape::Membership,
        fold: CaseFold::Lower,
    },
    FacetStrategy {
        facet: Facet::ResponsibleName,
        shape: QueryShape::Prefix {
            field: RecordField::ResponsibleName,
        },
        fold: CaseFold::Upper,
    },
];

/// Caps and thresholds governing the engine. The defaults mirror the remote
/// collection's practical limits; the settings layer may override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scan cap for identifier- and name-like facets.
    pub identifier_scan_cap: usize,
    /// Scan cap for the description facet. Wider than the identifier cap
    /// because token extraction narrows the candidate pool client-side.
    pub token_scan_cap: usize,
    /// Per-facet bucket cap for record suggestions.
    pub bucket_cap: usize,
    /// Bucket cap for distinct description tokens.
    pub token_bucket_cap: usize,
    /// Tokens shorter than this never become suggestions.
    pub min_token_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            identifier_scan_cap: 100,
            token_scan_cap: 5000,
            bucket_cap: 20,
            token_bucket_cap: 30,
            min_token_len: 3,
        }
    }
}

impl FacetStrategy {
    /// Scan cap for this facet under `config`.
    #[must_use]
    pub fn scan_cap(&self, config: &EngineConfig) -> usize {
        match self.shape {
            QueryShape::Prefix { .. } => config.identifier_scan_cap,
            QueryShape::Membership => config.token_scan_cap,
        }
    }
}
