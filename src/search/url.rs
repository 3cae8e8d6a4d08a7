//! Query-string mirror of the selection set.
//!
//! The selection is the only state this crate persists externally: the terms
//! join with semicolons under one parameter and the active facet's slug goes
//! under another, so a shared URL reproduces the identical selection.

use crate::chips::{SelectedTerm, SelectionChipState};
use crate::types::Facet;

/// Parameter carrying the semicolon-joined terms.
pub const TERMS_PARAM: &str = "terms";
/// Parameter carrying the active facet slug.
pub const FACET_PARAM: &str = "type_search";

const SEPARATOR: char = ';';

/// Serialize a selection into its `(terms, facet)` parameter values.
/// `None` means the mirrored parameters must be cleared.
#[must_use]
pub fn encode(chips: &SelectionChipState) -> Option<(String, String)> {
    let facet = chips.active_facet()?;
    let terms = chips
        .terms()
        .iter()
        .map(|selected| selected.term.as_str())
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string());
    Some((terms, facet.slug().to_string()))
}

/// Rebuild a selection from mirrored parameter values. Unknown facet slugs
/// and empty term lists both produce an empty selection.
#[must_use]
pub fn decode(terms: &str, facet_slug: &str) -> SelectionChipState {
    let mut chips = SelectionChipState::new();
    let Some(facet) = Facet::from_slug(facet_slug) else {
        return chips;
    };
    for term in terms.split(SEPARATOR) {
        let term = term.trim();
        if !term.is_empty() {
            chips.add(SelectedTerm::new(term, facet));
        }
    }
    chips
}
