//! Multi-select "chip" state shared by search selections and hierarchy
//! consumers.

use serde::{Deserialize, Serialize};

use crate::types::Facet;

/// One selected search term and the facet it was chosen from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedTerm {
    pub term: String,
    pub facet: Facet,
}

impl SelectedTerm {
    #[must_use]
    pub fn new(term: impl Into<String>, facet: Facet) -> Self {
        Self {
            term: term.into(),
            facet,
        }
    }
}

/// Ordered list of selected terms.
///
/// The set is single-facet at any time: adding a term whose facet differs
/// from the current set's facet replaces the whole set. The invariant holds
/// uniformly across all facets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionChipState {
    terms: Vec<SelectedTerm>,
}

impl SelectionChipState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Facet shared by every term currently in the set.
    #[must_use]
    pub fn active_facet(&self) -> Option<Facet> {
        self.terms.first().map(|term| term.facet)
    }

    /// Add a term. Same-facet terms append (ignoring exact duplicates); a
    /// different facet replaces the set wholesale.
    pub fn add(&mut self, term: SelectedTerm) {
        match self.active_facet() {
            Some(facet) if facet == term.facet => {
                if !self.terms.contains(&term) {
                    self.terms.push(term);
                }
            }
            _ => self.terms = vec![term],
        }
    }

    /// Remove a term by its text. Removing the last chip empties the set.
    pub fn remove(&mut self, term: &str) {
        self.terms.retain(|selected| selected.term != term);
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    /// A selection is valid once at least one term is chosen.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.terms.is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[must_use]
    pub fn terms(&self) -> &[SelectedTerm] {
        &self.terms
    }
}
