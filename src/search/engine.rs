//! The faceted search engine: plan queries, apply guarded responses, own the
//! selection state and its query-string mirror.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::strategy::{EngineConfig, QueryShape, RANGE_SENTINEL, STRATEGIES};
use super::url;
use crate::backend::RecordStore;
use crate::chips::{SelectedTerm, SelectionChipState};
use crate::guard::RequestGuard;
use crate::normalize::{CaseFold, meets_min_len, normalize, split_composite};
use crate::types::{Facet, RecordField, SearchableRecord};

/// One planned remote query, carrying the guard token its response must
/// present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetQuery {
    pub facet: Facet,
    pub token: u64,
    pub request: QueryRequest,
}

/// The concrete query shape handed to the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRequest {
    Exact {
        code: String,
        check_digit: String,
    },
    Range {
        field: RecordField,
        lower: String,
        upper: String,
        cap: usize,
    },
    Tokens {
        needle: String,
        cap: usize,
    },
}

/// A settled response for one facet. Failed queries arrive with an empty
/// record list; the engine cannot tell and does not care.
#[derive(Debug, Clone)]
pub struct FacetResponse {
    pub facet: Facet,
    pub token: u64,
    pub records: Vec<SearchableRecord>,
}

/// One entry of a result bucket: the selectable term, its facet, and the
/// matched record where one exists (token suggestions carry none).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub term: String,
    pub facet: Facet,
    pub record: Option<SearchableRecord>,
}

/// Serializable engine state handed to the state-change listener.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineSnapshot {
    pub selection: Vec<SelectedTerm>,
    pub buckets: BTreeMap<Facet, Vec<Suggestion>>,
    /// Mirrored query parameters, `None` when the mirror must be cleared.
    pub mirror: Option<(String, String)>,
}

type ValidityListener = Box<dyn FnMut(bool)>;
type StateListener = Box<dyn FnMut(&EngineSnapshot)>;

/// Orchestrates normalization, the strategy table and the request guard into
/// de-duplicated, bucketed, capped result sets.
pub struct FacetSearchEngine {
    config: EngineConfig,
    guard: Arc<RequestGuard>,
    buckets: BTreeMap<Facet, Vec<Suggestion>>,
    chips: SelectionChipState,
    token_needle: String,
    last_validity: bool,
    on_validity_change: Option<ValidityListener>,
    on_state_change: Option<StateListener>,
}

impl FacetSearchEngine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            guard: Arc::new(RequestGuard::new(Facet::ALL.len())),
            buckets: BTreeMap::new(),
            chips: SelectionChipState::new(),
            token_needle: String::new(),
            last_validity: false,
            on_validity_change: None,
            on_state_change: None,
        }
    }

    /// Register the caller's validity listener, invoked on transitions only.
    #[must_use]
    pub fn with_validity_listener(mut self, listener: impl FnMut(bool) + 'static) -> Self {
        self.on_validity_change = Some(Box::new(listener));
        self
    }

    /// Register the caller's state listener, invoked after every settled
    /// change with the serializable current state.
    #[must_use]
    pub fn with_state_listener(mut self, listener: impl FnMut(&EngineSnapshot) + 'static) -> Self {
        self.on_state_change = Some(Box::new(listener));
        self
    }

    /// The guard shared with whatever executes the planned queries.
    #[must_use]
    pub fn guard(&self) -> Arc<RequestGuard> {
        Arc::clone(&self.guard)
    }

    /// Turn raw input into guarded queries.
    ///
    /// Hyphenated input that splits into a composite pair plans the exact
    /// match alone; hyphenated input that does not split plans nothing, as
    /// does input below the minimum length. Everything else fans out one
    /// query per facet.
    pub fn plan(&mut self, raw: &str) -> Vec<FacetQuery> {
        let base = normalize(raw, CaseFold::Preserve);
        if !meets_min_len(&base) {
            self.reset_buckets();
            return Vec::new();
        }

        if base.contains('-') {
            let Some((code, check_digit)) = split_composite(&base) else {
                self.reset_buckets();
                return Vec::new();
            };
            // The exact composite match preempts the code-facet range scan;
            // the joined digits still probe the other identifier facet.
            self.reset_buckets();
            let digits = format!("{code}{check_digit}");
            let code_token = self.guard.issue(Facet::Code.channel());
            let atm_token = self.guard.issue(Facet::AtmNumber.channel());
            return vec![
                FacetQuery {
                    facet: Facet::Code,
                    token: code_token,
                    request: QueryRequest::Exact { code, check_digit },
                },
                FacetQuery {
                    facet: Facet::AtmNumber,
                    token: atm_token,
                    request: QueryRequest::Range {
                        field: RecordField::AtmNumber,
                        upper: format!("{digits}{RANGE_SENTINEL}"),
                        lower: digits,
                        cap: self.config.identifier_scan_cap,
                    },
                },
            ];
        }

        let mut queries = Vec::with_capacity(STRATEGIES.len());
        for strategy in &STRATEGIES {
            let needle = normalize(raw, strategy.fold);
            if strategy.facet == Facet::DescriptionToken {
                self.token_needle = needle.clone();
            }
            let token = self.guard.issue(strategy.facet.channel());
            let cap = strategy.scan_cap(&self.config);
            let request = match strategy.shape {
                QueryShape::Prefix { field } => QueryRequest::Range {
                    field,
                    upper: format!("{needle}{RANGE_SENTINEL}"),
                    lower: needle,
                    cap,
                },
                QueryShape::Membership => QueryRequest::Tokens { needle, cap },
            };
            queries.push(FacetQuery {
                facet: strategy.facet,
                token,
                request,
            });
        }
        queries
    }

    /// Apply a settled response, unless a newer request on the same facet has
    /// superseded it. Returns whether the response was applied.
    pub fn apply(&mut self, response: FacetResponse) -> bool {
        if !self.guard.is_current(response.facet.channel(), response.token) {
            debug!(facet = ?response.facet, token = response.token, "discarding stale response");
            return false;
        }
        let bucket = match response.facet {
            Facet::DescriptionToken => self.token_bucket(&response.records),
            facet => self.record_bucket(facet, response.records),
        };
        self.buckets.insert(response.facet, bucket);
        self.emit_state();
        true
    }

    /// Convenience driver: plan, execute against `store` and apply, tolerating
    /// per-facet failures.
    pub fn search(&mut self, store: &dyn RecordStore, raw: &str) -> &BTreeMap<Facet, Vec<Suggestion>> {
        let queries = self.plan(raw);
        for query in queries {
            let records = execute(store, &query.request).unwrap_or_else(|err| {
                warn!(facet = ?query.facet, error = %err, "facet query failed");
                Vec::new()
            });
            self.apply(FacetResponse {
                facet: query.facet,
                token: query.token,
                records,
            });
        }
        &self.buckets
    }

    /// Current buckets, keyed by facet. Facets with no settled results are
    /// absent.
    #[must_use]
    pub fn buckets(&self) -> &BTreeMap<Facet, Vec<Suggestion>> {
        &self.buckets
    }

    #[must_use]
    pub fn bucket(&self, facet: Facet) -> &[Suggestion] {
        self.buckets.get(&facet).map_or(&[], Vec::as_slice)
    }

    /// The current multi-select state.
    #[must_use]
    pub fn selection(&self) -> &SelectionChipState {
        &self.chips
    }

    /// Add a term to the selection, honouring single-facet exclusivity.
    pub fn select(&mut self, term: SelectedTerm) {
        self.chips.add(term);
        self.emit_validity();
        self.emit_state();
    }

    /// Remove one chip by its term text.
    pub fn remove_term(&mut self, term: &str) {
        self.chips.remove(term);
        self.emit_validity();
        self.emit_state();
    }

    pub fn clear_selection(&mut self) {
        self.chips.clear();
        self.emit_validity();
        self.emit_state();
    }

    /// Mirrored query parameters for the current selection; `None` asks the
    /// caller to clear both parameters.
    #[must_use]
    pub fn query_params(&self) -> Option<(String, String)> {
        url::encode(&self.chips)
    }

    /// Rebuild the selection from mirrored parameters, as on mount from a
    /// shared URL.
    pub fn hydrate_params(&mut self, terms: &str, facet_slug: &str) {
        self.chips = url::decode(terms, facet_slug);
        self.emit_validity();
        self.emit_state();
    }

    fn record_bucket(&self, facet: Facet, records: Vec<SearchableRecord>) -> Vec<Suggestion> {
        let mut seen = HashSet::new();
        let mut bucket = Vec::new();
        for record in records {
            let term = match facet {
                Facet::Code => record.composite_key(),
                Facet::AtmNumber => record.atm_number.clone(),
                Facet::MaterialName => record.material_name.clone(),
                Facet::LocationName => record.location_name.clone(),
                Facet::ResponsibleName => record.responsible_name.clone(),
                Facet::DescriptionToken => unreachable!("token buckets built separately"),
            };
            if term.is_empty() || !seen.insert(term.clone()) {
                continue;
            }
            bucket.push(Suggestion {
                term,
                facet,
                record: Some(record),
            });
            if bucket.len() == self.config.bucket_cap {
                break;
            }
        }
        bucket
    }

    /// Word-level faceting: the de-dup key is the token itself, not the
    /// document it came from.
    fn token_bucket(&self, records: &[SearchableRecord]) -> Vec<Suggestion> {
        let needle = &self.token_needle;
        let mut seen = HashSet::new();
        let mut bucket = Vec::new();
        for record in records {
            for raw in &record.description_tokens {
                for word in raw.to_lowercase().split_whitespace() {
                    if word.chars().count() < self.config.min_token_len {
                        continue;
                    }
                    if !needle.is_empty() && !word.contains(needle.as_str()) {
                        continue;
                    }
                    if !seen.insert(word.to_string()) {
                        continue;
                    }
                    bucket.push(Suggestion {
                        term: word.to_string(),
                        facet: Facet::DescriptionToken,
                        record: None,
                    });
                    if bucket.len() == self.config.token_bucket_cap {
                        return bucket;
                    }
                }
            }
        }
        bucket
    }

    fn reset_buckets(&mut self) {
        for facet in Facet::ALL {
            self.guard.invalidate(facet.channel());
        }
        self.buckets.clear();
        self.emit_state();
    }

    fn emit_validity(&mut self) {
        let validity = self.chips.is_valid();
        if validity != self.last_validity {
            self.last_validity = validity;
            if let Some(listener) = self.on_validity_change.as_mut() {
                listener(validity);
            }
        }
    }

    fn emit_state(&mut self) {
        if self.on_state_change.is_none() {
            return;
        }
        let snapshot = EngineSnapshot {
            selection: self.chips.terms().to_vec(),
            buckets: self.buckets.clone(),
            mirror: url::encode(&self.chips),
        };
        if let Some(listener) = self.on_state_change.as_mut() {
            listener(&snapshot);
        }
    }
}

fn execute(
    store: &dyn RecordStore,
    request: &QueryRequest,
) -> Result<Vec<SearchableRecord>, crate::backend::BackendError> {
    match request {
        QueryRequest::Exact { code, check_digit } => store.find_exact(code, check_digit),
        QueryRequest::Range {
            field,
            lower,
            upper,
            cap,
        } => store.scan_range(*field, lower, upper, *cap),
        QueryRequest::Tokens { needle, cap } => store.scan_description_containing(needle, *cap),
    }
}
