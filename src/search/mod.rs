//! Faceted search: strategy table, engine, query-string mirror and the
//! background worker that executes planned queries.

mod engine;
mod strategy;
pub mod url;
mod worker;

pub use engine::{
    EngineSnapshot, FacetQuery, FacetResponse, FacetSearchEngine, QueryRequest, Suggestion,
};
pub use strategy::{EngineConfig, FacetStrategy, QueryShape, RANGE_SENTINEL, STRATEGIES};
pub use worker::{SearchCommand, spawn};
