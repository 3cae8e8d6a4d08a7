//! Background worker that executes planned facet queries.
//!
//! The engine stays on the caller's thread; the worker carries queries to the
//! record store and sends settled responses back. The caller pumps the
//! receiver and feeds responses through the engine's `apply`, which performs
//! the final staleness check.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::warn;

use super::engine::{FacetQuery, FacetResponse, QueryRequest};
use crate::backend::RecordStore;
use crate::guard::RequestGuard;

/// Commands understood by the search worker.
#[derive(Debug)]
pub enum SearchCommand {
    /// Execute one planned facet query.
    Query(FacetQuery),
    /// Stop the worker thread.
    Shutdown,
}

/// Launches the search worker thread and returns its command/response
/// channels. `guard` must be the engine's own guard so the worker can skip
/// queries that are already stale at dequeue time.
pub fn spawn(
    store: Arc<dyn RecordStore>,
    guard: Arc<RequestGuard>,
) -> (Sender<SearchCommand>, Receiver<FacetResponse>) {
    let (command_tx, command_rx) = mpsc::channel();
    let (response_tx, response_rx) = mpsc::channel();

    thread::spawn(move || worker_loop(store.as_ref(), &command_rx, &response_tx, &guard));

    (command_tx, response_rx)
}

fn worker_loop(
    store: &dyn RecordStore,
    command_rx: &Receiver<SearchCommand>,
    response_tx: &Sender<FacetResponse>,
    guard: &RequestGuard,
) {
    while let Ok(command) = command_rx.recv() {
        match command {
            SearchCommand::Query(query) => {
                if !handle_query(store, response_tx, guard, query) {
                    break;
                }
            }
            SearchCommand::Shutdown => break,
        }
    }
}

fn handle_query(
    store: &dyn RecordStore,
    response_tx: &Sender<FacetResponse>,
    guard: &RequestGuard,
    query: FacetQuery,
) -> bool {
    // Superseded before we even started; skip the backend round trip.
    if !guard.is_current(query.facet.channel(), query.token) {
        return true;
    }

    let records = match &query.request {
        QueryRequest::Exact { code, check_digit } => store.find_exact(code, check_digit),
        QueryRequest::Range {
            field,
            lower,
            upper,
            cap,
        } => store.scan_range(*field, lower, upper, *cap),
        QueryRequest::Tokens { needle, cap } => store.scan_description_containing(needle, *cap),
    }
    .unwrap_or_else(|err| {
        warn!(facet = ?query.facet, error = %err, "facet query failed");
        Vec::new()
    });

    response_tx
        .send(FacetResponse {
            facet: query.facet,
            token: query.token,
            records,
        })
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use crate::search::{EngineConfig, FacetSearchEngine};
    use crate::types::{Facet, SearchableRecord};

    fn sample_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new(vec![SearchableRecord {
            asset_code: "12345".into(),
            check_digit: "7".into(),
            atm_number: "990011".into(),
            material_name: "MESA GIRATORIA".into(),
            location_name: "SALA 101".into(),
            description_tokens: vec!["mesa".into()],
            responsible_name: "ANA LIMA".into(),
        }]))
    }

    #[test]
    fn worker_round_trips_planned_queries() {
        let mut engine = FacetSearchEngine::new(EngineConfig::default());
        let (tx, rx) = spawn(sample_store(), engine.guard());

        let queries = engine.plan("12345-7");
        let expected = queries.len();
        for query in queries {
            tx.send(SearchCommand::Query(query)).unwrap();
        }
        for _ in 0..expected {
            let response = rx.recv().unwrap();
            engine.apply(response);
        }
        assert_eq!(engine.bucket(Facet::Code).len(), 1);
        tx.send(SearchCommand::Shutdown).unwrap();
    }

    #[test]
    fn stale_query_is_skipped_at_dequeue() {
        let engine = FacetSearchEngine::new(EngineConfig::default());
        let guard = engine.guard();
        let (tx, rx) = spawn(sample_store(), Arc::clone(&guard));

        let stale_token = guard.issue(Facet::Code.channel());
        guard.invalidate(Facet::Code.channel());
        tx.send(SearchCommand::Query(FacetQuery {
            facet: Facet::Code,
            token: stale_token,
            request: QueryRequest::Exact {
                code: "12345".into(),
                check_digit: "7".into(),
            },
        }))
        .unwrap();
        tx.send(SearchCommand::Shutdown).unwrap();
        assert!(rx.recv().is_err(), "stale query must produce no response");
    }
}
