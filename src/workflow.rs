//! Demo workflow: wire the fixture-backed collaborators to the engine and
//! resolver through their background workers.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::Result;
use serde::Serialize;

use patrifind::backend::{MemoryDirectory, MemoryStore, load_fixture};
use patrifind::hierarchy::{self, DirectoryCommand, HierarchyResolver};
use patrifind::search::{FacetSearchEngine, SearchCommand, spawn as spawn_search};
use patrifind::types::{Facet, HierarchyNode, Level, ResolverSelection};
use patrifind::Suggestion;

use crate::settings::ResolvedConfig;

/// Serializable result of one demo invocation.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowOutcome {
    Search {
        buckets: BTreeMap<Facet, Vec<Suggestion>>,
    },
    Listing {
        level: Level,
        nodes: Vec<HierarchyNode>,
    },
}

/// Owns the fixture-backed collaborators for the duration of one invocation.
pub struct SearchWorkflow {
    store: Arc<MemoryStore>,
    directory: Arc<MemoryDirectory>,
    config: ResolvedConfig,
}

impl SearchWorkflow {
    pub fn from_config(config: ResolvedConfig) -> Result<Self> {
        let (store, directory) = load_fixture(&config.fixture)?;
        Ok(Self {
            store: Arc::new(store),
            directory: Arc::new(directory),
            config,
        })
    }

    /// Run one faceted search through the background worker.
    pub fn run_search(&self, query: &str) -> Result<WorkflowOutcome> {
        let mut engine = FacetSearchEngine::new(self.config.engine.clone());
        let store: Arc<dyn patrifind::RecordStore> = self.store.clone();
        let (tx, rx) = spawn_search(store, engine.guard());

        let queries = engine.plan(query);
        let expected = queries.len();
        for planned in queries {
            tx.send(SearchCommand::Query(planned))?;
        }
        for _ in 0..expected {
            engine.apply(rx.recv()?);
        }
        tx.send(SearchCommand::Shutdown)?;

        Ok(WorkflowOutcome::Search {
            buckets: engine.buckets().clone(),
        })
    }

    /// List hierarchy nodes at `level` through the resolver and its worker.
    pub fn run_listing(
        &self,
        level: Level,
        parent: Option<String>,
        filter: Option<String>,
    ) -> Result<WorkflowOutcome> {
        let mut resolver = HierarchyResolver::new(self.config.debounce);
        let directory: Arc<dyn patrifind::HierarchyDirectory> = self.directory.clone();
        let (tx, rx) = hierarchy::spawn(directory, resolver.guard());

        // Seed the parent selection so the picker scopes to it.
        if let (Some(parent_level), Some(parent_id)) = (level.parent(), parent) {
            let mut selection = ResolverSelection::default();
            match parent_level {
                Level::Unit => selection.unit_id = Some(parent_id),
                Level::Agency => selection.agency_id = Some(parent_id),
                Level::Sector => selection.sector_id = Some(parent_id),
                Level::Location => selection.location_id = Some(parent_id),
            }
            resolver.hydrate(selection);
        }
        if let Some(filter) = filter.as_deref() {
            resolver.set_filter(level, filter, Instant::now());
            // One-shot run; wait out the debounce window.
            if let Some(deadline) = resolver.next_poll() {
                thread::sleep(deadline.saturating_duration_since(Instant::now()));
            }
            for fetch in resolver.poll(Instant::now()) {
                tx.send(DirectoryCommand::Fetch(fetch))?;
                resolver.apply(rx.recv()?);
            }
        } else {
            for fetch in resolver.open_picker(level) {
                tx.send(DirectoryCommand::Fetch(fetch))?;
                resolver.apply(rx.recv()?);
            }
        }
        tx.send(DirectoryCommand::Shutdown)?;

        Ok(WorkflowOutcome::Listing {
            level,
            nodes: resolver.options(level).to_vec(),
        })
    }
}
