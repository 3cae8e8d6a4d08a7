//! Background worker that executes hierarchy option fetches.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::warn;

use super::resolver::{LevelFetch, LevelResponse};
use crate::backend::HierarchyDirectory;
use crate::guard::RequestGuard;

/// Commands understood by the directory worker.
#[derive(Debug)]
pub enum DirectoryCommand {
    /// Execute one option-list fetch.
    Fetch(LevelFetch),
    /// Stop the worker thread.
    Shutdown,
}

/// Launches the directory worker thread and returns its command/response
/// channels. `guard` must be the resolver's own guard so fetches that are
/// already stale at dequeue time are skipped.
pub fn spawn(
    directory: Arc<dyn HierarchyDirectory>,
    guard: Arc<RequestGuard>,
) -> (Sender<DirectoryCommand>, Receiver<LevelResponse>) {
    let (command_tx, command_rx) = mpsc::channel();
    let (response_tx, response_rx) = mpsc::channel();

    thread::spawn(move || worker_loop(directory.as_ref(), &command_rx, &response_tx, &guard));

    (command_tx, response_rx)
}

fn worker_loop(
    directory: &dyn HierarchyDirectory,
    command_rx: &Receiver<DirectoryCommand>,
    response_tx: &Sender<LevelResponse>,
    guard: &RequestGuard,
) {
    while let Ok(command) = command_rx.recv() {
        match command {
            DirectoryCommand::Fetch(fetch) => {
                if !handle_fetch(directory, response_tx, guard, fetch) {
                    break;
                }
            }
            DirectoryCommand::Shutdown => break,
        }
    }
}

fn handle_fetch(
    directory: &dyn HierarchyDirectory,
    response_tx: &Sender<LevelResponse>,
    guard: &RequestGuard,
    fetch: LevelFetch,
) -> bool {
    if !guard.is_current(fetch.level.channel(), fetch.token) {
        return true;
    }

    let nodes = directory
        .list(fetch.level, fetch.parent_id.as_deref(), fetch.filter.as_deref())
        .unwrap_or_else(|err| {
            warn!(level = ?fetch.level, error = %err, "option fetch failed");
            Vec::new()
        });

    response_tx
        .send(LevelResponse {
            level: fetch.level,
            token: fetch.token,
            nodes,
        })
        .is_ok()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::backend::MemoryDirectory;
    use crate::hierarchy::HierarchyResolver;
    use crate::types::{Agency, HierarchyNode, Level, Unit};

    fn sample_directory() -> Arc<MemoryDirectory> {
        Arc::new(MemoryDirectory::new(
            vec![Unit {
                id: "u1".into(),
                name: "REITORIA".into(),
                code: "01".into(),
                siaf_code: "1001".into(),
            }],
            vec![Agency {
                id: "a1".into(),
                name: "ALMOXARIFADO".into(),
                code: "01.1".into(),
                parent_unit_id: "u1".into(),
            }],
            Vec::new(),
            Vec::new(),
        ))
    }

    #[test]
    fn worker_round_trips_a_select_cascade() {
        let mut resolver = HierarchyResolver::new(Duration::from_millis(300));
        let (tx, rx) = spawn(sample_directory(), resolver.guard());

        let unit_fetch = resolver.set_panel_open(true).remove(0);
        tx.send(DirectoryCommand::Fetch(unit_fetch)).unwrap();
        resolver.apply(rx.recv().unwrap());
        assert_eq!(resolver.options(Level::Unit).len(), 1);

        let selected = resolver.options(Level::Unit)[0].clone();
        let agency_fetch = resolver.select(selected).remove(0);
        tx.send(DirectoryCommand::Fetch(agency_fetch)).unwrap();
        resolver.apply(rx.recv().unwrap());

        let ids: Vec<&str> = resolver
            .options(Level::Agency)
            .iter()
            .map(HierarchyNode::id)
            .collect();
        assert_eq!(ids, vec!["a1"]);
        tx.send(DirectoryCommand::Shutdown).unwrap();
    }

    #[test]
    fn failed_fetch_degrades_to_empty_options() {
        let mut resolver = HierarchyResolver::new(Duration::from_millis(300));
        let (tx, rx) = spawn(
            Arc::new(MemoryDirectory::default()),
            resolver.guard(),
        );

        resolver.select(HierarchyNode::Unit(Unit {
            id: "u1".into(),
            name: "REITORIA".into(),
            code: "01".into(),
            siaf_code: "1001".into(),
        }));
        // Force a directory error by asking for agencies without a parent.
        let fetch = LevelFetch {
            level: Level::Agency,
            token: resolver.guard().issue(Level::Agency.channel()),
            parent_id: None,
            filter: None,
        };
        tx.send(DirectoryCommand::Fetch(fetch)).unwrap();
        let response = rx.recv().unwrap();
        assert!(response.nodes.is_empty());
        assert!(resolver.apply(response));
        assert!(resolver.options(Level::Agency).is_empty());
        tx.send(DirectoryCommand::Shutdown).unwrap();
    }
}
