//! Cascading resolution of the Unit → Agency → Sector → Location hierarchy.
//!
//! Each level's option list is scoped to the parent's current selection.
//! Changing a parent clears every descendant and orphans their in-flight
//! fetches *before* the replacement fetch is dispatched, so a slow response
//! for the old parent can never populate options under the new one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::debounce::Debouncer;
use crate::guard::RequestGuard;
use crate::types::{HierarchyNode, Level, ResolverSelection};

/// One pending option-list fetch the caller must carry to the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelFetch {
    pub level: Level,
    pub token: u64,
    /// Parent scope; `None` only for [`Level::Unit`].
    pub parent_id: Option<String>,
    /// Free-text narrowing, `None` when the level's filter box is empty.
    pub filter: Option<String>,
}

/// A settled directory response. Failed fetches arrive with an empty list.
#[derive(Debug, Clone)]
pub struct LevelResponse {
    pub level: Level,
    pub token: u64,
    pub nodes: Vec<HierarchyNode>,
}

/// Serializable resolver state handed to the state-change listener.
#[derive(Debug, Clone, Serialize)]
pub struct ResolverSnapshot {
    pub validity: bool,
    pub panel_open: bool,
    pub selection: ResolverSelection,
}

#[derive(Debug, Default)]
struct LevelState {
    options: Vec<HierarchyNode>,
    filter: String,
    picker_open: bool,
}

type ValidityListener = Box<dyn FnMut(bool)>;
type StateListener = Box<dyn FnMut(&ResolverSnapshot)>;

/// Owns per-level selection and option state for the four-level hierarchy.
///
/// All inputs arrive through explicit calls and all outputs leave through the
/// injected listeners; the resolver holds no ambient state.
pub struct HierarchyResolver {
    guard: Arc<RequestGuard>,
    levels: [LevelState; 4],
    selection: ResolverSelection,
    panel_open: bool,
    hydrated_identity: Option<String>,
    debounce: Debouncer<Level>,
    last_validity: bool,
    on_validity_change: Option<ValidityListener>,
    on_state_change: Option<StateListener>,
}

impl HierarchyResolver {
    #[must_use]
    pub fn new(debounce_delay: Duration) -> Self {
        Self {
            guard: Arc::new(RequestGuard::new(Level::ALL.len())),
            levels: Default::default(),
            selection: ResolverSelection::default(),
            panel_open: false,
            hydrated_identity: None,
            debounce: Debouncer::new(debounce_delay),
            // A closed panel does not require a value.
            last_validity: true,
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
    /// change.
    #[must_use]
    pub fn with_state_listener(
        mut self,
        listener: impl FnMut(&ResolverSnapshot) + 'static,
    ) -> Self {
        self.on_state_change = Some(Box::new(listener));
        self
    }

    /// The guard shared with whatever executes the fetches.
    #[must_use]
    pub fn guard(&self) -> Arc<RequestGuard> {
        Arc::clone(&self.guard)
    }

    /// `true` when the panel is closed or every level carries a selection.
    #[must_use]
    pub fn validity(&self) -> bool {
        !self.panel_open || self.selection.is_complete()
    }

    #[must_use]
    pub fn selection(&self) -> &ResolverSelection {
        &self.selection
    }

    #[must_use]
    pub fn options(&self, level: Level) -> &[HierarchyNode] {
        &self.levels[level.channel()].options
    }

    #[must_use]
    pub fn filter(&self, level: Level) -> &str {
        &self.levels[level.channel()].filter
    }

    #[must_use]
    pub fn is_picker_open(&self, level: Level) -> bool {
        self.levels[level.channel()].picker_open
    }

    /// Open or close the surrounding panel. Opening fetches the unit list if
    /// it has not been loaded yet.
    pub fn set_panel_open(&mut self, open: bool) -> Vec<LevelFetch> {
        if self.panel_open == open {
            return Vec::new();
        }
        self.panel_open = open;
        let fetches = if open && self.levels[Level::Unit.channel()].options.is_empty() {
            vec![self.fetch_for(Level::Unit)]
        } else {
            Vec::new()
        };
        self.emit();
        fetches
    }

    /// Open a level's picker, refreshing its option list scoped to the
    /// current parent. A child picker without a selected parent stays shut.
    pub fn open_picker(&mut self, level: Level) -> Vec<LevelFetch> {
        if !self.parent_satisfied(level) {
            return Vec::new();
        }
        self.levels[level.channel()].picker_open = true;
        vec![self.fetch_for(level)]
    }

    pub fn close_picker(&mut self, level: Level) {
        self.levels[level.channel()].picker_open = false;
    }

    /// Select a node, cascading a reset over every descendant level.
    ///
    /// The reset happens in a fixed order: descendants are cleared and their
    /// in-flight fetches orphaned first, then the child fetch for the new
    /// parent is dispatched.
    pub fn select(&mut self, node: HierarchyNode) -> Vec<LevelFetch> {
        let level = node.level();
        if self.selection.id_at(level) == Some(node.id()) {
            return Vec::new();
        }

        for descendant in level.descendants() {
            let state = &mut self.levels[descendant.channel()];
            state.options.clear();
            state.picker_open = false;
            self.selection.clear_level(*descendant);
            self.debounce.cancel(descendant);
            self.guard.invalidate(descendant.channel());
        }

        self.selection.set_node(node);
        self.levels[level.channel()].picker_open = false;

        let fetches = match level.child() {
            Some(child) => vec![self.fetch_for(child)],
            None => Vec::new(),
        };
        self.emit();
        fetches
    }

    /// Record a filter keystroke for `level`. The fetch is released by
    /// [`HierarchyResolver::poll`] once the keystrokes settle.
    pub fn set_filter(&mut self, level: Level, text: impl Into<String>, now: Instant) {
        let text = text.into();
        self.levels[level.channel()].filter = text.clone();
        self.debounce.submit(level, text, now);
    }

    /// Release any settled filter fetches. A filter keystroke is treated
    /// identically to a parent change for staleness purposes.
    pub fn poll(&mut self, now: Instant) -> Vec<LevelFetch> {
        let settled = self.debounce.ready(now);
        settled
            .into_iter()
            .filter(|(level, _)| self.parent_satisfied(*level))
            .map(|(level, _)| self.fetch_for(level))
            .collect()
    }

    /// Earliest instant at which [`HierarchyResolver::poll`] could release a
    /// fetch.
    #[must_use]
    pub fn next_poll(&self) -> Option<Instant> {
        self.debounce.next_deadline()
    }

    /// Apply a settled option list, unless a newer fetch on the same level
    /// has superseded it. Returns whether the response was applied.
    pub fn apply(&mut self, response: LevelResponse) -> bool {
        if !self.guard.is_current(response.level.channel(), response.token) {
            debug!(level = ?response.level, token = response.token, "discarding stale options");
            return false;
        }
        // A malformed response may carry nodes of the wrong level; drop
        // those rather than mixing lists.
        let level = response.level;
        self.levels[level.channel()].options = response
            .nodes
            .into_iter()
            .filter(|node| node.level() == level)
            .collect();
        self.emit();
        true
    }

    /// Apply a persisted selection without triggering the cascade reset.
    ///
    /// Applied at most once per distinct selection identity, so re-supplying
    /// the same persisted value is a no-op. Returns whether it was applied.
    pub fn hydrate(&mut self, persisted: ResolverSelection) -> bool {
        let identity = persisted.identity();
        if self.hydrated_identity.as_deref() == Some(identity.as_str()) {
            return false;
        }
        self.hydrated_identity = Some(identity);
        self.selection = persisted;
        self.emit();
        true
    }

    fn parent_satisfied(&self, level: Level) -> bool {
        match level.parent() {
            None => true,
            Some(parent) => self.selection.id_at(parent).is_some(),
        }
    }

    fn fetch_for(&self, level: Level) -> LevelFetch {
        let parent_id = level
            .parent()
            .and_then(|parent| self.selection.id_at(parent))
            .map(ToString::to_string);
        let filter = {
            let text = self.levels[level.channel()].filter.trim();
            if text.is_empty() {
                None
            } else {
                Some(text.to_string())
            }
        };
        LevelFetch {
            level,
            token: self.guard.issue(level.channel()),
            parent_id,
            filter,
        }
    }

    fn emit(&mut self) {
        let validity = self.validity();
        if validity != self.last_validity {
            self.last_validity = validity;
            if let Some(listener) = self.on_validity_change.as_mut() {
                listener(validity);
            }
        }
        if self.on_state_change.is_none() {
            return;
        }
        let snapshot = ResolverSnapshot {
            validity,
            panel_open: self.panel_open,
            selection: self.selection.clone(),
        };
        if let Some(listener) = self.on_state_change.as_mut() {
            listener(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Agency, Location, Sector, Unit};

    fn unit(id: &str) -> HierarchyNode {
        HierarchyNode::Unit(Unit {
            id: id.into(),
            name: format!("UNIT {id}"),
            code: id.into(),
            siaf_code: format!("9{id}"),
        })
    }

    fn agency(id: &str, parent: &str) -> HierarchyNode {
        HierarchyNode::Agency(Agency {
            id: id.into(),
            name: format!("AGENCY {id}"),
            code: id.into(),
            parent_unit_id: parent.into(),
        })
    }

    fn sector(id: &str, parent: &str) -> HierarchyNode {
        HierarchyNode::Sector(Sector {
            id: id.into(),
            name: format!("SECTOR {id}"),
            code: id.into(),
            parent_agency_id: parent.into(),
        })
    }

    fn location(id: &str, parent: &str) -> HierarchyNode {
        HierarchyNode::Location(Location {
            id: id.into(),
            name: format!("LOCATION {id}"),
            code: id.into(),
            parent_sector_id: parent.into(),
        })
    }

    fn resolver() -> HierarchyResolver {
        HierarchyResolver::new(Duration::from_millis(300))
    }

    fn populated_resolver() -> HierarchyResolver {
        let mut resolver = resolver();
        resolver.set_panel_open(true);
        resolver.select(unit("u1"));
        resolver.select(agency("a1", "u1"));
        resolver.select(sector("s1", "a1"));
        resolver.select(location("l1", "s1"));
        resolver
    }

    #[test]
    fn selecting_a_unit_dispatches_agency_fetch() {
        let mut resolver = resolver();
        let fetches = resolver.select(unit("u1"));
        assert_eq!(fetches.len(), 1);
        assert_eq!(fetches[0].level, Level::Agency);
        assert_eq!(fetches[0].parent_id.as_deref(), Some("u1"));
    }

    #[test]
    fn reselecting_the_same_node_is_a_no_op() {
        let mut resolver = resolver();
        resolver.select(unit("u1"));
        assert!(resolver.select(unit("u1")).is_empty());
    }

    #[test]
    fn cascade_reset_clears_descendants_before_fetch() {
        let mut resolver = populated_resolver();
        assert!(resolver.selection().is_complete());

        let agency_token_before = resolver.guard().current(Level::Agency.channel());
        let fetches = resolver.select(unit("u2"));

        // Descendant selections and option lists are gone.
        assert_eq!(resolver.selection().agency_id, None);
        assert_eq!(resolver.selection().sector_id, None);
        assert_eq!(resolver.selection().location_id, None);
        assert!(resolver.options(Level::Agency).is_empty());
        assert!(resolver.options(Level::Sector).is_empty());
        assert!(resolver.options(Level::Location).is_empty());

        // The unit survives, replaced.
        assert_eq!(resolver.selection().unit_id.as_deref(), Some("u2"));

        // Exactly one fresh fetch, scoped to the new parent, on a token
        // newer than anything issued for the old parent.
        assert_eq!(fetches.len(), 1);
        assert_eq!(fetches[0].level, Level::Agency);
        assert_eq!(fetches[0].parent_id.as_deref(), Some("u2"));
        assert!(fetches[0].token > agency_token_before);
    }

    #[test]
    fn stale_options_for_old_parent_are_rejected() {
        let mut resolver = resolver();
        let fetch_a = resolver.select(unit("u1")).remove(0);
        let fetch_b = resolver.select(unit("u2")).remove(0);

        // B completes first.
        assert!(resolver.apply(LevelResponse {
            level: Level::Agency,
            token: fetch_b.token,
            nodes: vec![agency("a2", "u2")],
        }));
        // A resolves later with higher latency; it must be discarded.
        assert!(!resolver.apply(LevelResponse {
            level: Level::Agency,
            token: fetch_a.token,
            nodes: vec![agency("a1", "u1")],
        }));

        let ids: Vec<&str> = resolver
            .options(Level::Agency)
            .iter()
            .map(HierarchyNode::id)
            .collect();
        assert_eq!(ids, vec!["a2"]);
    }

    #[test]
    fn filter_keystrokes_debounce_then_fetch() {
        let mut resolver = resolver();
        resolver.select(unit("u1"));
        let start = Instant::now();
        resolver.set_filter(Level::Agency, "al", start);
        resolver.set_filter(Level::Agency, "alm", start + Duration::from_millis(100));

        assert!(resolver.poll(start + Duration::from_millis(150)).is_empty());
        let fetches = resolver.poll(start + Duration::from_millis(450));
        assert_eq!(fetches.len(), 1);
        assert_eq!(fetches[0].level, Level::Agency);
        assert_eq!(fetches[0].parent_id.as_deref(), Some("u1"));
        assert_eq!(fetches[0].filter.as_deref(), Some("alm"));
    }

    #[test]
    fn filter_fetch_supersedes_earlier_options() {
        let mut resolver = resolver();
        let initial = resolver.select(unit("u1")).remove(0);
        let start = Instant::now();
        resolver.set_filter(Level::Agency, "alm", start);
        let filtered = resolver.poll(start + Duration::from_millis(301)).remove(0);

        // The unfiltered fetch lost the race.
        assert!(!resolver.apply(LevelResponse {
            level: Level::Agency,
            token: initial.token,
            nodes: vec![agency("a1", "u1"), agency("a9", "u1")],
        }));
        assert!(resolver.apply(LevelResponse {
            level: Level::Agency,
            token: filtered.token,
            nodes: vec![agency("a1", "u1")],
        }));
        assert_eq!(resolver.options(Level::Agency).len(), 1);
    }

    #[test]
    fn filter_for_orphan_level_is_withheld() {
        let mut resolver = resolver();
        let start = Instant::now();
        resolver.set_filter(Level::Sector, "pat", start);
        assert!(resolver.poll(start + Duration::from_millis(400)).is_empty());
    }

    #[test]
    fn parent_change_cancels_pending_descendant_filter() {
        let mut resolver = resolver();
        resolver.select(unit("u1"));
        resolver.select(agency("a1", "u1"));
        let start = Instant::now();
        resolver.set_filter(Level::Sector, "pat", start);
        resolver.select(unit("u2"));
        let fetches = resolver.poll(start + Duration::from_millis(400));
        assert!(
            fetches.iter().all(|fetch| fetch.level != Level::Sector),
            "sector filter fetch must not survive the cascade"
        );
    }

    #[test]
    fn hydration_sets_all_levels_without_reset() {
        let mut resolver = resolver();
        let persisted = {
            let mut selection = ResolverSelection::default();
            selection.set_node(unit("u1"));
            selection.set_node(agency("a1", "u1"));
            selection.set_node(sector("s1", "a1"));
            selection.set_node(location("l1", "s1"));
            selection
        };

        assert!(resolver.hydrate(persisted.clone()));
        assert!(resolver.selection().is_complete());
        assert_eq!(resolver.selection().unit_id.as_deref(), Some("u1"));
        assert_eq!(resolver.selection().location_id.as_deref(), Some("l1"));

        // Re-supplying the identical persisted value must not re-apply.
        assert!(!resolver.hydrate(persisted));
    }

    #[test]
    fn hydration_of_a_different_identity_applies_again() {
        let mut resolver = resolver();
        let mut first = ResolverSelection::default();
        first.set_node(unit("u1"));
        let mut second = ResolverSelection::default();
        second.set_node(unit("u2"));
        assert!(resolver.hydrate(first));
        assert!(resolver.hydrate(second));
        assert_eq!(resolver.selection().unit_id.as_deref(), Some("u2"));
    }

    #[test]
    fn validity_follows_panel_and_completeness() {
        let mut resolver = resolver();
        assert!(resolver.validity(), "closed panel does not require a value");
        resolver.set_panel_open(true);
        assert!(!resolver.validity());
        resolver.select(unit("u1"));
        resolver.select(agency("a1", "u1"));
        resolver.select(sector("s1", "a1"));
        assert!(!resolver.validity());
        resolver.select(location("l1", "s1"));
        assert!(resolver.validity());
    }

    #[test]
    fn validity_listener_fires_on_transitions_only() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let transitions: Rc<RefCell<Vec<bool>>> = Rc::default();
        let sink = Rc::clone(&transitions);
        let mut resolver = HierarchyResolver::new(Duration::from_millis(300))
            .with_validity_listener(move |valid| sink.borrow_mut().push(valid));
        resolver.set_panel_open(true);
        resolver.select(unit("u1"));
        resolver.select(agency("a1", "u1"));
        resolver.select(sector("s1", "a1"));
        resolver.select(location("l1", "s1"));
        assert_eq!(*transitions.borrow(), vec![false, true]);
    }

    #[test]
    fn opening_panel_fetches_units_once() {
        let mut resolver = resolver();
        let fetches = resolver.set_panel_open(true);
        assert_eq!(fetches.len(), 1);
        assert_eq!(fetches[0].level, Level::Unit);
        assert_eq!(fetches[0].parent_id, None);

        resolver.apply(LevelResponse {
            level: Level::Unit,
            token: fetches[0].token,
            nodes: vec![unit("u1")],
        });
        resolver.set_panel_open(false);
        assert!(resolver.set_panel_open(true).is_empty());
    }

    #[test]
    fn wrong_level_nodes_are_dropped_defensively() {
        let mut resolver = resolver();
        let fetch = resolver.set_panel_open(true).remove(0);
        resolver.apply(LevelResponse {
            level: Level::Unit,
            token: fetch.token,
            nodes: vec![unit("u1"), agency("a1", "u1")],
        });
        assert_eq!(resolver.options(Level::Unit).len(), 1);
    }
}
