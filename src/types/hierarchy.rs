use serde::{Deserialize, Serialize};

/// The four levels of the organizational hierarchy, parent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Unit,
    Agency,
    Sector,
    Location,
}

impl Level {
    /// Every level, ancestors before descendants.
    pub const ALL: [Level; 4] = [Level::Unit, Level::Agency, Level::Sector, Level::Location];

    /// The level directly below this one, if any.
    #[must_use]
    pub fn child(self) -> Option<Level> {
        match self {
            Level::Unit => Some(Level::Agency),
            Level::Agency => Some(Level::Sector),
            Level::Sector => Some(Level::Location),
            Level::Location => None,
        }
    }

    /// The level directly above this one, if any.
    #[must_use]
    pub fn parent(self) -> Option<Level> {
        match self {
            Level::Unit => None,
            Level::Agency => Some(Level::Unit),
            Level::Sector => Some(Level::Agency),
            Level::Location => Some(Level::Sector),
        }
    }

    /// Levels strictly below this one, nearest first.
    #[must_use]
    pub fn descendants(self) -> &'static [Level] {
        match self {
            Level::Unit => &[Level::Agency, Level::Sector, Level::Location],
            Level::Agency => &[Level::Sector, Level::Location],
            Level::Sector => &[Level::Location],
            Level::Location => &[],
        }
    }

    /// Index of the request-guard channel carrying this level's option fetches.
    #[must_use]
    pub(crate) fn channel(self) -> usize {
        match self {
            Level::Unit => 0,
            Level::Agency => 1,
            Level::Sector => 2,
            Level::Location => 3,
        }
    }
}

/// Top-level organizational unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub name: String,
    pub code: String,
    pub siaf_code: String,
}

/// Agency within a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agency {
    pub id: String,
    pub name: String,
    pub code: String,
    pub parent_unit_id: String,
}

/// Sector within an agency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub id: String,
    pub name: String,
    pub code: String,
    pub parent_agency_id: String,
}

/// Physical location within a sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub code: String,
    pub parent_sector_id: String,
}

/// A node at any level of the hierarchy.
///
/// A node is only meaningful in the context of the selected ancestor it was
/// listed under; the resolver never mixes option lists fetched for different
/// ancestors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum HierarchyNode {
    Unit(Unit),
    Agency(Agency),
    Sector(Sector),
    Location(Location),
}

impl HierarchyNode {
    #[must_use]
    pub fn level(&self) -> Level {
        match self {
            HierarchyNode::Unit(_) => Level::Unit,
            HierarchyNode::Agency(_) => Level::Agency,
            HierarchyNode::Sector(_) => Level::Sector,
            HierarchyNode::Location(_) => Level::Location,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            HierarchyNode::Unit(node) => &node.id,
            HierarchyNode::Agency(node) => &node.id,
            HierarchyNode::Sector(node) => &node.id,
            HierarchyNode::Location(node) => &node.id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            HierarchyNode::Unit(node) => &node.name,
            HierarchyNode::Agency(node) => &node.name,
            HierarchyNode::Sector(node) => &node.name,
            HierarchyNode::Location(node) => &node.name,
        }
    }

    /// Id of the parent node this node is scoped under. Units have none.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        match self {
            HierarchyNode::Unit(_) => None,
            HierarchyNode::Agency(node) => Some(&node.parent_unit_id),
            HierarchyNode::Sector(node) => Some(&node.parent_agency_id),
            HierarchyNode::Location(node) => Some(&node.parent_sector_id),
        }
    }
}

/// The resolver's consolidated output: selected ids per level plus the
/// denormalized nodes for read-only display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSelection {
    pub unit_id: Option<String>,
    pub agency_id: Option<String>,
    pub sector_id: Option<String>,
    pub location_id: Option<String>,
    pub unit: Option<Unit>,
    pub agency: Option<Agency>,
    pub sector: Option<Sector>,
    pub location: Option<Location>,
}

impl ResolverSelection {
    /// Whether every level carries a selection.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unit_id.is_some()
            && self.agency_id.is_some()
            && self.sector_id.is_some()
            && self.location_id.is_some()
    }

    /// The selected id at a given level.
    #[must_use]
    pub fn id_at(&self, level: Level) -> Option<&str> {
        match level {
            Level::Unit => self.unit_id.as_deref(),
            Level::Agency => self.agency_id.as_deref(),
            Level::Sector => self.sector_id.as_deref(),
            Level::Location => self.location_id.as_deref(),
        }
    }

    /// Clear the selection at a single level.
    pub fn clear_level(&mut self, level: Level) {
        match level {
            Level::Unit => {
                self.unit_id = None;
                self.unit = None;
            }
            Level::Agency => {
                self.agency_id = None;
                self.agency = None;
            }
            Level::Sector => {
                self.sector_id = None;
                self.sector = None;
            }
            Level::Location => {
                self.location_id = None;
                self.location = None;
            }
        }
    }

    /// Store a node as the selection for its own level.
    pub fn set_node(&mut self, node: HierarchyNode) {
        match node {
            HierarchyNode::Unit(unit) => {
                self.unit_id = Some(unit.id.clone());
                self.unit = Some(unit);
            }
            HierarchyNode::Agency(agency) => {
                self.agency_id = Some(agency.id.clone());
                self.agency = Some(agency);
            }
            HierarchyNode::Sector(sector) => {
                self.sector_id = Some(sector.id.clone());
                self.sector = Some(sector);
            }
            HierarchyNode::Location(location) => {
                self.location_id = Some(location.id.clone());
                self.location = Some(location);
            }
        }
    }

    /// Stable identity of the four selected ids, used to apply a persisted
    /// selection at most once.
    #[must_use]
    pub fn identity(&self) -> String {
        Level::ALL
            .iter()
            .map(|level| self.id_at(*level).unwrap_or(""))
            .collect::<Vec<_>>()
            .join("/")
    }
}
