use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{BackendError, HierarchyDirectory, RecordStore};
use crate::normalize::{CaseFold, normalize};
use crate::types::{
    Agency, HierarchyNode, Level, Location, RecordField, SearchableRecord, Sector, Unit,
};

/// Serializable snapshot of both collaborators, loadable from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryFixture {
    pub records: Vec<SearchableRecord>,
    pub units: Vec<Unit>,
    pub agencies: Vec<Agency>,
    pub sectors: Vec<Sector>,
    pub locations: Vec<Location>,
}

/// Load a [`MemoryFixture`] from disk and split it into the two collaborators.
pub fn load_fixture(path: impl AsRef<Path>) -> Result<(MemoryStore, MemoryDirectory)> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read fixture {}", path.display()))?;
    let fixture: MemoryFixture = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse fixture {}", path.display()))?;
    Ok((
        MemoryStore::new(fixture.records),
        MemoryDirectory::new(fixture.units, fixture.agencies, fixture.sectors, fixture.locations),
    ))
}

/// In-memory [`RecordStore`] with the same query shapes the remote document
/// collection supports.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<SearchableRecord>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(records: Vec<SearchableRecord>) -> Self {
        Self { records }
    }
}

impl RecordStore for MemoryStore {
    fn find_exact(
        &self,
        code: &str,
        check_digit: &str,
    ) -> Result<Vec<SearchableRecord>, BackendError> {
        Ok(self
            .records
            .iter()
            .filter(|record| record.asset_code == code && record.check_digit == check_digit)
            .cloned()
            .collect())
    }

    fn scan_range(
        &self,
        field: RecordField,
        lower: &str,
        upper: &str,
        cap: usize,
    ) -> Result<Vec<SearchableRecord>, BackendError> {
        Ok(self
            .records
            .iter()
            .filter(|record| {
                let value = record.field(field);
                value >= lower && value <= upper
            })
            .take(cap)
            .cloned()
            .collect())
    }

    fn scan_description_containing(
        &self,
        token: &str,
        cap: usize,
    ) -> Result<Vec<SearchableRecord>, BackendError> {
        // Wide candidate pool: any token containing the needle qualifies the
        // document; callers narrow to the matching words client-side.
        Ok(self
            .records
            .iter()
            .filter(|record| record.description_tokens.iter().any(|t| t.contains(token)))
            .take(cap)
            .cloned()
            .collect())
    }
}

/// In-memory [`HierarchyDirectory`] over the four node collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    units: Vec<Unit>,
    agencies: Vec<Agency>,
    sectors: Vec<Sector>,
    locations: Vec<Location>,
}

impl MemoryDirectory {
    #[must_use]
    pub fn new(
        units: Vec<Unit>,
        agencies: Vec<Agency>,
        sectors: Vec<Sector>,
        locations: Vec<Location>,
    ) -> Self {
        Self {
            units,
            agencies,
            sectors,
            locations,
        }
    }
}

fn name_matches(name: &str, filter: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(filter) if filter.is_empty() => true,
        Some(filter) => {
            let haystack = normalize(name, CaseFold::Upper);
            let needle = normalize(filter, CaseFold::Upper);
            haystack.contains(&needle)
        }
    }
}

impl HierarchyDirectory for MemoryDirectory {
    fn list(
        &self,
        level: Level,
        parent_id: Option<&str>,
        filter: Option<&str>,
    ) -> Result<Vec<HierarchyNode>, BackendError> {
        if level != Level::Unit && parent_id.is_none() {
            return Err(BackendError::MissingParent { level });
        }
        let nodes = match level {
            Level::Unit => self
                .units
                .iter()
                .filter(|node| name_matches(&node.name, filter))
                .cloned()
                .map(HierarchyNode::Unit)
                .collect(),
            Level::Agency => self
                .agencies
                .iter()
                .filter(|node| Some(node.parent_unit_id.as_str()) == parent_id)
                .filter(|node| name_matches(&node.name, filter))
                .cloned()
                .map(HierarchyNode::Agency)
                .collect(),
            Level::Sector => self
                .sectors
                .iter()
                .filter(|node| Some(node.parent_agency_id.as_str()) == parent_id)
                .filter(|node| name_matches(&node.name, filter))
                .cloned()
                .map(HierarchyNode::Sector)
                .collect(),
            Level::Location => self
                .locations
                .iter()
                .filter(|node| Some(node.parent_sector_id.as_str()) == parent_id)
                .filter(|node| name_matches(&node.name, filter))
                .cloned()
                .map(HierarchyNode::Location)
                .collect(),
        };
        Ok(nodes)
    }
}
