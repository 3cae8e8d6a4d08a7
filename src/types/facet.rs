use serde::{Deserialize, Serialize};

/// Identifies which semantic field of a record a search hit came from.
///
/// The facet travels with every suggestion and selected term so that callers
/// can caption and colour hits; the colouring itself happens outside this
/// crate, but the tag is part of the output contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    /// Composite asset code plus check digit (`12345-7`).
    Code,
    /// Secondary patrimony number assigned by the treasury system.
    AtmNumber,
    /// Material (item type) name.
    MaterialName,
    /// Physical location name.
    LocationName,
    /// A single word drawn from the tokenized free-text description.
    DescriptionToken,
    /// Name of the person responsible for the asset.
    ResponsibleName,
}

impl Facet {
    /// Every facet, in the order buckets are presented.
    pub const ALL: [Facet; 6] = [
        Facet::Code,
        Facet::AtmNumber,
        Facet::MaterialName,
        Facet::LocationName,
        Facet::DescriptionToken,
        Facet::ResponsibleName,
    ];

    /// Human-readable caption used by presentation layers.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Facet::Code => "Asset code",
            Facet::AtmNumber => "ATM number",
            Facet::MaterialName => "Material",
            Facet::LocationName => "Location",
            Facet::DescriptionToken => "Description",
            Facet::ResponsibleName => "Responsible",
        }
    }

    /// Stable identifier used in the query-string mirror.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Facet::Code => "code",
            Facet::AtmNumber => "atm_number",
            Facet::MaterialName => "material_name",
            Facet::LocationName => "location_name",
            Facet::DescriptionToken => "description_token",
            Facet::ResponsibleName => "responsible_name",
        }
    }

    /// Parse the query-string identifier back into a facet.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Facet> {
        Facet::ALL.into_iter().find(|facet| facet.slug() == slug)
    }

    /// Index of the request-guard channel dedicated to this facet.
    #[must_use]
    pub(crate) fn channel(self) -> usize {
        Facet::ALL
            .iter()
            .position(|facet| *facet == self)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip() {
        for facet in Facet::ALL {
            assert_eq!(Facet::from_slug(facet.slug()), Some(facet));
        }
    }

    #[test]
    fn unknown_slug_is_rejected() {
        assert_eq!(Facet::from_slug("serial"), None);
    }

    #[test]
    fn channels_are_distinct() {
        let mut seen: Vec<usize> = Facet::ALL.iter().map(|f| f.channel()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), Facet::ALL.len());
    }
}
