use serde::{Deserialize, Serialize};

/// One denormalized document describing a physical asset.
///
/// Records are created and updated by an external ingestion process; this
/// crate only reads them. The description is stored pre-tokenized so that
/// membership queries can match individual words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchableRecord {
    pub asset_code: String,
    pub check_digit: String,
    pub atm_number: String,
    pub material_name: String,
    pub location_name: String,
    pub description_tokens: Vec<String>,
    pub responsible_name: String,
}

impl SearchableRecord {
    /// The `code-checkDigit` pair that uniquely identifies one asset.
    #[must_use]
    pub fn composite_key(&self) -> String {
        format!("{}-{}", self.asset_code, self.check_digit)
    }

    /// Read the scalar field a range scan addresses.
    #[must_use]
    pub fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::AssetCode => &self.asset_code,
            RecordField::AtmNumber => &self.atm_number,
            RecordField::MaterialName => &self.material_name,
            RecordField::LocationName => &self.location_name,
            RecordField::ResponsibleName => &self.responsible_name,
        }
    }
}

/// Scalar record fields addressable by prefix range scans.
///
/// The description is not listed here: it is only reachable through the
/// token-membership query, never through a range scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    AssetCode,
    AtmNumber,
    MaterialName,
    LocationName,
    ResponsibleName,
}
