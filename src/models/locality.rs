//! Locality record returned by the zipcode lookup service

use serde::{Deserialize, Serialize};

/// Zipcode lookup result. Only `postal_code` and `locality` drive the pipeline.
///
/// The lookup service answers unknown zipcodes with `{"erro": true}` and a
/// success status, so every field defaults to an empty string and an empty
/// `postal_code` means "not found".
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LocalityRecord {
    /// Zipcode as echoed by the lookup service (formatted, e.g. `01001-000`)
    #[serde(rename = "cep")]
    pub postal_code: String,
    /// City name, used as the weather query
    #[serde(rename = "localidade")]
    pub locality: String,
    /// Street name
    #[serde(rename = "logradouro")]
    pub street: String,
    /// Neighbourhood
    #[serde(rename = "bairro")]
    pub district: String,
    /// Two-letter state code
    #[serde(rename = "uf")]
    pub state: String,
}

impl LocalityRecord {
    /// Create a record with just the fields the pipeline consumes
    #[must_use]
    pub fn new<P: Into<String>, L: Into<String>>(postal_code: P, locality: L) -> Self {
        Self {
            postal_code: postal_code.into(),
            locality: locality.into(),
            ..Self::default()
        }
    }

    /// Whether the lookup service actually knew the zipcode
    #[must_use]
    pub fn is_found(&self) -> bool {
        !self.postal_code.is_empty()
    }

    /// Whether the record can feed the weather lookup
    #[must_use]
    pub fn has_locality(&self) -> bool {
        !self.locality.is_empty()
    }
}
