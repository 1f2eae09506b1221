use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::schema::CatalogDef;
use crate::model::Field;

/// Outcome of checking source headers against the catalog's column contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCheck {
    /// Canonical names of required columns that were not found.
    pub missing_required: Vec<String>,
    /// Canonical names of optional columns that were not found.
    pub missing_optional: Vec<String>,
    /// Field -> header exactly as it appears in the source.
    pub resolved: BTreeMap<Field, String>,
}

impl ColumnCheck {
    /// A dataset may only be processed when every required column is present.
    pub fn is_valid(&self) -> bool {
        self.missing_required.is_empty()
    }

    pub fn header_for(&self, field: Field) -> Option<&str> {
        self.resolved.get(&field).map(String::as_str)
    }
}

/// Header comparison key: trimmed and lowercased.
pub fn normalize_header(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Check source headers against the required/optional column contract.
pub fn validate_columns<S: AsRef<str>>(headers: &[S], catalog: &CatalogDef) -> ColumnCheck {
    let normalized: Vec<(String, &str)> = headers
        .iter()
        .map(|h| (normalize_header(h.as_ref()), h.as_ref()))
        .collect();

    let mut check = ColumnCheck::default();

    for field in Field::ALL {
        let found = catalog.column_names(field).iter().find_map(|accepted| {
            let wanted = normalize_header(accepted);
            normalized
                .iter()
                .find(|(norm, _)| *norm == wanted)
                .map(|(_, original)| original.to_string())
        });

        match found {
            Some(header) => {
                check.resolved.insert(field, header);
            }
            None if field.is_required() => {
                check.missing_required.push(catalog.canonical_column(field));
            }
            None => {
                check.missing_optional.push(catalog.canonical_column(field));
            }
        }
    }

    check
}
