pub mod check;
pub mod rules;
pub mod run;

use decon_core::catalog::builtin;
use decon_core::catalog::schema::CatalogDef;
use decon_core::error::DeconError;
use std::path::Path;

/// The catalog given on the command line, or the built-in default.
pub fn load_catalog(path: Option<&Path>) -> Result<CatalogDef, DeconError> {
    match path {
        Some(path) => decon_core::catalog::load_catalog(path),
        None => builtin::default_catalog(),
    }
}
