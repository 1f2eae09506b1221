use crate::catalog::parse_catalog_str;
use crate::catalog::schema::CatalogDef;
use crate::error::DeconError;

const DEFAULT_CATALOG_JSON: &str = include_str!("../../../../catalogs/default.json");

/// Available predefined catalogs.
pub const PRESETS: &[&str] = &["default"];

/// Load a predefined catalog by name.
pub fn load_preset(name: &str) -> Result<CatalogDef, DeconError> {
    match name {
        "default" => parse_catalog_str(DEFAULT_CATALOG_JSON),
        _ => Err(DeconError::CatalogInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}

/// The catalog matching the stock sales export.
pub fn default_catalog() -> Result<CatalogDef, DeconError> {
    load_preset("default")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Field;

    #[test]
    fn test_load_default_preset() {
        let catalog = load_preset("default").unwrap();
        let names: Vec<&str> = catalog.processes.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Chemetch", "LaserSTEP", "Milled", "LaserCut"]);
        assert!(catalog.is_zero_cost("LaserCut"));
        assert!(catalog.has_range_steps("LaserSTEP"));
        assert!(!catalog.has_range_steps("Milled"));
        assert!(catalog.has_step("Chemetch", "5 or more"));
        assert_eq!(
            catalog.coatings,
            vec!["Advanced Nano", "Nano Wipe", "Nano Slic", "BluPrint"]
        );
        assert_eq!(
            catalog.canonical_column(Field::StepProcess),
            "[ES] Step Process"
        );
    }

    #[test]
    fn test_unknown_preset() {
        assert!(load_preset("xyz").is_err());
    }
}
