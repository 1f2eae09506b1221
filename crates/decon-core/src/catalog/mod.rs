pub mod builtin;
pub mod schema;

use crate::error::DeconError;
use crate::model::Field;
use schema::CatalogDef;
use std::collections::HashSet;
use std::path::Path;

/// Load a catalog from a JSON file.
pub fn load_catalog(path: &Path) -> Result<CatalogDef, DeconError> {
    let content = std::fs::read_to_string(path).map_err(|e| DeconError::CatalogLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_catalog(&content, path)
}

/// Parse a catalog from a JSON string.
pub fn parse_catalog(json: &str, source: &Path) -> Result<CatalogDef, DeconError> {
    let catalog: CatalogDef = serde_json::from_str(json).map_err(|e| DeconError::CatalogLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Parse a catalog from a JSON string (no file path context).
pub fn parse_catalog_str(json: &str) -> Result<CatalogDef, DeconError> {
    let catalog: CatalogDef = serde_json::from_str(json).map_err(DeconError::Json)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Validate that a catalog is well-formed.
pub fn validate_catalog(catalog: &CatalogDef) -> Result<(), DeconError> {
    if catalog.processes.is_empty() {
        return Err(DeconError::CatalogInvalid(
            "processes must not be empty".into(),
        ));
    }

    let mut seen = HashSet::new();
    for process in &catalog.processes {
        if process.name.trim().is_empty() {
            return Err(DeconError::CatalogInvalid(
                "process name must not be empty".into(),
            ));
        }
        if !seen.insert(process.name.as_str()) {
            return Err(DeconError::CatalogInvalid(format!(
                "process '{}' is declared twice",
                process.name
            )));
        }
    }

    if catalog.coatings.is_empty() {
        return Err(DeconError::CatalogInvalid("coatings must not be empty".into()));
    }

    if let Some(ref fallback) = catalog.laserstep_fallback {
        if catalog.process(&fallback.process).is_none() {
            return Err(DeconError::CatalogInvalid(format!(
                "fallback process '{}' is not declared",
                fallback.process
            )));
        }
        if !catalog.has_step(&fallback.process, &fallback.source_step) {
            return Err(DeconError::CatalogInvalid(format!(
                "fallback source step '{}' is not a step of '{}'",
                fallback.source_step, fallback.process
            )));
        }
        for step in &fallback.extension_steps {
            if !catalog.has_step(&fallback.process, step) {
                return Err(DeconError::CatalogInvalid(format!(
                    "fallback extension step '{}' is not a step of '{}'",
                    step, fallback.process
                )));
            }
        }
        if fallback.default_cost.is_sign_negative() {
            return Err(DeconError::CatalogInvalid(format!(
                "fallback default cost must not be negative (got {})",
                fallback.default_cost
            )));
        }
    }

    for field in Field::ALL.iter().filter(|f| f.is_required()) {
        let names = catalog.column_names(*field);
        if names.iter().all(|n| n.trim().is_empty()) {
            return Err(DeconError::CatalogInvalid(format!(
                "required field '{}' has no column name",
                field
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &str = r#"{
        "sale_price": ["Sales Price"],
        "frame": ["Frame"],
        "customer_name": ["Customer"],
        "process": ["Process"],
        "step_process": ["Step Process"],
        "coating": ["Coating"],
        "foil_material": ["Foil Material"],
        "foil_thickness": ["Foil Thickness"],
        "colour": ["Colour"]
    }"#;

    fn catalog_json(processes: &str, fallback: &str) -> String {
        format!(
            r#"{{
                "name": "Test",
                "version": "1.0",
                "processes": {processes},
                "coatings": ["Nano Wipe"],
                "laserstep_fallback": {fallback},
                "columns": {COLUMNS}
            }}"#
        )
    }

    #[test]
    fn test_parse_valid_catalog() {
        let json = catalog_json(
            r#"[{ "name": "LaserSTEP", "steps": ["1-20", "21-30"] }]"#,
            r#"{ "process": "LaserSTEP", "source_step": "1-20", "default_cost": "245", "extension_steps": ["21-30"] }"#,
        );
        let catalog = parse_catalog_str(&json).unwrap();
        assert_eq!(catalog.name, "Test");
        assert_eq!(catalog.sheet_name, "SalesbyItemBASEPRICEDECON");
        assert!(catalog.has_step("LaserSTEP", "21-30"));
        assert!(catalog.fallback_for("LaserSTEP", "21-30").is_some());
        assert!(catalog.fallback_for("LaserSTEP", "1-20").is_none());
    }

    #[test]
    fn test_empty_processes_rejected() {
        let json = catalog_json("[]", "null");
        assert!(parse_catalog_str(&json).is_err());
    }

    #[test]
    fn test_duplicate_process_rejected() {
        let json = catalog_json(
            r#"[{ "name": "Milled", "steps": ["Single"] }, { "name": "Milled" }]"#,
            "null",
        );
        assert!(parse_catalog_str(&json).is_err());
    }

    #[test]
    fn test_fallback_unknown_step_rejected() {
        let json = catalog_json(
            r#"[{ "name": "LaserSTEP", "steps": ["1-20"] }]"#,
            r#"{ "process": "LaserSTEP", "source_step": "1-20", "default_cost": "245", "extension_steps": ["21-30"] }"#,
        );
        assert!(parse_catalog_str(&json).is_err());
    }

    #[test]
    fn test_missing_required_column_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "processes": [{ "name": "Milled", "steps": ["Single"] }],
            "coatings": ["Nano Wipe"],
            "columns": { "sale_price": ["Sales Price"] }
        }"#;
        assert!(matches!(
            parse_catalog_str(json),
            Err(DeconError::CatalogInvalid(_))
        ));
    }
}
