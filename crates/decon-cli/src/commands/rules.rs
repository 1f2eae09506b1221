use decon_core::catalog::schema::CatalogDef;
use decon_core::error::DeconError;
use decon_core::pricing::table::ManualOverrides;
use decon_core::pricing::{parse_rule_text, render_rule_text, CostSource, PricingRuleTable};
use std::path::{Path, PathBuf};

pub fn parse(file: &Path, catalog: Option<PathBuf>, normalized: bool) -> Result<(), DeconError> {
    let catalog = super::load_catalog(catalog.as_deref())?;
    let text = std::fs::read_to_string(file)?;
    let parsed = parse_rule_text(&text, &catalog);

    if parsed.is_empty() {
        println!("No pricing lines recognized in {}.", file.display());
    } else {
        println!("Recognized lines: {}\n", parsed.lines.len());
    }
    for (line_no, rule) in &parsed.lines {
        println!("  {:>4}  {:<28} {}", line_no, rule.key().to_string(), rule.cost());
    }

    if !parsed.diagnostics.is_empty() {
        println!("\nDiagnostics:");
        for d in &parsed.diagnostics {
            println!("  - {d}");
        }
    }

    if normalized {
        // Implied extension prices are written out so the text stands alone.
        println!("\nNormalized rule text:\n");
        print!("{}", render_rule_text(&parsed.to_mapping()));
    }

    let table = PricingRuleTable::build(&parsed, &ManualOverrides::default(), &catalog)?;

    println!("\nResolved pricing table:\n");
    for entry in table.entries() {
        let source = match entry.source {
            CostSource::Manual => "manual",
            CostSource::Parsed => "rule file",
            CostSource::Fallback if parsed.is_implied(&entry.key) => "implied",
            CostSource::Fallback => "fallback",
            CostSource::Unset => "-",
        };
        println!("  {:<28} {:>10}  {}", entry.key.to_string(), entry.cost, source);
    }

    Ok(())
}

pub fn catalog(path: Option<PathBuf>) -> Result<(), DeconError> {
    let catalog = super::load_catalog(path.as_deref())?;
    print_catalog(&catalog);
    Ok(())
}

fn print_catalog(catalog: &CatalogDef) {
    println!("{} (version {})\n", catalog.name, catalog.version);
    if let Some(ref desc) = catalog.description {
        println!("{desc}\n");
    }
    println!("Worksheet: {}\n", catalog.sheet_name);

    println!("Processes:");
    for process in &catalog.processes {
        if process.zero_cost {
            println!("  {:<12} never charged", process.name);
        } else {
            println!("  {:<12} {}", process.name, process.steps.join(", "));
        }
    }

    println!("\nCoatings:\n  {}", catalog.coatings.join(", "));

    if let Some(ref fb) = catalog.laserstep_fallback {
        println!(
            "\nFallback: {} {} unpriced take the {} price (default {})",
            fb.process,
            fb.extension_steps.join(", "),
            fb.source_step,
            fb.default_cost
        );
    }

    println!("\nColumns:");
    for (field, names) in &catalog.columns {
        println!("  {:<22} {}", field.to_string(), names.join(" | "));
    }
}

pub fn validate(file: &Path) -> Result<(), DeconError> {
    let catalog = decon_core::catalog::load_catalog(file)?;

    println!("Catalog '{}' (v{}) is valid.", catalog.name, catalog.version);
    println!(
        "  Processes: {}",
        catalog
            .processes
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Coatings: {}", catalog.coatings.len());

    // Potential issues (warnings, not errors)
    let mut warnings = Vec::new();
    for process in &catalog.processes {
        if process.steps.is_empty() && !process.zero_cost {
            warnings.push(format!(
                "process '{}' has no steps and is not zero-cost; its rows can never be priced",
                process.name
            ));
        }
    }
    for field in decon_core::model::Field::ALL {
        if !field.is_required() && catalog.column_names(field).is_empty() {
            warnings.push(format!("optional field '{field}' has no column name"));
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {w}");
        }
    }

    Ok(())
}
