use decon_core::error::DeconError;
use decon_core::extraction;
use decon_core::parsing::validate_columns;
use std::path::{Path, PathBuf};

pub fn run(input_file: &Path, catalog: Option<PathBuf>) -> Result<(), DeconError> {
    let catalog = super::load_catalog(catalog.as_deref())?;
    let data = extraction::read_table(input_file, &catalog.sheet_name)?;
    let check = validate_columns(&data.headers, &catalog);

    println!("{} ({} data rows)\n", input_file.display(), data.rows.len());
    for (field, header) in &check.resolved {
        println!("  {:<22} <- {}", field.to_string(), header);
    }
    for missing in &check.missing_optional {
        println!("  {:<22}    optional, not found (rows get 'Unknown')", missing);
    }

    if !check.is_valid() {
        return Err(DeconError::MissingRequiredColumns {
            missing: check.missing_required,
            found: data.headers,
        });
    }

    println!("\nAll required columns present.");
    Ok(())
}
