use decon_core::deconstruct::outcome::DeconstructedRecord;
use decon_core::DeconstructionReport;

const HEADERS: [&str; 10] = [
    "Customer",
    "Process",
    "Step",
    "Coating",
    "Foil Material",
    "Foil Thickness",
    "Colour",
    "Sale",
    "Attribute",
    "Base",
];

fn cells(r: &DeconstructedRecord) -> [String; 10] {
    [
        r.customer.clone(),
        r.process.clone(),
        r.step_process.clone(),
        r.coating.clone(),
        r.foil_material.clone(),
        r.foil_thickness.clone(),
        r.colour.clone(),
        r.sale_price.to_string(),
        r.attribute_cost.to_string(),
        r.base_cost.to_string(),
    ]
}

pub fn print(report: &DeconstructionReport, verbose: bool) {
    let rows: Vec<[String; 10]> = report.records.iter().map(cells).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    // Text columns left-aligned, money columns right-aligned.
    let line = |cols: &[String]| -> String {
        cols.iter()
            .zip(widths.iter())
            .enumerate()
            .map(|(i, (c, &w))| {
                if i >= 7 {
                    format!("{c:>w$}")
                } else {
                    format!("{c:<w$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    println!("{}", line(&header));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1)));
    for row in &rows {
        println!("{}", line(row));
    }

    println!("\nLowest base cost by customer:\n");
    let name_width = report
        .summary
        .iter()
        .map(|s| s.customer.chars().count())
        .max()
        .unwrap_or(8);
    for s in &report.summary {
        println!(
            "  {:<width$}  {:>10}  {} / {} / {}  ({} configuration{})",
            s.customer,
            s.lowest_base_cost.to_string(),
            s.process,
            s.step_process,
            s.coating,
            s.configurations,
            if s.configurations == 1 { "" } else { "s" },
            width = name_width
        );
    }

    let stats = &report.stats;
    println!(
        "\n{} rows read, {} skipped, {} configurations",
        stats.rows_read, stats.rows_skipped, stats.configurations
    );

    if report.diagnostics.is_empty() && report.skipped_rows.is_empty() {
        return;
    }

    if verbose {
        if !report.skipped_rows.is_empty() {
            println!("\nSkipped rows:");
            for s in &report.skipped_rows {
                println!("  - {s}");
            }
        }
        if !report.diagnostics.is_empty() {
            println!("\nDiagnostics:");
            for d in &report.diagnostics {
                println!("  - {:?}: {}", d.kind, d);
            }
        }
    } else if !report.diagnostics.is_empty() {
        println!(
            "{} diagnostic(s). Run with --verbose to list them.",
            report.diagnostics.len()
        );
    }
}
