use decon_core::error::DeconError;
use decon_core::extraction::csv_output::write_records;
use decon_core::DeconstructionReport;

pub fn print(report: &DeconstructionReport) -> Result<(), DeconError> {
    write_records(std::io::stdout().lock(), &report.records)
}
