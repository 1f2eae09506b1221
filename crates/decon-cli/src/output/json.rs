use decon_core::error::DeconError;
use decon_core::DeconstructionReport;

pub fn print(report: &DeconstructionReport) -> Result<(), DeconError> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}
