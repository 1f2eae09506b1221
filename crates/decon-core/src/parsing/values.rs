use crate::error::DeconError;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a decimal number from text.
///
/// Handles formats like:
/// - "245" -> 245
/// - " 19.95 " -> 19.95
/// - "-12.5" -> -12.5
/// - "1e2" / "2.5E-1" -> 100 / 0.25
pub fn parse_decimal(s: &str) -> Result<Decimal, DeconError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(DeconError::ParseError("empty number".into()));
    }

    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|e| DeconError::ParseError(format!("invalid number '{}': {}", s, e)))
}

/// Convert f64 to Decimal, preserving reasonable precision.
///
/// Uses string round-trip to avoid floating-point artifacts
/// (e.g., 0.0035_f64 becoming 0.00349999...).
pub fn f64_to_decimal(f: f64) -> Option<Decimal> {
    if !f.is_finite() {
        return None;
    }
    let s = format!("{f}");
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::try_from(f).ok())
}
