use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::catalog::schema::CatalogDef;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::parsing::normalize::{normalize_rule_key, title_case};
use crate::parsing::values::parse_decimal;
use crate::pricing::keys::RuleKey;

pub const CHEMETCH: &str = "Chemetch";
pub const LASERSTEP: &str = "LaserSTEP";
pub const MILLED: &str = "Milled";

/// Step a bare "double" line is read as (on the Milled process).
const AMBIGUOUS_DOUBLE_STEP: &str = "Double";

/// Casing corrections applied after title-casing a coating name.
const COATING_CASE_FIXES: &[(&str, &str)] = &[("Bluprint", "BluPrint")];

/// One recognized line of rule text, tagged by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum RuleLine {
    Chemetch { step: String, cost: Decimal },
    LaserStep { range: String, cost: Decimal },
    Milled { step: String, cost: Decimal },
    /// Bare "double", read as Milled Double.
    AmbiguousDouble { cost: Decimal },
    Coating { name: String, cost: Decimal },
}

impl RuleLine {
    pub fn key(&self) -> RuleKey {
        match self {
            RuleLine::Chemetch { step, .. } => RuleKey::process(CHEMETCH, step.as_str()),
            RuleLine::LaserStep { range, .. } => RuleKey::process(LASERSTEP, range.as_str()),
            RuleLine::Milled { step, .. } => RuleKey::process(MILLED, step.as_str()),
            RuleLine::AmbiguousDouble { .. } => RuleKey::process(MILLED, AMBIGUOUS_DOUBLE_STEP),
            RuleLine::Coating { name, .. } => RuleKey::coating(name.as_str()),
        }
    }

    pub fn cost(&self) -> Decimal {
        match self {
            RuleLine::Chemetch { cost, .. }
            | RuleLine::LaserStep { cost, .. }
            | RuleLine::Milled { cost, .. }
            | RuleLine::AmbiguousDouble { cost }
            | RuleLine::Coating { cost, .. } => *cost,
        }
    }
}

/// A rule key split off its prefix, before the label is checked.
enum Prefixed<'a> {
    Chemetch(&'a str),
    LaserStep(&'a str),
    Milled(&'a str),
    Double,
    Coating(&'a str),
}

fn split_prefix(key: &str) -> Option<Prefixed<'_>> {
    if let Some(step) = key.strip_prefix("chem ") {
        Some(Prefixed::Chemetch(step))
    } else if let Some(range) = key.strip_prefix("laserstep ") {
        Some(Prefixed::LaserStep(range))
    } else if let Some(step) = key.strip_prefix("mill ") {
        Some(Prefixed::Milled(step))
    } else if key == "double" {
        Some(Prefixed::Double)
    } else {
        key.strip_prefix("coat ").map(Prefixed::Coating)
    }
}

/// Result of parsing rule text.
#[derive(Debug, Clone, Default)]
pub struct ParsedRules {
    /// Recognized lines with their 1-based line numbers, in input order.
    pub lines: Vec<(usize, RuleLine)>,
    /// Costs stated in the text. A later line for the same key wins.
    pub explicit: BTreeMap<RuleKey, Decimal>,
    /// LaserSTEP extension costs implied by the rest of the family.
    pub implied: BTreeMap<RuleKey, Decimal>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedRules {
    /// Cost for a key, explicit entries first.
    pub fn get(&self, key: &RuleKey) -> Option<Decimal> {
        self.explicit
            .get(key)
            .or_else(|| self.implied.get(key))
            .copied()
    }

    pub fn is_implied(&self, key: &RuleKey) -> bool {
        !self.explicit.contains_key(key) && self.implied.contains_key(key)
    }

    /// Flattened attribute -> cost mapping (explicit and implied).
    pub fn to_mapping(&self) -> BTreeMap<RuleKey, Decimal> {
        let mut mapping = self.implied.clone();
        mapping.extend(self.explicit.iter().map(|(k, v)| (k.clone(), *v)));
        mapping
    }

    pub fn is_empty(&self) -> bool {
        self.explicit.is_empty()
    }
}

/// Parse line-oriented rule text (`<prefix> <label>: <number>`).
///
/// Lines without a colon, with an unknown prefix, or with a label outside
/// the catalog are dropped. Only lines with a recognized prefix produce
/// diagnostics, so free-form notes in the file stay quiet.
pub fn parse_rule_text(text: &str, catalog: &CatalogDef) -> ParsedRules {
    let mut parsed = ParsedRules::default();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        let Some((raw_key, raw_value)) = line.split_once(':') else {
            continue;
        };

        let key = normalize_rule_key(raw_key);
        let Some(prefixed) = split_prefix(&key) else {
            debug!(line = line_no, key = %key, "rule line without a known prefix skipped");
            continue;
        };

        let cost = match parse_decimal(raw_value) {
            Ok(cost) => cost,
            Err(_) => {
                warn!(line = line_no, value = raw_value.trim(), "invalid price value in rule text");
                parsed.diagnostics.push(Diagnostic::at(
                    DiagnosticKind::InvalidRuleValue,
                    line_no,
                    format!("invalid price value for '{}': '{}'", key, raw_value.trim()),
                ));
                continue;
            }
        };
        if cost.is_sign_negative() && !cost.is_zero() {
            warn!(line = line_no, %cost, "negative price in rule text");
            parsed.diagnostics.push(Diagnostic::at(
                DiagnosticKind::NegativeRuleValue,
                line_no,
                format!("negative price for '{}': {}", key, cost),
            ));
            continue;
        }

        let rule = classify_line(prefixed, cost, catalog, line_no, &mut parsed.diagnostics);

        let rule_key = rule.key();
        if !rule_key.is_known(catalog) {
            debug!(line = line_no, key = %rule_key, "rule label outside the catalog");
            parsed.diagnostics.push(Diagnostic::at(
                DiagnosticKind::UnknownRuleLabel,
                line_no,
                format!("'{}' is not in the catalog, line ignored", rule_key),
            ));
            continue;
        }

        debug!(line = line_no, key = %rule_key, %cost, "rule parsed");
        if let Some(previous) = parsed.explicit.insert(rule_key.clone(), cost) {
            debug!(key = %rule_key, %previous, %cost, "rule overridden by a later line");
        }
        parsed.lines.push((line_no, rule));
    }

    fill_implied(&mut parsed, catalog);
    parsed
}

fn classify_line(
    prefixed: Prefixed<'_>,
    cost: Decimal,
    catalog: &CatalogDef,
    line_no: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> RuleLine {
    match prefixed {
        Prefixed::Chemetch(step) => {
            // Steps spelled exactly like the vocabulary ("5 or more") keep their form.
            let step = if catalog.has_step(CHEMETCH, step) {
                step.to_string()
            } else {
                title_case(step)
            };
            RuleLine::Chemetch { step, cost }
        }
        Prefixed::LaserStep(range) => RuleLine::LaserStep {
            range: range.to_string(),
            cost,
        },
        Prefixed::Milled(step) => RuleLine::Milled {
            step: title_case(step),
            cost,
        },
        Prefixed::Double => {
            warn!(line = line_no, %cost, "ambiguous key 'double' mapped to Milled Double");
            diagnostics.push(Diagnostic::at(
                DiagnosticKind::AmbiguousRule,
                line_no,
                format!("ambiguous key 'double' read as {MILLED} {AMBIGUOUS_DOUBLE_STEP}: {cost}"),
            ));
            RuleLine::AmbiguousDouble { cost }
        }
        Prefixed::Coating(name) => {
            let mut name = title_case(name);
            for (wrong, right) in COATING_CASE_FIXES {
                name = name.replace(wrong, right);
            }
            RuleLine::Coating { name, cost }
        }
    }
}

/// Give every missing extension step of the fallback family the source
/// step's price, once the text mentions that family at all.
fn fill_implied(parsed: &mut ParsedRules, catalog: &CatalogDef) {
    let Some(fallback) = catalog.laserstep_fallback.as_ref() else {
        return;
    };
    let family_mentioned = parsed
        .explicit
        .keys()
        .any(|k| matches!(k, RuleKey::Process { process, .. } if *process == fallback.process));
    if !family_mentioned {
        return;
    }

    let source = parsed
        .explicit
        .get(&RuleKey::process(fallback.process.as_str(), fallback.source_step.as_str()))
        .copied()
        .filter(|c| !c.is_zero())
        .unwrap_or(fallback.default_cost);

    for step in &fallback.extension_steps {
        let key = RuleKey::process(fallback.process.as_str(), step.as_str());
        if !parsed.explicit.contains_key(&key) {
            debug!(key = %key, cost = %source, "implied price from the fallback source step");
            parsed.implied.insert(key, source);
        }
    }
}

/// Render costs back into rule text, one normalized line per entry.
pub fn render_rule_text(costs: &BTreeMap<RuleKey, Decimal>) -> String {
    let mut out = String::new();
    for (key, cost) in costs {
        let line = match key {
            RuleKey::Process { process, step } => {
                let prefix = match process.as_str() {
                    CHEMETCH => "chem",
                    LASERSTEP => "laserstep",
                    MILLED => "mill",
                    _ => continue,
                };
                format!("{prefix} {step}: {cost}")
            }
            RuleKey::Coating { name } => format!("coat {name}: {cost}"),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::default_catalog;
    use rust_decimal_macros::dec;

    fn parse(text: &str) -> ParsedRules {
        parse_rule_text(text, &default_catalog().unwrap())
    }

    #[test]
    fn test_chem_title_cased() {
        let parsed = parse("chem single: 100");
        assert_eq!(
            parsed.get(&RuleKey::process("Chemetch", "Single")),
            Some(dec!(100))
        );
    }

    #[test]
    fn test_chem_five_or_more_verbatim() {
        let parsed = parse("chem 5 or more: 400");
        assert_eq!(
            parsed.get(&RuleKey::process("Chemetch", "5 or more")),
            Some(dec!(400))
        );
    }

    #[test]
    fn test_laserstep_misspelling() {
        let parsed = parse("Lasterstep 1-2: 200\nlaststep 1-5: 210");
        assert_eq!(
            parsed.get(&RuleKey::process("LaserSTEP", "1-2")),
            Some(dec!(200))
        );
        assert_eq!(
            parsed.get(&RuleKey::process("LaserSTEP", "1-5")),
            Some(dec!(210))
        );
    }

    #[test]
    fn test_laserstep_extension_implied_from_source() {
        let parsed = parse("laserstep 1-20: 300\nlaserstep 41-50: 500");
        let k31 = RuleKey::process("LaserSTEP", "31-40");
        assert_eq!(parsed.get(&k31), Some(dec!(300)));
        assert!(parsed.is_implied(&k31));
        let k41 = RuleKey::process("LaserSTEP", "41-50");
        assert_eq!(parsed.get(&k41), Some(dec!(500)));
        assert!(!parsed.is_implied(&k41));
    }

    #[test]
    fn test_laserstep_extension_default_without_source() {
        let parsed = parse("laserstep 1-2: 200");
        assert_eq!(
            parsed.get(&RuleKey::process("LaserSTEP", "21-30")),
            Some(dec!(245))
        );
    }

    #[test]
    fn test_no_implied_without_laserstep_lines() {
        let parsed = parse("chem single: 10");
        assert!(parsed.implied.is_empty());
    }

    #[test]
    fn test_mill_and_ambiguous_double() {
        let parsed = parse("mill quad: 80\ndouble: 60");
        assert_eq!(
            parsed.get(&RuleKey::process("Milled", "Quad")),
            Some(dec!(80))
        );
        assert_eq!(
            parsed.get(&RuleKey::process("Milled", "Double")),
            Some(dec!(60))
        );
        assert!(parsed
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::AmbiguousRule && d.location == Some(2)));
    }

    #[test]
    fn test_coating_bluprint_casing() {
        let parsed = parse("coat bluprint: 35\ncoat ADVANCED NANO: 20");
        assert_eq!(parsed.get(&RuleKey::coating("BluPrint")), Some(dec!(35)));
        assert_eq!(
            parsed.get(&RuleKey::coating("Advanced Nano")),
            Some(dec!(20))
        );
    }

    #[test]
    fn test_out_of_vocabulary_dropped() {
        let parsed = parse("coat gold leaf: 10\nmill penta: 5\nlaserstep 61-70: 9");
        assert!(parsed.explicit.is_empty());
        assert_eq!(
            parsed
                .diagnostics
                .iter()
                .filter(|d| d.kind == DiagnosticKind::UnknownRuleLabel)
                .count(),
            3
        );
    }

    #[test]
    fn test_free_form_lines_skipped_quietly() {
        let parsed = parse("Price list 2024\nNote: call supplier\n\nchem double: 150");
        assert_eq!(parsed.explicit.len(), 1);
        assert!(parsed.diagnostics.is_empty());
        assert!(!parsed.is_empty());
        assert!(parse("Price list 2024\nNote: call supplier").is_empty());
    }

    #[test]
    fn test_invalid_and_negative_values() {
        let parsed = parse("chem single: abc\nchem double: -5\nchem triple: 70");
        assert_eq!(parsed.explicit.len(), 1);
        let kinds: Vec<DiagnosticKind> = parsed.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::InvalidRuleValue,
                DiagnosticKind::NegativeRuleValue
            ]
        );
    }

    #[test]
    fn test_later_line_wins() {
        let parsed = parse("chem single: 10\nchem Single: 12");
        assert_eq!(
            parsed.get(&RuleKey::process("Chemetch", "Single")),
            Some(dec!(12))
        );
        assert_eq!(parsed.lines.len(), 2);
    }

    #[test]
    fn test_reparse_of_rendered_text_is_stable() {
        let catalog = default_catalog().unwrap();
        let parsed = parse_rule_text(
            "chem single: 50\nlasterstep 1-20: 245\ndouble: 60\ncoat bluprint: 35\nchem 5 or more: 90",
            &catalog,
        );
        let rendered = render_rule_text(&parsed.to_mapping());
        let reparsed = parse_rule_text(&rendered, &catalog);
        assert_eq!(reparsed.to_mapping(), parsed.to_mapping());
        for key in reparsed.to_mapping().keys() {
            assert!(key.is_known(&catalog));
        }
    }
}
