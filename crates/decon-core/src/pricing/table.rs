use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::catalog::schema::CatalogDef;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::DeconError;
use crate::parsing::values::parse_decimal;
use crate::pricing::keys::RuleKey;
use crate::pricing::parser::{parse_rule_text, ParsedRules};

/// Everything a pricing submission carries: optional rule text and manual
/// form entries keyed by form key ("Chemetch_Single", "Coating_Nano Wipe").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingInput {
    #[serde(default)]
    pub rule_text: Option<String>,
    #[serde(default)]
    pub overrides: Vec<(String, String)>,
}

/// Manual entries that survived validation.
#[derive(Debug, Clone, Default)]
pub struct ManualOverrides {
    pub values: BTreeMap<RuleKey, Decimal>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Validate manual form entries. Blank values count as not supplied.
pub fn parse_overrides<I, K, V>(pairs: I, catalog: &CatalogDef) -> ManualOverrides
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut overrides = ManualOverrides::default();

    for (raw_key, raw_value) in pairs {
        let (raw_key, raw_value) = (raw_key.as_ref(), raw_value.as_ref().trim());
        if raw_value.is_empty() {
            continue;
        }

        let key = match RuleKey::from_form_key(raw_key) {
            Some(key) if key.is_known(catalog) => key,
            _ => {
                warn!(key = raw_key, "manual price for an unknown key ignored");
                overrides.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::UnknownOverride,
                    format!("'{}' is not a known pricing key, value ignored", raw_key),
                ));
                continue;
            }
        };

        match parse_decimal(raw_value) {
            Ok(cost) if !cost.is_sign_negative() || cost.is_zero() => {
                overrides.values.insert(key, cost);
            }
            _ => {
                warn!(key = raw_key, value = raw_value, "invalid manual price ignored");
                overrides.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::InvalidOverride,
                    format!("invalid price for '{}': '{}'", raw_key, raw_value),
                ));
            }
        }
    }

    overrides
}

/// Where a resolved cost came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostSource {
    Manual,
    Parsed,
    /// Inherited from the fallback source step or its default.
    Fallback,
    /// Nothing supplied; priced at zero.
    Unset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCost {
    pub key: RuleKey,
    pub cost: Decimal,
    pub source: CostSource,
}

/// Resolved costs for every process step and coating of a catalog.
///
/// Built fresh for each submission and passed by reference into the
/// pipeline; nothing about it is shared between runs.
#[derive(Debug, Clone)]
pub struct PricingRuleTable {
    costs: BTreeMap<RuleKey, Decimal>,
    entries: Vec<ResolvedCost>,
    diagnostics: Vec<Diagnostic>,
}

impl PricingRuleTable {
    /// Resolve every vocabulary entry: manual value, else parsed value,
    /// else zero. Zero-priced extension steps then inherit the source step.
    ///
    /// Fails with `NoPricingRules` when no supplied cost is non-zero.
    pub fn build(
        parsed: &ParsedRules,
        manual: &ManualOverrides,
        catalog: &CatalogDef,
    ) -> Result<Self, DeconError> {
        let mut entries = Vec::new();
        let mut any_supplied = false;

        let mut resolve = |key: RuleKey| {
            let (cost, source) = if let Some(cost) = manual.values.get(&key) {
                (*cost, CostSource::Manual)
            } else if let Some(cost) = parsed.explicit.get(&key) {
                (*cost, CostSource::Parsed)
            } else {
                (Decimal::ZERO, CostSource::Unset)
            };
            if !cost.is_zero() {
                any_supplied = true;
            }
            ResolvedCost { key, cost, source }
        };

        for process in &catalog.processes {
            for step in &process.steps {
                entries.push(resolve(RuleKey::process(process.name.as_str(), step.as_str())));
            }
        }
        for coating in &catalog.coatings {
            entries.push(resolve(RuleKey::coating(coating.as_str())));
        }

        if !any_supplied {
            warn!("no non-zero pricing rules provided");
            return Err(DeconError::NoPricingRules);
        }

        if let Some(ref fallback) = catalog.laserstep_fallback {
            let source_key = RuleKey::process(fallback.process.as_str(), fallback.source_step.as_str());
            let inherited = entries
                .iter()
                .find(|e| e.key == source_key)
                .map(|e| e.cost)
                .filter(|c| !c.is_zero())
                .unwrap_or(fallback.default_cost);

            for entry in entries.iter_mut() {
                let is_extension = matches!(
                    &entry.key,
                    RuleKey::Process { process, step } if catalog.fallback_for(process, step).is_some()
                );
                if is_extension && entry.cost.is_zero() {
                    debug!(key = %entry.key, cost = %inherited, "applied fallback price");
                    entry.cost = inherited;
                    entry.source = CostSource::Fallback;
                }
            }
        }

        let costs = entries
            .iter()
            .map(|e| (e.key.clone(), e.cost))
            .collect::<BTreeMap<_, _>>();

        let mut diagnostics = parsed.diagnostics.clone();
        diagnostics.extend(manual.diagnostics.iter().cloned());

        info!(
            entries = entries.len(),
            manual = manual.values.len(),
            parsed = parsed.explicit.len(),
            "pricing rule table built"
        );

        Ok(Self {
            costs,
            entries,
            diagnostics,
        })
    }

    /// Parse the rule text and manual entries of a submission and build.
    pub fn from_input(input: &PricingInput, catalog: &CatalogDef) -> Result<Self, DeconError> {
        let parsed = input
            .rule_text
            .as_deref()
            .map(|text| parse_rule_text(text, catalog))
            .unwrap_or_default();
        let manual = parse_overrides(input.overrides.iter().map(|(k, v)| (k, v)), catalog);
        Self::build(&parsed, &manual, catalog)
    }

    /// Resolved cost, or None when the key is outside the catalog.
    pub fn lookup(&self, key: &RuleKey) -> Option<Decimal> {
        self.costs.get(key).copied()
    }

    pub fn process_cost(&self, process: &str, step: &str) -> Option<Decimal> {
        self.lookup(&RuleKey::process(process, step))
    }

    pub fn coating_cost(&self, name: &str) -> Option<Decimal> {
        self.lookup(&RuleKey::coating(name))
    }

    /// All resolved costs in catalog order.
    pub fn entries(&self) -> &[ResolvedCost] {
        &self.entries
    }

    /// Rule text and manual entry diagnostics gathered while building.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::default_catalog;
    use rust_decimal_macros::dec;

    fn build(text: &str, overrides: &[(&str, &str)]) -> Result<PricingRuleTable, DeconError> {
        let input = PricingInput {
            rule_text: Some(text.to_string()),
            overrides: overrides
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        PricingRuleTable::from_input(&input, &default_catalog().unwrap())
    }

    #[test]
    fn test_extension_inherits_source_step() {
        let table = build("laserstep 1-20: 245", &[]).unwrap();
        assert_eq!(table.process_cost("LaserSTEP", "31-40"), Some(dec!(245)));
        assert_eq!(table.process_cost("LaserSTEP", "1-2"), Some(dec!(0)));
    }

    #[test]
    fn test_extension_uses_manual_source() {
        let table = build("chem single: 50", &[("LaserSTEP_1-20", "300")]).unwrap();
        assert_eq!(table.process_cost("LaserSTEP", "51-60"), Some(dec!(300)));
    }

    #[test]
    fn test_extension_default_when_source_zero() {
        let table = build("chem single: 50", &[]).unwrap();
        assert_eq!(table.process_cost("LaserSTEP", "21-30"), Some(dec!(245)));
        let entry = table
            .entries()
            .iter()
            .find(|e| e.key == RuleKey::process("LaserSTEP", "21-30"))
            .unwrap();
        assert_eq!(entry.source, CostSource::Fallback);
    }

    #[test]
    fn test_explicit_extension_kept() {
        let table = build("laserstep 1-20: 245\nlaserstep 21-30: 260", &[]).unwrap();
        assert_eq!(table.process_cost("LaserSTEP", "21-30"), Some(dec!(260)));
        assert_eq!(table.process_cost("LaserSTEP", "41-50"), Some(dec!(245)));
    }

    #[test]
    fn test_manual_wins_over_parsed() {
        let table = build("chem single: 50", &[("Chemetch_Single", "65")]).unwrap();
        assert_eq!(table.process_cost("Chemetch", "Single"), Some(dec!(65)));
    }

    #[test]
    fn test_blank_manual_keeps_parsed() {
        let table = build("coat nano wipe: 15", &[("Coating_Nano Wipe", "  ")]).unwrap();
        assert_eq!(table.coating_cost("Nano Wipe"), Some(dec!(15)));
    }

    #[test]
    fn test_invalid_manual_reported() {
        let table = build(
            "chem single: 50",
            &[("Chemetch_Double", "cheap"), ("Gold_Leaf", "5"), ("Milled_Quad", "-3")],
        )
        .unwrap();
        assert_eq!(table.process_cost("Chemetch", "Double"), Some(dec!(0)));
        let kinds: Vec<DiagnosticKind> = table.diagnostics().iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::InvalidOverride,
                DiagnosticKind::UnknownOverride,
                DiagnosticKind::InvalidOverride
            ]
        );
    }

    #[test]
    fn test_lookup_outside_vocabulary() {
        let table = build("chem single: 50", &[]).unwrap();
        assert_eq!(table.process_cost("Chemetch", "Quad"), None);
        assert_eq!(table.coating_cost("Gold Leaf"), None);
        assert_eq!(table.process_cost("LaserCut", "Single"), None);
    }

    #[test]
    fn test_all_zero_rejected() {
        assert!(matches!(build("", &[]), Err(DeconError::NoPricingRules)));
        assert!(matches!(
            build("chem single: 0\nnotes: none", &[("Coating_BluPrint", "0")]),
            Err(DeconError::NoPricingRules)
        ));
    }

    #[test]
    fn test_no_entry_is_negative() {
        let table = build("chem single: -10\nmill single: 20", &[("Chemetch_Double", "-1")]).unwrap();
        assert!(table.entries().iter().all(|e| !e.cost.is_sign_negative()));
    }

    #[test]
    fn test_fresh_table_per_submission() {
        let first = build("chem single: 50", &[]).unwrap();
        let second = build("mill single: 20", &[]).unwrap();
        assert_eq!(first.process_cost("Chemetch", "Single"), Some(dec!(50)));
        assert_eq!(second.process_cost("Chemetch", "Single"), Some(dec!(0)));
    }
}
