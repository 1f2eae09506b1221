pub mod keys;
pub mod parser;
pub mod table;

pub use keys::RuleKey;
pub use parser::{parse_rule_text, render_rule_text, ParsedRules, RuleLine};
pub use table::{parse_overrides, CostSource, PricingInput, PricingRuleTable, ResolvedCost};
