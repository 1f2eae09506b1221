use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::schema::CatalogDef;

/// Form-key prefix used for coating entries ("Coating_Nano Wipe").
pub const COATING_PREFIX: &str = "Coating";

/// Address of a single cost in the pricing rule table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum RuleKey {
    Process { process: String, step: String },
    Coating { name: String },
}

impl RuleKey {
    pub fn process(process: impl Into<String>, step: impl Into<String>) -> Self {
        RuleKey::Process {
            process: process.into(),
            step: step.into(),
        }
    }

    pub fn coating(name: impl Into<String>) -> Self {
        RuleKey::Coating { name: name.into() }
    }

    /// Parse a manual-entry form key: "<process>_<step>" or "Coating_<name>".
    pub fn from_form_key(key: &str) -> Option<RuleKey> {
        let (head, tail) = key.trim().split_once('_')?;
        let (head, tail) = (head.trim(), tail.trim());
        if head.is_empty() || tail.is_empty() {
            return None;
        }
        if head == COATING_PREFIX {
            Some(RuleKey::coating(tail))
        } else {
            Some(RuleKey::process(head, tail))
        }
    }

    pub fn form_key(&self) -> String {
        match self {
            RuleKey::Process { process, step } => format!("{process}_{step}"),
            RuleKey::Coating { name } => format!("{COATING_PREFIX}_{name}"),
        }
    }

    /// Whether the key names an entry of the catalog's vocabulary.
    pub fn is_known(&self, catalog: &CatalogDef) -> bool {
        match self {
            RuleKey::Process { process, step } => catalog.has_step(process, step),
            RuleKey::Coating { name } => catalog.has_coating(name),
        }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKey::Process { process, step } => write!(f, "{process} / {step}"),
            RuleKey::Coating { name } => write!(f, "Coating / {name}"),
        }
    }
}
