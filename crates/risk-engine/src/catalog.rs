//! Risk pattern catalog
//!
//! A catalog is an ordered list of risk categories, each with a display name,
//! a severity tier, a plain-language explanation and one or more
//! case-insensitive regex patterns. Catalogs are validated once when they are
//! built and are read-only afterwards.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer, Serialize};
use shared_types::Severity;

use crate::error::CatalogError;

/// Binding arbitration / jury trial waiver phrasings
pub const BINDING_ARBITRATION_PATTERNS: &[&str] = &[
    r"binding arbitration",
    r"arbitration clause",
    r"waive.*right.*jury trial",
    r"resolve.*disputes.*arbitration",
    r"mandatory arbitration",
];

/// No-refund phrasings
pub const NON_REFUNDABLE_PATTERNS: &[&str] = &[
    r"non-refundable",
    r"no refunds?",
    r"all sales final",
    r"payments?.*not.*refund",
    r"fees are final",
];

/// Automatic renewal / extension phrasings
pub const AUTOMATIC_RENEWAL_PATTERNS: &[&str] = &[
    r"automatic.*renewal",
    r"auto.*renew",
    r"automatically.*extend",
    r"renew.*unless.*cancel",
    r"auto-renewal",
];

/// Liability disclaimers and hold-harmless phrasings
pub const LIABILITY_WAIVER_PATTERNS: &[&str] = &[
    r"waive.*liability",
    r"not.*liable.*damages",
    r"disclaim.*warranties",
    r"use.*at.*own.*risk",
    r"hold harmless",
];

/// Personal data collection and sharing phrasings
pub const DATA_COLLECTION_PATTERNS: &[&str] = &[
    r"collect.*personal.*data",
    r"share.*information.*third.*parties",
    r"sell.*data",
    r"tracking.*cookies",
    r"personal information",
];

/// One-sided termination and modification phrasings
pub const TERMINATION_RIGHTS_PATTERNS: &[&str] = &[
    r"terminate.*at.*will",
    r"suspend.*account.*any.*time",
    r"discontinue.*service.*notice",
    r"modify.*terms.*without.*notice",
];

/// Uncompiled description of a risk category, as written in code or in a
/// JSON catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCategoryDefinition {
    pub key: String,
    #[serde(rename = "type")]
    pub display_type: String,
    #[serde(deserialize_with = "deserialize_severity")]
    pub severity: Severity,
    pub explanation: String,
    pub patterns: Vec<String>,
}

impl RiskCategoryDefinition {
    pub fn new(
        key: &str,
        display_type: &str,
        severity: Severity,
        explanation: &str,
        patterns: &[&str],
    ) -> Self {
        Self {
            key: key.to_string(),
            display_type: display_type.to_string(),
            severity,
            explanation: explanation.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

fn deserialize_severity<'de, D>(deserializer: D) -> Result<Severity, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

/// The six canonical categories in their canonical order
pub fn standard_definitions() -> Vec<RiskCategoryDefinition> {
    vec![
        RiskCategoryDefinition::new(
            "binding_arbitration",
            "Binding Arbitration",
            Severity::High,
            "You may be giving up your right to sue in court and must resolve disputes through arbitration.",
            BINDING_ARBITRATION_PATTERNS,
        ),
        RiskCategoryDefinition::new(
            "non_refundable",
            "Non-refundable",
            Severity::Medium,
            "You may not be able to get your money back under any circumstances.",
            NON_REFUNDABLE_PATTERNS,
        ),
        RiskCategoryDefinition::new(
            "automatic_renewal",
            "Auto-renewal",
            Severity::Medium,
            "The contract will automatically renew unless you actively cancel it.",
            AUTOMATIC_RENEWAL_PATTERNS,
        ),
        RiskCategoryDefinition::new(
            "liability_waiver",
            "Liability Waiver",
            Severity::High,
            "The company may not be responsible for damages or problems that occur.",
            LIABILITY_WAIVER_PATTERNS,
        ),
        RiskCategoryDefinition::new(
            "data_collection",
            "Data Collection",
            Severity::Medium,
            "Your personal information may be collected, stored, or shared with other companies.",
            DATA_COLLECTION_PATTERNS,
        ),
        RiskCategoryDefinition::new(
            "termination_rights",
            "Unfair Termination",
            Severity::High,
            "The company can end the agreement or change terms with little or no notice.",
            TERMINATION_RIGHTS_PATTERNS,
        ),
    ]
}

/// A validated category with its patterns compiled
#[derive(Debug, Clone)]
pub struct RiskCategory {
    definition: RiskCategoryDefinition,
    compiled: Vec<Regex>,
}

impl RiskCategory {
    fn compile(definition: RiskCategoryDefinition) -> Result<Self, CatalogError> {
        if definition.key.trim().is_empty() {
            return Err(CatalogError::EmptyKey);
        }
        if definition.patterns.is_empty() {
            return Err(CatalogError::NoPatterns(definition.key));
        }

        let compiled = definition
            .patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| CatalogError::InvalidPattern {
                        category: definition.key.clone(),
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            definition,
            compiled,
        })
    }

    pub fn key(&self) -> &str {
        &self.definition.key
    }

    pub fn display_type(&self) -> &str {
        &self.definition.display_type
    }

    pub fn severity(&self) -> Severity {
        self.definition.severity
    }

    pub fn explanation(&self) -> &str {
        &self.definition.explanation
    }

    /// Compiled patterns in declaration order
    pub fn patterns(&self) -> &[Regex] {
        &self.compiled
    }
}

/// Ordered, immutable set of risk categories
#[derive(Debug, Clone)]
pub struct RiskCatalog {
    categories: Vec<RiskCategory>,
}

impl RiskCatalog {
    /// Validate and compile a catalog. Category order is preserved.
    pub fn new(definitions: Vec<RiskCategoryDefinition>) -> Result<Self, CatalogError> {
        let mut categories: Vec<RiskCategory> = Vec::with_capacity(definitions.len());

        for definition in definitions {
            if categories.iter().any(|c| c.key() == definition.key) {
                return Err(CatalogError::DuplicateKey(definition.key));
            }
            categories.push(RiskCategory::compile(definition)?);
        }

        Ok(Self { categories })
    }

    /// The built-in catalog of the six canonical categories
    pub fn standard() -> Result<Self, CatalogError> {
        Self::new(standard_definitions())
    }

    /// Parse a JSON array of category definitions
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<RiskCategoryDefinition> = serde_json::from_str(json)?;
        Self::new(definitions)
    }

    /// Append the categories of `other` after this catalog's own.
    /// Keys must stay unique across both.
    pub fn extend(self, other: RiskCatalog) -> Result<Self, CatalogError> {
        let definitions = self
            .categories
            .into_iter()
            .chain(other.categories)
            .map(|c| c.definition)
            .collect();
        Self::new(definitions)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RiskCategory> {
        self.categories.iter()
    }

    pub fn get(&self, key: &str) -> Option<&RiskCategory> {
        self.categories.iter().find(|c| c.key() == key)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of patterns across all categories; an upper bound on the
    /// number of findings a single document can produce.
    pub fn pattern_count(&self) -> usize {
        self.categories.iter().map(|c| c.compiled.len()).sum()
    }
}
