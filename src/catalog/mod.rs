//! Per-category search configuration.
//!
//! The catalog is loaded once (from JSON or the compiled-in defaults) and
//! injected into the orchestrator as an immutable, shareable table. It is
//! never a process-wide singleton; concurrent search calls share it read-only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TalentSearchError};
use crate::profiles::FilterSpec;

/// Evaluation criteria for one category, used by the reranker prompt and the
/// quality heuristic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCriteria {
    /// Non-negotiable qualifications, e.g. "JD degree".
    #[serde(default)]
    pub hard: Vec<String>,
    /// Nice-to-have signals, e.g. "IRS audits".
    #[serde(default)]
    pub soft: Vec<String>,
}

impl CategoryCriteria {
    /// Generic fallback criteria for categories absent from the catalog.
    pub fn generic() -> Self {
        Self {
            hard: vec!["relevant professional experience".to_string()],
            soft: vec![
                "relevant credentials".to_string(),
                "domain expertise".to_string(),
            ],
        }
    }

    /// All criteria terms, hard then soft, for keyword-overlap scoring.
    pub fn all_terms(&self) -> impl Iterator<Item = &str> {
        self.hard.iter().chain(self.soft.iter()).map(String::as_str)
    }
}

/// Full configuration for one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Domain-specific query expansions for vector retrieval.
    #[serde(default)]
    pub domain_queries: Vec<String>,
    /// Keywords for BM25 text retrieval.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub filters: FilterSpec,
    #[serde(default)]
    pub criteria: CategoryCriteria,
}

/// Immutable category → configuration table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryCatalog {
    categories: HashMap<String, CategoryConfig>,
}

impl CategoryCatalog {
    /// Parse a catalog from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            TalentSearchError::Configuration(format!("invalid category catalog: {e}"))
        })
    }

    /// Normalize a category identifier to its catalog key:
    /// `"tax_lawyer.yml"` → `"tax lawyer"`.
    fn normalize(category: &str) -> String {
        category.replace('_', " ").replace(".yml", "")
    }

    /// Look up a category's configuration, if present.
    pub fn get(&self, category: &str) -> Option<&CategoryConfig> {
        self.categories.get(&Self::normalize(category))
    }

    /// Domain query expansions for a category; empty when unconfigured.
    pub fn domain_queries(&self, category: &str) -> Vec<String> {
        self.get(category)
            .map(|c| c.domain_queries.clone())
            .unwrap_or_default()
    }

    /// BM25 keywords for a category, falling back to the tokenized
    /// category name so text retrieval always has at least one keyword.
    pub fn keywords(&self, category: &str) -> Vec<String> {
        let configured = self.get(category).map(|c| c.keywords.clone());
        match configured {
            Some(keywords) if !keywords.is_empty() => keywords,
            _ => Self::normalize(category)
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Filter spec for a category; empty (no-op) when unconfigured.
    pub fn filters(&self, category: &str) -> FilterSpec {
        self.get(category).map(|c| c.filters.clone()).unwrap_or_default()
    }

    /// Evaluation criteria for a category, with a generic fallback.
    pub fn criteria(&self, category: &str) -> CategoryCriteria {
        self.get(category)
            .map(|c| c.criteria.clone())
            .filter(|c| !c.hard.is_empty() || !c.soft.is_empty())
            .unwrap_or_else(CategoryCriteria::generic)
    }

    /// Insert or replace a category's configuration.
    pub fn insert(&mut self, category: &str, config: CategoryConfig) {
        self.categories.insert(Self::normalize(category), config);
    }

    /// The compiled-in catalog covering the standard job categories.
    pub fn builtin() -> Self {
        let mut catalog = Self::default();

        catalog.insert(
            "tax_lawyer",
            CategoryConfig {
                domain_queries: vec![
                    "JD attorney tax lawyer law school IRS".to_string(),
                    "juris doctor tax attorney legal practice".to_string(),
                    "tax lawyer JD degree law school attorney".to_string(),
                ],
                keywords: vec![
                    "JD".to_string(),
                    "attorney".to_string(),
                    "tax".to_string(),
                    "IRS".to_string(),
                ],
                filters: FilterSpec {
                    must_have: vec!["law".to_string()],
                    exclude: vec![],
                    preferred: vec![
                        "corporate tax structuring".to_string(),
                        "IRS audits".to_string(),
                        "legal opinions".to_string(),
                    ],
                },
                criteria: CategoryCriteria {
                    hard: vec![
                        "JD degree".to_string(),
                        "accredited U.S. law school".to_string(),
                        "3+ years legal practice".to_string(),
                    ],
                    soft: vec![
                        "corporate tax structuring".to_string(),
                        "IRS audits".to_string(),
                        "legal opinions".to_string(),
                        "federal tax code".to_string(),
                    ],
                },
            },
        );

        catalog.insert(
            "junior_corporate_lawyer",
            CategoryConfig {
                domain_queries: vec![
                    "JD attorney corporate lawyer M&A law school".to_string(),
                    "corporate attorney JD mergers acquisitions legal".to_string(),
                ],
                keywords: vec![
                    "corporate".to_string(),
                    "attorney".to_string(),
                    "M&A".to_string(),
                ],
                filters: FilterSpec {
                    must_have: vec!["law".to_string()],
                    exclude: vec![],
                    preferred: vec![
                        "M&A transactions".to_string(),
                        "due diligence".to_string(),
                        "contract negotiations".to_string(),
                    ],
                },
                criteria: CategoryCriteria {
                    hard: vec![
                        "2-4 years corporate lawyer".to_string(),
                        "leading law firm".to_string(),
                        "reputed law school".to_string(),
                    ],
                    soft: vec![
                        "M&A transactions".to_string(),
                        "due diligence".to_string(),
                        "contract negotiations".to_string(),
                        "international business law".to_string(),
                    ],
                },
            },
        );

        catalog.insert(
            "radiology",
            CategoryConfig {
                domain_queries: vec![
                    "MD radiologist diagnostic imaging board certified".to_string(),
                    "radiologist CT MRI X-ray ultrasound physician".to_string(),
                ],
                keywords: vec![
                    "radiologist".to_string(),
                    "MD".to_string(),
                    "imaging".to_string(),
                ],
                filters: FilterSpec {
                    must_have: vec!["radiolog".to_string()],
                    exclude: vec![],
                    preferred: vec![
                        "board certification".to_string(),
                        "CT".to_string(),
                        "MRI".to_string(),
                    ],
                },
                criteria: CategoryCriteria {
                    hard: vec![
                        "MD degree".to_string(),
                        "medical school U.S. or India".to_string(),
                    ],
                    soft: vec![
                        "board certification ABR FRCR".to_string(),
                        "3+ years experience".to_string(),
                        "CT MRI X-ray ultrasound".to_string(),
                        "AI medical imaging".to_string(),
                    ],
                },
            },
        );

        catalog.insert(
            "doctors_md",
            CategoryConfig {
                domain_queries: vec![
                    "MD physician doctor medical practice clinical".to_string(),
                    "physician MD clinical practice family medicine".to_string(),
                    "doctor MD general practitioner primary care".to_string(),
                ],
                keywords: vec![
                    "MD".to_string(),
                    "physician".to_string(),
                    "clinical".to_string(),
                ],
                filters: FilterSpec {
                    must_have: vec!["md".to_string()],
                    exclude: vec![],
                    preferred: vec![
                        "EHR".to_string(),
                        "telemedicine".to_string(),
                        "chronic care".to_string(),
                    ],
                },
                criteria: CategoryCriteria {
                    hard: vec![
                        "MD degree top U.S. medical school".to_string(),
                        "2+ years clinical practice U.S.".to_string(),
                        "General Practitioner GP".to_string(),
                    ],
                    soft: vec![
                        "EHR systems".to_string(),
                        "telemedicine".to_string(),
                        "outpatient diagnostics".to_string(),
                        "chronic care management".to_string(),
                    ],
                },
            },
        );

        catalog.insert(
            "biology_expert",
            CategoryConfig {
                domain_queries: vec![
                    "PhD biology molecular genetics research university".to_string(),
                    "doctorate biological sciences cell biology research".to_string(),
                ],
                keywords: vec![
                    "PhD".to_string(),
                    "biology".to_string(),
                    "research".to_string(),
                ],
                filters: FilterSpec {
                    must_have: vec!["biolog".to_string()],
                    exclude: vec![],
                    preferred: vec![
                        "publications".to_string(),
                        "CRISPR".to_string(),
                        "genetics".to_string(),
                    ],
                },
                criteria: CategoryCriteria {
                    hard: vec![
                        "PhD Biology top U.S. university".to_string(),
                        "undergraduate U.S. U.K. Canada".to_string(),
                    ],
                    soft: vec![
                        "molecular biology genetics".to_string(),
                        "peer-reviewed publications".to_string(),
                        "CRISPR PCR sequencing".to_string(),
                        "experimental design".to_string(),
                    ],
                },
            },
        );

        catalog.insert(
            "anthropology",
            CategoryConfig {
                domain_queries: vec![
                    "PhD anthropology sociology ethnographic fieldwork".to_string(),
                ],
                keywords: vec![
                    "anthropology".to_string(),
                    "PhD".to_string(),
                    "ethnographic".to_string(),
                ],
                filters: FilterSpec::default(),
                criteria: CategoryCriteria {
                    hard: vec![
                        "PhD sociology anthropology economics".to_string(),
                        "PhD program started within 3 years".to_string(),
                    ],
                    soft: vec![
                        "ethnographic methods".to_string(),
                        "fieldwork case studies".to_string(),
                        "academic publications".to_string(),
                    ],
                },
            },
        );

        catalog.insert(
            "mathematics_phd",
            CategoryConfig {
                domain_queries: vec![
                    "PhD mathematics mathematical research university".to_string(),
                    "PhD mathematician statistics research university".to_string(),
                ],
                keywords: vec![
                    "mathematics".to_string(),
                    "PhD".to_string(),
                    "statistics".to_string(),
                ],
                filters: FilterSpec {
                    must_have: vec!["math".to_string()],
                    exclude: vec![],
                    preferred: vec![
                        "publications".to_string(),
                        "mathematical modeling".to_string(),
                    ],
                },
                criteria: CategoryCriteria {
                    hard: vec![
                        "PhD Mathematics Statistics top U.S. university".to_string(),
                        "undergraduate U.S. U.K. Canada".to_string(),
                    ],
                    soft: vec![
                        "peer-reviewed publications".to_string(),
                        "mathematical modeling".to_string(),
                        "proof-based reasoning".to_string(),
                    ],
                },
            },
        );

        catalog.insert(
            "quantitative_finance",
            CategoryConfig {
                domain_queries: vec![
                    "MBA finance quantitative financial modeling".to_string(),
                    "quantitative finance MBA risk modeling investment".to_string(),
                ],
                keywords: vec![
                    "quantitative".to_string(),
                    "finance".to_string(),
                    "MBA".to_string(),
                ],
                filters: FilterSpec {
                    must_have: vec!["financ".to_string()],
                    exclude: vec![],
                    preferred: vec![
                        "portfolio optimization".to_string(),
                        "derivatives".to_string(),
                        "Python".to_string(),
                    ],
                },
                criteria: CategoryCriteria {
                    hard: vec![
                        "MBA Prestigious U.S. university M7".to_string(),
                        "3+ years quantitative finance".to_string(),
                        "risk modeling algorithmic trading".to_string(),
                    ],
                    soft: vec![
                        "portfolio optimization".to_string(),
                        "derivatives pricing".to_string(),
                        "Python QuantLib".to_string(),
                    ],
                },
            },
        );

        catalog.insert(
            "bankers",
            CategoryConfig {
                domain_queries: vec![
                    "MBA investment banking M&A advisory healthcare".to_string(),
                ],
                keywords: vec![
                    "banking".to_string(),
                    "MBA".to_string(),
                    "M&A".to_string(),
                ],
                filters: FilterSpec::default(),
                criteria: CategoryCriteria {
                    hard: vec![
                        "MBA U.S. university".to_string(),
                        "2+ years investment banking".to_string(),
                        "corporate finance M&A advisory".to_string(),
                    ],
                    soft: vec![
                        "healthcare investment banking".to_string(),
                        "private equity".to_string(),
                        "healthcare M&A".to_string(),
                    ],
                },
            },
        );

        catalog.insert(
            "mechanical_engineers",
            CategoryConfig {
                domain_queries: vec![
                    "mechanical engineering degree CAD product development".to_string(),
                ],
                keywords: vec![
                    "mechanical".to_string(),
                    "engineering".to_string(),
                    "CAD".to_string(),
                ],
                filters: FilterSpec {
                    must_have: vec!["engineer".to_string()],
                    exclude: vec![],
                    preferred: vec![
                        "SolidWorks".to_string(),
                        "ANSYS".to_string(),
                        "product development".to_string(),
                    ],
                },
                criteria: CategoryCriteria {
                    hard: vec![
                        "Higher degree Mechanical Engineering".to_string(),
                        "3+ years professional experience".to_string(),
                        "mechanical design product development".to_string(),
                    ],
                    soft: vec![
                        "CAD tools SolidWorks AutoCAD".to_string(),
                        "ANSYS COMSOL simulation".to_string(),
                        "thermal systems fluid dynamics".to_string(),
                    ],
                },
            },
        );

        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_standard_categories() {
        let catalog = CategoryCatalog::builtin();
        assert!(catalog.get("tax_lawyer").is_some());
        assert!(catalog.get("doctors_md.yml").is_some());
        assert!(catalog.get("mechanical engineers").is_some());
    }

    #[test]
    fn test_lookup_normalizes_category_identifier() {
        let catalog = CategoryCatalog::builtin();
        let a = catalog.get("tax_lawyer.yml").unwrap();
        let b = catalog.get("tax lawyer").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_keywords_fall_back_to_category_tokens() {
        let catalog = CategoryCatalog::builtin();
        let keywords = catalog.keywords("underwater_basket_weaver.yml");
        assert_eq!(keywords, vec!["underwater", "basket", "weaver"]);
    }

    #[test]
    fn test_filters_default_to_noop_for_unknown_category() {
        let catalog = CategoryCatalog::builtin();
        assert!(catalog.filters("unknown_category").is_empty());
    }

    #[test]
    fn test_criteria_fall_back_to_generic() {
        let catalog = CategoryCatalog::builtin();
        let criteria = catalog.criteria("unknown_category");
        assert_eq!(criteria, CategoryCriteria::generic());
    }

    #[test]
    fn test_domain_queries_empty_for_unknown_category() {
        let catalog = CategoryCatalog::builtin();
        assert!(catalog.domain_queries("unknown_category").is_empty());
    }

    #[test]
    fn test_from_json_roundtrip() {
        let json = r#"{
            "categories": {
                "test category": {
                    "domain_queries": ["expanded query"],
                    "keywords": ["kw1", "kw2"],
                    "filters": { "must_have": ["req"], "preferred": ["nice"] },
                    "criteria": { "hard": ["h1"], "soft": ["s1"] }
                }
            }
        }"#;
        let catalog = CategoryCatalog::from_json(json).unwrap();
        let config = catalog.get("test_category.yml").unwrap();
        assert_eq!(config.domain_queries, vec!["expanded query"]);
        assert_eq!(config.keywords, vec!["kw1", "kw2"]);
        assert_eq!(config.filters.must_have, vec!["req"]);
        assert_eq!(config.criteria.soft, vec!["s1"]);
    }

    #[test]
    fn test_from_json_invalid_is_configuration_error() {
        let err = CategoryCatalog::from_json("not json").unwrap_err();
        assert!(matches!(
            err,
            crate::errors::TalentSearchError::Configuration(_)
        ));
    }
}
