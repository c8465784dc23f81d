//! Rule repository loading and validation.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::info;

use super::document::{AdjustmentRuleDocument, IndustryDocument, KeywordRuleDocument, RuleDocument};
use super::error::ConfigurationError;
use super::matcher::{PhraseMatcher, normalize_text};
use super::types::{
    AccountType, AdjustmentCategory, AdjustmentRule, EbitdaComponent, IndustryTemplate,
    SuspiciousPatternThresholds,
};

const BUILTIN_RULES: &str = include_str!("default_rules.json");

const SCOPE_RULESET: &str = "ruleset";
const SCOPE_FALLBACK: &str = "fallback";
const SCOPE_COMMON: &str = "common";

/// Immutable, validated rule set.
///
/// Loaded once per run and passed by reference to every engine.
#[derive(Debug, Clone)]
pub struct RuleRepository {
    industries: BTreeMap<String, IndustryTemplate>,
    fallback_keywords: PhraseMatcher<AccountType>,
}

impl RuleRepository {
    /// Validates a parsed rule document and compiles it.
    pub fn from_document(doc: RuleDocument) -> Result<Self, ConfigurationError> {
        let fallback_docs = doc
            .fallback_keywords
            .ok_or_else(|| missing(SCOPE_RULESET, "fallback_keywords"))?;
        let industry_docs = doc
            .industries
            .ok_or_else(|| missing(SCOPE_RULESET, "industries"))?;
        if industry_docs.is_empty() {
            return Err(ConfigurationError::NoIndustries);
        }

        let fallback_keywords = compile_keywords(SCOPE_FALLBACK, &fallback_docs)?;
        let common_rules = doc
            .common_adjustment_rules
            .iter()
            .map(|rule| compile_rule(SCOPE_COMMON, rule))
            .collect::<Result<Vec<_>, _>>()?;

        let mut industries = BTreeMap::new();
        for (name, industry_doc) in industry_docs {
            let key = name.trim().to_ascii_lowercase();
            let template = compile_industry(&key, industry_doc, &common_rules)?;
            industries.insert(key, template);
        }

        info!(
            industries = industries.len(),
            fallback_keywords = fallback_keywords.len(),
            common_rules = common_rules.len(),
            "Rule repository loaded"
        );

        Ok(Self {
            industries,
            fallback_keywords,
        })
    }

    /// Parses a JSON rule document and compiles it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let doc: RuleDocument =
            serde_json::from_str(json).map_err(|e| ConfigurationError::Malformed(e.to_string()))?;
        Self::from_document(doc)
    }

    /// The ruleset shipped with the crate.
    ///
    /// Industries: `generic`, `saas_tech`, `manufacturing`, `project_finance`.
    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::from_json_str(BUILTIN_RULES)
    }

    /// Looks up an industry template. Names are case-insensitive.
    pub fn industry(&self, name: &str) -> Result<&IndustryTemplate, ConfigurationError> {
        self.industries
            .get(&name.trim().to_ascii_lowercase())
            .ok_or_else(|| ConfigurationError::UnknownIndustry(name.to_string()))
    }

    /// All industry templates, ordered by name.
    pub fn industries(&self) -> impl Iterator<Item = &IndustryTemplate> {
        self.industries.values()
    }

    /// Industry names, ordered.
    pub fn industry_names(&self) -> impl Iterator<Item = &str> {
        self.industries.keys().map(String::as_str)
    }

    /// The global keyword fallback table.
    #[must_use]
    pub fn fallback_keywords(&self) -> &PhraseMatcher<AccountType> {
        &self.fallback_keywords
    }
}

fn missing(scope: &str, section: &'static str) -> ConfigurationError {
    ConfigurationError::MissingSection {
        scope: scope.to_string(),
        section,
    }
}

fn compile_keywords(
    scope: &str,
    docs: &[KeywordRuleDocument],
) -> Result<PhraseMatcher<AccountType>, ConfigurationError> {
    let mut pairs = Vec::with_capacity(docs.len());
    for (index, doc) in docs.iter().enumerate() {
        let phrase = normalize_text(&doc.keyword);
        if phrase.is_empty() {
            return Err(ConfigurationError::BlankKeyword {
                scope: scope.to_string(),
                rule: format!("keyword #{}", index + 1),
            });
        }
        let account_type = AccountType::from_tag(&doc.account_type).ok_or_else(|| {
            ConfigurationError::UnknownAccountType {
                scope: scope.to_string(),
                rule: doc.keyword.clone(),
                tag: doc.account_type.clone(),
            }
        })?;
        pairs.push((phrase, account_type));
    }
    Ok(PhraseMatcher::new(pairs))
}

fn compile_rule(
    scope: &str,
    doc: &AdjustmentRuleDocument,
) -> Result<AdjustmentRule, ConfigurationError> {
    let name = doc.name.trim().to_string();
    if name.is_empty() {
        return Err(ConfigurationError::Malformed(format!(
            "adjustment rule without a name in {scope}"
        )));
    }

    let keywords: Vec<String> = doc.keywords.iter().map(|k| normalize_text(k)).collect();
    if keywords.is_empty() || keywords.iter().any(String::is_empty) {
        return Err(ConfigurationError::BlankKeyword {
            scope: scope.to_string(),
            rule: name,
        });
    }

    let category = match AdjustmentCategory::from_tag(&doc.category) {
        Some(AdjustmentCategory::NoAdjustment) | None => {
            return Err(ConfigurationError::UnknownAdjustmentCategory {
                rule: name,
                tag: doc.category.clone(),
            });
        }
        Some(category) => category,
    };

    let reclassify_to = match (category, doc.reclassify_to.as_deref()) {
        (AdjustmentCategory::Reclassification, None) => {
            return Err(ConfigurationError::MissingReclassificationTarget { rule: name });
        }
        (AdjustmentCategory::Reclassification, Some(tag)) => Some(
            EbitdaComponent::from_tag(tag).ok_or_else(|| ConfigurationError::UnknownComponent {
                rule: name.clone(),
                tag: tag.to_string(),
            })?,
        ),
        _ => None,
    };

    Ok(AdjustmentRule {
        name,
        keywords,
        category,
        is_recurring: doc.is_recurring,
        reclassify_to,
        reason: doc.reason.trim().to_string(),
    })
}

fn compile_industry(
    name: &str,
    doc: IndustryDocument,
    common_rules: &[AdjustmentRule],
) -> Result<IndustryTemplate, ConfigurationError> {
    let revenue = doc
        .revenue_accounts
        .ok_or_else(|| missing(name, "revenue_accounts"))?;
    let cogs = doc
        .cogs_accounts
        .ok_or_else(|| missing(name, "cogs_accounts"))?;
    let opex = doc
        .operating_expenses
        .ok_or_else(|| missing(name, "operating_expenses"))?;
    let rule_docs = doc
        .adjustment_rules
        .ok_or_else(|| missing(name, "adjustment_rules"))?;
    let thresholds = doc
        .suspicious_pattern_thresholds
        .ok_or_else(|| missing(name, "suspicious_pattern_thresholds"))?;

    let mut account_codes = BTreeMap::new();
    let mut account_names = BTreeMap::new();
    let sections = [
        (revenue, AccountType::Revenue),
        (cogs, AccountType::Cogs),
        (opex, AccountType::Opex),
    ];
    for (section, account_type) in sections {
        for (code, display_name) in section {
            let code = code.trim().to_string();
            if account_codes.insert(code.clone(), account_type).is_some() {
                return Err(ConfigurationError::DuplicateAccountCode {
                    industry: name.to_string(),
                    code,
                });
            }
            account_names.insert(code, display_name);
        }
    }

    // Overrides replace section mappings.
    for (code, tag) in doc.account_overrides {
        let account_type =
            AccountType::from_tag(&tag).ok_or_else(|| ConfigurationError::UnknownAccountType {
                scope: name.to_string(),
                rule: code.clone(),
                tag: tag.clone(),
            })?;
        account_codes.insert(code.trim().to_string(), account_type);
    }

    let keywords = compile_keywords(name, &doc.keywords)?;

    let mut adjustment_rules = common_rules.to_vec();
    for rule_doc in &rule_docs {
        adjustment_rules.push(compile_rule(name, rule_doc)?);
    }
    let mut seen = BTreeSet::new();
    for rule in &adjustment_rules {
        if !seen.insert(rule.name.as_str()) {
            return Err(ConfigurationError::DuplicateRule {
                industry: name.to_string(),
                rule: rule.name.clone(),
            });
        }
    }

    validate_thresholds(name, &thresholds)?;

    Ok(IndustryTemplate {
        name: name.to_string(),
        account_codes,
        account_names,
        keywords,
        adjustment_rules,
        thresholds: thresholds.normalized(),
    })
}

fn validate_thresholds(
    industry: &str,
    thresholds: &SuspiciousPatternThresholds,
) -> Result<(), ConfigurationError> {
    let invalid = |field: &'static str, reason: &str| ConfigurationError::InvalidThreshold {
        industry: industry.to_string(),
        field,
        reason: reason.to_string(),
    };

    if thresholds.round_number_threshold.is_sign_negative() {
        return Err(invalid("round_number_threshold", "must not be negative"));
    }
    if thresholds.round_number_unit <= Decimal::ZERO {
        return Err(invalid("round_number_unit", "must be positive"));
    }
    if thresholds.elimination_tolerance.is_sign_negative()
        || thresholds.elimination_tolerance >= Decimal::ONE
    {
        return Err(invalid("elimination_tolerance", "must be in [0, 1)"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const MINIMAL: &str = r#"{
        "fallback_keywords": [
            {"keyword": "Insurance", "account_type": "opex"},
            {"keyword": "property", "account_type": "asset"}
        ],
        "common_adjustment_rules": [
            {"name": "legal_fees", "keywords": ["legal fees"], "category": "non_recurring_addback"}
        ],
        "industries": {
            "Generic": {
                "revenue_accounts": {"4000": "Product Revenue"},
                "cogs_accounts": {"5000": "Cost of Goods Sold"},
                "operating_expenses": {"6000": "Salaries"},
                "account_overrides": {"6900": "depreciation"},
                "adjustment_rules": [
                    {"name": "swap", "keywords": ["swap breakage"], "category": "reclassification", "reclassify_to": "interest"}
                ],
                "suspicious_pattern_thresholds": {}
            }
        }
    }"#;

    fn doc() -> RuleDocument {
        serde_json::from_str(MINIMAL).unwrap()
    }

    #[test]
    fn test_minimal_document_loads() {
        let repo = RuleRepository::from_document(doc()).unwrap();
        let generic = repo.industry("GENERIC").unwrap();

        assert_eq!(generic.code_type("4000"), Some(AccountType::Revenue));
        assert_eq!(generic.code_type(" 6900 "), Some(AccountType::Depreciation));
        assert_eq!(generic.account_name("5000"), Some("Cost of Goods Sold"));
        assert_eq!(generic.adjustment_rules.len(), 2);
        assert_eq!(generic.adjustment_rules[0].name, "legal_fees");
        assert_eq!(
            generic.adjustment_rules[1].reclassify_to,
            Some(EbitdaComponent::Interest)
        );
        assert_eq!(generic.thresholds, SuspiciousPatternThresholds::default());
        assert_eq!(repo.fallback_keywords().len(), 2);
        assert_eq!(repo.industry_names().collect::<Vec<_>>(), vec!["generic"]);
    }

    #[test]
    fn test_unknown_industry() {
        let repo = RuleRepository::from_document(doc()).unwrap();
        let err = repo.industry("retail").unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_INDUSTRY");
    }

    #[test]
    fn test_missing_section_names_industry() {
        let mut doc = doc();
        if let Some(industries) = doc.industries.as_mut() {
            if let Some(generic) = industries.get_mut("Generic") {
                generic.cogs_accounts = None;
            }
        }
        let err = RuleRepository::from_document(doc).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MissingSection {
                scope: "generic".to_string(),
                section: "cogs_accounts",
            }
        );
    }

    #[test]
    fn test_missing_fallback_section() {
        let mut doc = doc();
        doc.fallback_keywords = None;
        let err = RuleRepository::from_document(doc).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_SECTION");
    }

    #[test]
    fn test_empty_industries() {
        let mut doc = doc();
        doc.industries = Some(BTreeMap::new());
        assert_eq!(
            RuleRepository::from_document(doc).unwrap_err(),
            ConfigurationError::NoIndustries
        );
    }

    #[test]
    fn test_unknown_account_type_tag() {
        let json = MINIMAL.replace(r#""account_type": "asset""#, r#""account_type": "fixed_asset""#);
        let err = RuleRepository::from_json_str(&json).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownAccountType {
                scope: "fallback".to_string(),
                rule: "property".to_string(),
                tag: "fixed_asset".to_string(),
            }
        );
    }

    #[test]
    fn test_reclassification_without_target() {
        let json = MINIMAL.replace(r#", "reclassify_to": "interest""#, "");
        let err = RuleRepository::from_json_str(&json).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MissingReclassificationTarget {
                rule: "swap".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_category() {
        let json = MINIMAL.replace("non_recurring_addback", "one_off");
        let err = RuleRepository::from_json_str(&json).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_ADJUSTMENT_CATEGORY");

        let json = MINIMAL.replace("non_recurring_addback", "none");
        let err = RuleRepository::from_json_str(&json).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_ADJUSTMENT_CATEGORY");
    }

    #[test]
    fn test_blank_keyword() {
        let json = MINIMAL.replace(r#"["legal fees"]"#, r#"["legal fees", " -- "]"#);
        let err = RuleRepository::from_json_str(&json).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::BlankKeyword {
                scope: "common".to_string(),
                rule: "legal_fees".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_account_code() {
        let json = MINIMAL.replace(r#"{"6000": "Salaries"}"#, r#"{"4000": "Salaries"}"#);
        let err = RuleRepository::from_json_str(&json).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DuplicateAccountCode {
                industry: "generic".to_string(),
                code: "4000".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_rule_name() {
        let json = MINIMAL.replace(r#""name": "swap""#, r#""name": "legal_fees""#);
        let err = RuleRepository::from_json_str(&json).unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_RULE");
    }

    #[test]
    fn test_invalid_tolerance() {
        let json = MINIMAL.replace(
            r#""suspicious_pattern_thresholds": {}"#,
            r#""suspicious_pattern_thresholds": {"elimination_tolerance": "1.5"}"#,
        );
        let err = RuleRepository::from_json_str(&json).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_THRESHOLD");
    }

    #[test]
    fn test_malformed_json() {
        let err = RuleRepository::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigurationError::Malformed(_)));
    }

    #[test]
    fn test_builtin_ruleset() {
        let repo = RuleRepository::builtin().unwrap();
        let names: Vec<_> = repo.industry_names().collect();
        assert_eq!(
            names,
            vec!["generic", "manufacturing", "project_finance", "saas_tech"]
        );

        let pf = repo.industry("project_finance").unwrap();
        let swap = pf
            .adjustment_rules
            .iter()
            .find(|r| r.category == AdjustmentCategory::Reclassification)
            .unwrap();
        assert_eq!(swap.reclassify_to, Some(EbitdaComponent::Interest));
        assert_eq!(pf.thresholds.elimination_tolerance, dec!(0.005));
    }
}
