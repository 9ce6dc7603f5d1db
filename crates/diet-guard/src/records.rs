//! Record validation
//!
//! Rows arrive from the rule, override and household tables as loosely
//! typed records. They are parsed into the core types here and nowhere
//! else; the evaluator only ever sees validated values.

use diet_guard_core::{
    codes, EvaluationMode, ExcludeOverride, GuardRule, HouseholdAvoidRule, HouseholdMatchMode,
    HouseholdRuleType, IngredientMatcher, MealCheck, MealCheckKind, RuleCheck, RuleSource,
    ADMIN_RULE_PRIORITY, HOUSEHOLD_RULE_PRIORITY,
};
use diet_guard_rules::normalize_term;
use diet_guard_types::ConstraintType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A record that failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record {record}: missing field `{field}`")]
    MissingField { record: String, field: &'static str },

    #[error("record {record}: invalid value {value:?} for `{field}`")]
    InvalidValue {
        record: String,
        field: &'static str,
        value: String,
    },

    #[error("record {record}: empty match value")]
    EmptyMatchValue { record: String },
}

fn required<'a>(
    record: &str,
    field: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str, RecordError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RecordError::MissingField {
            record: record.to_string(),
            field,
        })
}

fn invalid(record: &str, field: &'static str, value: &str) -> RecordError {
    RecordError::InvalidValue {
        record: record.to_string(),
        field,
        value: value.to_string(),
    }
}

fn record_id(id: &Option<String>) -> Result<String, RecordError> {
    required("<unknown>", "id", id).map(str::to_string)
}

fn parse_strictness(record: &str, raw: Option<&str>) -> Result<ConstraintType, RecordError> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("hard") => Ok(ConstraintType::Hard),
        Some("soft") => Ok(ConstraintType::Soft),
        Some(other) => Err(invalid(record, "strictness", other)),
    }
}

/// Admin rule table row.
///
/// `match_mode` is `term`, `nevo_code` or `tag`; tag rules are checked
/// against meal tags instead of ingredients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawGuardRuleRow {
    pub id: Option<String>,
    pub match_mode: Option<String>,
    pub match_value: Option<String>,
    pub strictness: Option<String>,
    pub priority: Option<i64>,
    pub rule_code: Option<String>,
    pub label: Option<String>,
    pub category: Option<String>,
    pub modes: Vec<String>,
    pub is_active: Option<bool>,
}

impl RawGuardRuleRow {
    pub fn is_active(&self) -> bool {
        self.is_active.unwrap_or(true)
    }

    pub fn validate(&self) -> Result<GuardRule, RecordError> {
        let id = record_id(&self.id)?;
        let value = self
            .match_value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| RecordError::EmptyMatchValue { record: id.clone() })?;
        let mode = required(&id, "match_mode", &self.match_mode)?;

        let check = match mode.to_ascii_lowercase().as_str() {
            "term" => RuleCheck::Ingredient(IngredientMatcher::terms([normalize_term(value)])),
            "nevo_code" => RuleCheck::Ingredient(IngredientMatcher::canonical_id(value)),
            "tag" => RuleCheck::Meal(MealCheck {
                slot: None,
                kind: MealCheckKind::ForbiddenTags {
                    tags: vec![normalize_term(value)],
                },
            }),
            other => return Err(invalid(&id, "match_mode", other)),
        };

        let strictness = parse_strictness(&id, self.strictness.as_deref())?;
        let priority = match self.priority {
            None => ADMIN_RULE_PRIORITY,
            // Household rules always rank first.
            Some(p) => u32::try_from(p)
                .ok()
                .filter(|p| *p < HOUSEHOLD_RULE_PRIORITY)
                .ok_or_else(|| invalid(&id, "priority", &p.to_string()))?,
        };
        let modes = self
            .modes
            .iter()
            .map(|m| EvaluationMode::parse(m).ok_or_else(|| invalid(&id, "modes", m)))
            .collect::<Result<Vec<_>, _>>()?;

        let code = self
            .rule_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(codes::FORBIDDEN_INGREDIENT)
            .to_string();
        let label = self
            .label
            .clone()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| format!("Not allowed: {value}"));

        let mut rule = GuardRule::new(
            format!("admin:{id}"),
            RuleSource::Admin,
            strictness,
            priority,
            check,
            code,
            label,
        )
        .with_modes(modes);
        if let Some(category) = self.category.as_deref().filter(|c| !c.trim().is_empty()) {
            rule = rule.with_category(category.trim());
        }
        Ok(rule)
    }
}

impl TryFrom<&RawGuardRuleRow> for GuardRule {
    type Error = RecordError;

    fn try_from(row: &RawGuardRuleRow) -> Result<Self, Self::Error> {
        row.validate()
    }
}

/// Override table row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawOverrideRow {
    pub id: Option<String>,
    pub forbidden_term: Option<String>,
    pub exclude_if_contains: Vec<String>,
    pub is_active: Option<bool>,
}

impl RawOverrideRow {
    pub fn validate(&self) -> Result<ExcludeOverride, RecordError> {
        let id = record_id(&self.id)?;
        let term = required(&id, "forbidden_term", &self.forbidden_term)?;
        let excludes: Vec<&str> = self
            .exclude_if_contains
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .collect();
        if excludes.is_empty() {
            return Err(RecordError::MissingField {
                record: id,
                field: "exclude_if_contains",
            });
        }
        let o = ExcludeOverride::new(id, term, excludes);
        Ok(if self.is_active.unwrap_or(true) {
            o
        } else {
            o.deactivated()
        })
    }
}

impl TryFrom<&RawOverrideRow> for ExcludeOverride {
    type Error = RecordError;

    fn try_from(row: &RawOverrideRow) -> Result<Self, Self::Error> {
        row.validate()
    }
}

/// Household avoid-rule row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawHouseholdRuleRow {
    pub id: Option<String>,
    pub match_mode: Option<String>,
    pub match_value: Option<String>,
    pub strictness: Option<String>,
    pub rule_type: Option<String>,
}

impl RawHouseholdRuleRow {
    pub fn validate(&self) -> Result<HouseholdAvoidRule, RecordError> {
        let id = record_id(&self.id)?;
        let match_mode = match required(&id, "match_mode", &self.match_mode)?
            .to_ascii_lowercase()
            .as_str()
        {
            "nevo_code" => HouseholdMatchMode::NevoCode,
            "term" => HouseholdMatchMode::Term,
            other => return Err(invalid(&id, "match_mode", other)),
        };
        let match_value = self
            .match_value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| RecordError::EmptyMatchValue { record: id.clone() })?
            .to_string();
        let strictness = parse_strictness(&id, self.strictness.as_deref())?;
        let rule_type = match self
            .rule_type
            .as_deref()
            .map(|t| t.trim().to_ascii_lowercase())
            .as_deref()
        {
            Some("allergy") => HouseholdRuleType::Allergy,
            None | Some("") | Some("avoid") => HouseholdRuleType::Avoid,
            Some("warning") => HouseholdRuleType::Warning,
            Some(other) => return Err(invalid(&id, "rule_type", other)),
        };
        Ok(HouseholdAvoidRule {
            id,
            match_mode,
            match_value,
            strictness,
            rule_type,
        })
    }
}

impl TryFrom<&RawHouseholdRuleRow> for HouseholdAvoidRule {
    type Error = RecordError;

    fn try_from(row: &RawHouseholdRuleRow) -> Result<Self, Self::Error> {
        row.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_row(mode: &str, value: &str) -> RawGuardRuleRow {
        RawGuardRuleRow {
            id: Some("r1".into()),
            match_mode: Some(mode.into()),
            match_value: Some(value.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_admin_rule_defaults() {
        let rule = rule_row("term", " Pinda ").validate().unwrap();
        assert_eq!(rule.id, "admin:r1");
        assert_eq!(rule.priority, ADMIN_RULE_PRIORITY);
        assert_eq!(rule.strictness, ConstraintType::Hard);
        assert_eq!(rule.rule_code(), codes::FORBIDDEN_INGREDIENT);
        assert_eq!(rule.check, RuleCheck::Ingredient(IngredientMatcher::terms(["pinda"])));
    }

    #[test]
    fn test_admin_rule_tag_and_modes() {
        let mut row = rule_row("tag", "Deep-fried");
        row.modes = vec!["batch_generation".into()];
        row.strictness = Some("soft".into());
        let rule = row.validate().unwrap();
        assert_eq!(rule.modes, vec![EvaluationMode::BatchGeneration]);
        assert!(matches!(rule.check, RuleCheck::Meal(_)));
        assert!(!rule.is_hard());
    }

    #[test]
    fn test_admin_rule_rejections() {
        assert_eq!(
            rule_row("term", "  ").validate().unwrap_err(),
            RecordError::EmptyMatchValue { record: "r1".into() }
        );
        assert!(matches!(
            rule_row("regex", "x").validate(),
            Err(RecordError::InvalidValue { field: "match_mode", .. })
        ));
        let mut row = rule_row("term", "x");
        row.priority = Some(-1);
        assert!(matches!(row.validate(), Err(RecordError::InvalidValue { field: "priority", .. })));
        for p in [i64::from(HOUSEHOLD_RULE_PRIORITY), 5000] {
            row.priority = Some(p);
            assert!(matches!(row.validate(), Err(RecordError::InvalidValue { field: "priority", .. })));
        }
        row.priority = Some(i64::from(HOUSEHOLD_RULE_PRIORITY) - 1);
        assert_eq!(row.validate().unwrap().priority, HOUSEHOLD_RULE_PRIORITY - 1);
        let mut row = rule_row("term", "x");
        row.strictness = Some("maybe".into());
        assert!(matches!(row.validate(), Err(RecordError::InvalidValue { field: "strictness", .. })));
        assert!(matches!(
            RawGuardRuleRow::default().validate(),
            Err(RecordError::MissingField { field: "id", .. })
        ));
    }

    #[test]
    fn test_override_row() {
        let row = RawOverrideRow {
            id: Some("ovr-1".into()),
            forbidden_term: Some("Aardappel".into()),
            exclude_if_contains: vec!["zoete aardappel".into(), " ".into()],
            is_active: None,
        };
        let o = ExcludeOverride::try_from(&row).unwrap();
        assert_eq!(o.forbidden_term, "aardappel");
        assert_eq!(o.exclude_if_contains, vec!["zoete aardappel"]);
        assert!(o.active);

        let empty = RawOverrideRow {
            exclude_if_contains: vec![],
            ..row
        };
        assert!(matches!(
            empty.validate(),
            Err(RecordError::MissingField { field: "exclude_if_contains", .. })
        ));
    }

    #[test]
    fn test_household_row_from_json() {
        let row: RawHouseholdRuleRow = serde_json::from_str(
            r#"{"id": "hh-1", "match_mode": "nevo_code", "match_value": "0412", "rule_type": "warning", "strictness": "hard"}"#,
        )
        .unwrap();
        let rule = row.validate().unwrap();
        assert_eq!(rule.match_mode, HouseholdMatchMode::NevoCode);
        assert_eq!(rule.rule_type, HouseholdRuleType::Warning);
        assert_eq!(rule.effective_strictness(), ConstraintType::Soft);

        let bad = RawHouseholdRuleRow {
            match_value: None,
            ..row
        };
        assert_eq!(
            bad.validate().unwrap_err(),
            RecordError::EmptyMatchValue { record: "hh-1".into() }
        );
    }
}
