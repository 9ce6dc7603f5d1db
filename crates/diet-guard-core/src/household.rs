//! Household avoid rules
//!
//! Extra ingredient rules configured per household. They are merged into
//! the rule set additively at [`HOUSEHOLD_RULE_PRIORITY`], so they are
//! checked before any diet rule and can only make a plan stricter.

use diet_guard_rules::normalize_term;
use diet_guard_types::ConstraintType;
use serde::{Deserialize, Serialize};

use crate::rule::{codes, GuardRule, IngredientMatcher, RuleCheck, RuleSource, HOUSEHOLD_RULE_PRIORITY};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseholdMatchMode {
    /// Canonical ingredient identifier
    NevoCode,
    /// Case-insensitive substring of the ingredient text
    Term,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseholdRuleType {
    Allergy,
    Avoid,
    /// Advisory only; always soft
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdAvoidRule {
    pub id: String,
    pub match_mode: HouseholdMatchMode,
    pub match_value: String,
    pub strictness: ConstraintType,
    pub rule_type: HouseholdRuleType,
}

impl HouseholdAvoidRule {
    /// Strictness after applying the rule type: warnings never block.
    pub fn effective_strictness(&self) -> ConstraintType {
        match self.rule_type {
            HouseholdRuleType::Warning => ConstraintType::Soft,
            _ => self.strictness,
        }
    }

    pub fn to_guard_rule(&self) -> GuardRule {
        let (matcher, shown) = match self.match_mode {
            HouseholdMatchMode::NevoCode => {
                let code = self.match_value.trim().to_string();
                (IngredientMatcher::canonical_id(code.clone()), format!("NEVO {code}"))
            }
            HouseholdMatchMode::Term => {
                let term = normalize_term(&self.match_value);
                (IngredientMatcher::terms([term.clone()]), term)
            }
        };
        let (code, label) = match self.rule_type {
            HouseholdRuleType::Allergy => (codes::HOUSEHOLD_ALLERGEN, format!("Household allergy: {shown}")),
            HouseholdRuleType::Avoid => (codes::HOUSEHOLD_AVOID, format!("Household avoids: {shown}")),
            HouseholdRuleType::Warning => (codes::HOUSEHOLD_WARNING, format!("Household warning: {shown}")),
        };
        GuardRule::new(
            format!("household:{}", self.id),
            RuleSource::Household,
            self.effective_strictness(),
            HOUSEHOLD_RULE_PRIORITY,
            RuleCheck::Ingredient(matcher),
            code,
            label,
        )
    }
}

/// Map household rows into guard rules.
pub fn household_guard_rules(rules: &[HouseholdAvoidRule]) -> Vec<GuardRule> {
    rules.iter().map(HouseholdAvoidRule::to_guard_rule).collect()
}
