//! Derived diet rule set
//!
//! A [`DietRuleSet`] is pure derived data: it is recomputed from the
//! profile on every evaluation and never persisted.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::profile::{BudgetLevel, CalorieTarget, DietKey, MealSlot, Strictness};

/// Whether a constraint blocks (hard) or only warns (soft).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintType {
    Hard,
    Soft,
}

impl ConstraintType {
    pub fn is_hard(&self) -> bool {
        matches!(self, ConstraintType::Hard)
    }
}

impl From<Strictness> for ConstraintType {
    fn from(strictness: Strictness) -> Self {
        match strictness {
            Strictness::Strict => ConstraintType::Hard,
            Strictness::Flexible => ConstraintType::Soft,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientConstraintKind {
    Allowed,
    Forbidden,
}

/// Where an ingredient constraint came from. Drives the reason code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintOrigin {
    Allergy,
    Dislike,
    Diet,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IngredientConstraint {
    pub kind: IngredientConstraintKind,
    pub origin: ConstraintOrigin,
    /// Concrete ingredient terms
    #[serde(default)]
    pub items: Vec<String>,
    /// Named food categories (expanded to terms at compile time)
    #[serde(default)]
    pub categories: Vec<String>,
    pub constraint_type: ConstraintType,
}

/// A food category that must appear a minimum number of times.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequiredCategory {
    pub category: String,
    pub min_per_day: Option<u32>,
    pub min_per_week: Option<u32>,
    /// Qualifying items; empty means "use the category vocabulary"
    #[serde(default)]
    pub items: Vec<String>,
    pub constraint_type: ConstraintType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerMealConstraint {
    pub slot: MealSlot,
    pub min_protein_g: Option<f64>,
    pub min_carbs_g: Option<f64>,
    pub min_fat_g: Option<f64>,
    pub max_calories: Option<f64>,
    #[serde(default)]
    pub required_categories: Vec<String>,
    pub constraint_type: ConstraintType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeeklyVariety {
    /// Maximum times an identical meal may appear in a week
    pub max_repeats: u32,
    /// Minimum distinct meals in a full week
    pub min_unique_meals: u32,
    pub exclude_near_duplicates: bool,
    pub constraint_type: ConstraintType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroScope {
    Daily,
    PerMeal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MacroConstraint {
    pub scope: MacroScope,
    pub max_carbs_g: Option<f64>,
    pub max_saturated_fat_g: Option<f64>,
    pub min_protein_g: Option<f64>,
    pub min_fat_g: Option<f64>,
    /// Macro-type tags a meal is expected to carry (informational)
    #[serde(default)]
    pub allowed_types: Vec<String>,
    /// Macro-type tags that must not appear on a meal
    #[serde(default)]
    pub forbidden_types: Vec<String>,
    pub constraint_type: ConstraintType,
}

impl MacroConstraint {
    pub fn new(scope: MacroScope, constraint_type: ConstraintType) -> Self {
        Self {
            scope,
            max_carbs_g: None,
            max_saturated_fat_g: None,
            min_protein_g: None,
            min_fat_g: None,
            allowed_types: Vec::new(),
            forbidden_types: Vec::new(),
            constraint_type,
        }
    }
}

/// One vegetable sub-category of the daily cup quota.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VegetableQuota {
    pub name: String,
    pub cups: f64,
    /// Grams of this sub-category that count as one cup
    pub grams_per_cup: f64,
    pub vegetables: Vec<String>,
}

/// Daily vegetable "cups" split across named sub-categories.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VegetableCupsRequirement {
    pub total_cups: f64,
    pub quotas: Vec<VegetableQuota>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MealStructureRule {
    VegetableCups(VegetableCupsRequirement),
    MealCount {
        min_per_day: u32,
        max_per_day: u32,
    },
    MealTiming {
        slot: MealSlot,
        earliest: NaiveTime,
        latest: NaiveTime,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealStructureConstraint {
    pub rule: MealStructureRule,
    pub constraint_type: ConstraintType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalorieConstraint {
    #[serde(flatten)]
    pub target: CalorieTarget,
    pub constraint_type: ConstraintType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrepTimeConstraint {
    pub max_minutes: Option<u32>,
    pub breakfast: Option<u32>,
    pub lunch: Option<u32>,
    pub dinner: Option<u32>,
    pub batch_cooking: bool,
    pub constraint_type: ConstraintType,
}

/// The diet-specific guard-rail bundle derived from a [`crate::DietProfile`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DietRuleSet {
    pub diet_key: DietKey,
    pub ingredient_constraints: Vec<IngredientConstraint>,
    pub required_categories: Vec<RequiredCategory>,
    pub per_meal_constraints: Vec<PerMealConstraint>,
    pub weekly_variety: WeeklyVariety,
    pub macro_constraints: Vec<MacroConstraint>,
    pub meal_structure: Vec<MealStructureConstraint>,
    pub calorie_target: Option<CalorieConstraint>,
    pub prep_time: Option<PrepTimeConstraint>,
    pub budget: Option<BudgetLevel>,
    pub pantry_priority: Option<bool>,
}

impl DietRuleSet {
    /// All forbidden ingredient constraints.
    pub fn forbidden(&self) -> impl Iterator<Item = &IngredientConstraint> {
        self.ingredient_constraints
            .iter()
            .filter(|c| c.kind == IngredientConstraintKind::Forbidden)
    }

    /// Number of vegetable-cup structure entries (at most one per rule set).
    pub fn vegetable_cup_rules(&self) -> usize {
        self.meal_structure
            .iter()
            .filter(|m| matches!(m.rule, MealStructureRule::VegetableCups(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strictness_resolves_to_constraint_type() {
        assert_eq!(ConstraintType::from(Strictness::Strict), ConstraintType::Hard);
        assert_eq!(ConstraintType::from(Strictness::Flexible), ConstraintType::Soft);
    }

    #[test]
    fn structure_rule_is_tagged() {
        let rule = MealStructureRule::MealCount {
            min_per_day: 2,
            max_per_day: 4,
        };
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["type"], "meal_count");
        assert_eq!(json["min_per_day"], 2);
    }
}
