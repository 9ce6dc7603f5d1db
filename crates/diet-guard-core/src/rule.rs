//! Guard rules
//!
//! A [`GuardRule`] is the single shape every rule source is compiled into:
//! diet rule sets, admin rule tables and household avoid rules. Every rule
//! is a block rule; its strictness decides whether a match blocks (hard)
//! or warns (soft).

use chrono::NaiveTime;
use diet_guard_types::{ConstraintType, MealSlot, VegetableCupsRequirement};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::context::EvaluationMode;

/// Household rules outrank every other source.
pub const HOUSEHOLD_RULE_PRIORITY: u32 = 1000;
pub const ALLERGY_RULE_PRIORITY: u32 = 900;
pub const DIET_BAN_PRIORITY: u32 = 800;
pub const ADMIN_RULE_PRIORITY: u32 = 600;
pub const DISLIKE_RULE_PRIORITY: u32 = 500;
pub const STRUCTURE_RULE_PRIORITY: u32 = 400;
pub const VARIETY_RULE_PRIORITY: u32 = 300;

/// Machine-readable reason codes attached to matches.
pub mod codes {
    pub const ALLERGEN_PRESENT: &str = "ALLERGEN_PRESENT";
    pub const DISLIKED_INGREDIENT: &str = "DISLIKED_INGREDIENT";
    pub const FORBIDDEN_INGREDIENT: &str = "FORBIDDEN_INGREDIENT";
    pub const FORBIDDEN_CATEGORY_PREFIX: &str = "FORBIDDEN_CATEGORY_";
    pub const HOUSEHOLD_ALLERGEN: &str = "HOUSEHOLD_ALLERGEN";
    pub const HOUSEHOLD_AVOID: &str = "HOUSEHOLD_AVOID";
    pub const HOUSEHOLD_WARNING: &str = "HOUSEHOLD_WARNING";
    pub const MEAL_MIN_PROTEIN: &str = "MEAL_MIN_PROTEIN";
    pub const MEAL_MIN_CARBS: &str = "MEAL_MIN_CARBS";
    pub const MEAL_MIN_FAT: &str = "MEAL_MIN_FAT";
    pub const MEAL_MAX_CARBS: &str = "MEAL_MAX_CARBS";
    pub const MEAL_MAX_SATURATED_FAT: &str = "MEAL_MAX_SATURATED_FAT";
    pub const MEAL_MAX_CALORIES: &str = "MEAL_MAX_CALORIES";
    pub const MEAL_REQUIRED_CATEGORY: &str = "MEAL_REQUIRED_CATEGORY";
    pub const MEAL_FORBIDDEN_MACRO_TYPE: &str = "MEAL_FORBIDDEN_MACRO_TYPE";
    pub const PREP_TIME_EXCEEDED: &str = "PREP_TIME_EXCEEDED";
    pub const DAILY_MAX_CARBS: &str = "DAILY_MAX_CARBS";
    pub const DAILY_MAX_SATURATED_FAT: &str = "DAILY_MAX_SATURATED_FAT";
    pub const DAILY_MIN_PROTEIN: &str = "DAILY_MIN_PROTEIN";
    pub const DAILY_MIN_FAT: &str = "DAILY_MIN_FAT";
    pub const DAILY_CALORIE_RANGE: &str = "DAILY_CALORIE_RANGE";
    pub const REQUIRED_CATEGORY_MISSING: &str = "REQUIRED_CATEGORY_MISSING";
    pub const WEEKLY_MAX_REPEATS: &str = "WEEKLY_MAX_REPEATS";
    pub const WEEKLY_MIN_UNIQUE_MEALS: &str = "WEEKLY_MIN_UNIQUE_MEALS";
    pub const VEGETABLE_CUPS_SHORTFALL: &str = "VEGETABLE_CUPS_SHORTFALL";
    pub const MEAL_COUNT_OUT_OF_RANGE: &str = "MEAL_COUNT_OUT_OF_RANGE";
    pub const MEAL_TIMING_WINDOW: &str = "MEAL_TIMING_WINDOW";

    /// `FORBIDDEN_CATEGORY_GRAINS` for `grains`.
    pub fn forbidden_category(category: &str) -> String {
        format!("{}{}", FORBIDDEN_CATEGORY_PREFIX, category.to_ascii_uppercase())
    }
}

/// Which rule table a guard rule came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSource {
    Diet,
    Admin,
    Household,
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleSource::Diet => "diet",
            RuleSource::Admin => "admin",
            RuleSource::Household => "household",
        };
        f.write_str(s)
    }
}

/// Reporting metadata attached to every match of a rule
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMetadata {
    pub rule_code: String,
    pub label: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// What an ingredient rule matches.
///
/// When both the rule and the ingredient carry a canonical identifier, the
/// identifier decides. Otherwise each term is a case-insensitive substring
/// of the ingredient text, ignoring the parts of the text covered by that
/// term's exclusions ("bloem" does not hit "bloemkool").
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientMatcher {
    #[serde(default)]
    pub terms: Vec<String>,
    #[serde(default)]
    pub canonical_ids: Vec<String>,
    /// Compound words per term that contain it without being it
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exclusions: BTreeMap<String, Vec<String>>,
}

impl IngredientMatcher {
    pub fn terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn canonical_id(id: impl Into<String>) -> Self {
        Self {
            canonical_ids: vec![id.into()],
            ..Default::default()
        }
    }

    pub fn with_exclusions<I, S>(mut self, term: impl Into<String>, excludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let excludes: Vec<String> = excludes.into_iter().map(Into::into).collect();
        if !excludes.is_empty() {
            self.exclusions.entry(term.into()).or_default().extend(excludes);
        }
        self
    }

    /// Whether `term` occurs in `text` outside every exclusion for it.
    pub fn term_hits(&self, term: &str, text: &str) -> bool {
        let term = term.to_lowercase();
        if term.is_empty() {
            return false;
        }
        match self.exclusions.get(&term) {
            Some(excludes) => excludes
                .iter()
                .fold(text.to_string(), |rest, e| rest.replace(e.as_str(), " "))
                .contains(&term),
            None => text.contains(&term),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.canonical_ids.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MealCheckKind {
    MinProtein { grams: f64 },
    MinCarbs { grams: f64 },
    MinFat { grams: f64 },
    MaxCarbs { grams: f64 },
    MaxSaturatedFat { grams: f64 },
    MaxCalories { kcal: f64 },
    RequiredCategory { category: String, terms: Vec<String> },
    ForbiddenTags { tags: Vec<String> },
    /// Meals carrying `exempt_tag` are not held to the limit
    MaxPrepMinutes {
        minutes: u32,
        #[serde(default)]
        exempt_tag: Option<String>,
    },
}

/// A check against a single meal; `slot: None` applies to every slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealCheck {
    #[serde(default)]
    pub slot: Option<MealSlot>,
    #[serde(flatten)]
    pub kind: MealCheckKind,
}

/// A check against the whole plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeekCheck {
    MaxRepeats {
        max: u32,
        near_duplicates: bool,
    },
    /// Full-week minimum; scaled down for shorter plans
    MinUniqueMeals {
        min: u32,
        near_duplicates: bool,
    },
    DailyMacro {
        #[serde(default)]
        max_carbs_g: Option<f64>,
        #[serde(default)]
        max_saturated_fat_g: Option<f64>,
        #[serde(default)]
        min_protein_g: Option<f64>,
        #[serde(default)]
        min_fat_g: Option<f64>,
    },
    DailyCalories {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    CategoryPerDay {
        category: String,
        terms: Vec<String>,
        min: u32,
    },
    /// Full-week minimum; scaled down for shorter plans
    CategoryPerWeek {
        category: String,
        terms: Vec<String>,
        min: u32,
    },
    VegetableCups(VegetableCupsRequirement),
    MealCount {
        min: u32,
        max: u32,
    },
    MealTiming {
        slot: MealSlot,
        earliest: NaiveTime,
        latest: NaiveTime,
    },
}

/// What a rule tests, by target type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum RuleCheck {
    Ingredient(IngredientMatcher),
    Meal(MealCheck),
    Week(WeekCheck),
}

/// One compiled guard rule
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuardRule {
    pub id: String,
    pub strictness: ConstraintType,
    /// Higher is checked first and wins metadata on shared ingredients
    pub priority: u32,
    pub source: RuleSource,
    /// Modes this rule applies to; empty means every mode
    #[serde(default)]
    pub modes: Vec<EvaluationMode>,
    pub check: RuleCheck,
    pub metadata: RuleMetadata,
}

impl GuardRule {
    pub fn new(
        id: impl Into<String>,
        source: RuleSource,
        strictness: ConstraintType,
        priority: u32,
        check: RuleCheck,
        rule_code: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            strictness,
            priority,
            source,
            modes: Vec::new(),
            check,
            metadata: RuleMetadata {
                rule_code: rule_code.into(),
                label: label.into(),
                category: None,
            },
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.metadata.category = Some(category.into());
        self
    }

    pub fn with_modes(mut self, modes: Vec<EvaluationMode>) -> Self {
        self.modes = modes;
        self
    }

    pub fn is_hard(&self) -> bool {
        self.strictness.is_hard()
    }

    pub fn applies_in(&self, mode: EvaluationMode) -> bool {
        self.modes.is_empty() || self.modes.contains(&mode)
    }

    pub fn rule_code(&self) -> &str {
        &self.metadata.rule_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rice_rule() -> GuardRule {
        GuardRule::new(
            "diet:keto:category:grains",
            RuleSource::Diet,
            ConstraintType::Hard,
            DIET_BAN_PRIORITY,
            RuleCheck::Ingredient(IngredientMatcher::terms(["rijst", "pasta"])),
            codes::forbidden_category("grains"),
            "Grains are not part of keto",
        )
        .with_category("grains")
    }

    #[test]
    fn test_forbidden_category_code() {
        assert_eq!(codes::forbidden_category("grains"), "FORBIDDEN_CATEGORY_GRAINS");
        assert_eq!(rice_rule().rule_code(), "FORBIDDEN_CATEGORY_GRAINS");
    }

    #[test]
    fn test_exclusions_only_cover_their_compound() {
        let flour = IngredientMatcher::terms(["bloem"]).with_exclusions("bloem", ["bloemkool"]);
        assert!(!flour.term_hits("bloem", "geroosterde bloemkool"));
        assert!(flour.term_hits("bloem", "bloemkool met bloem"));
        assert!(flour.term_hits("bloem", "tarwebloem"));

        let plain = IngredientMatcher::terms(["bloem"]);
        assert!(plain.term_hits("bloem", "bloemkool"));
        assert!(!plain.term_hits("", "bloemkool"));
    }

    #[test]
    fn test_mode_scoping() {
        let all = rice_rule();
        assert!(all.applies_in(EvaluationMode::PlanChat));
        assert!(all.applies_in(EvaluationMode::BatchGeneration));

        let scoped = rice_rule().with_modes(vec![EvaluationMode::BatchGeneration]);
        assert!(!scoped.applies_in(EvaluationMode::PlanChat));
    }

    #[test]
    fn test_rule_json_shape() {
        let json = serde_json::to_value(rice_rule()).unwrap();
        assert_eq!(json["check"]["target"], "ingredient");
        assert_eq!(json["check"]["terms"][0], "rijst");
        assert_eq!(json["metadata"]["category"], "grains");

        let meal = RuleCheck::Meal(MealCheck {
            slot: Some(MealSlot::Lunch),
            kind: MealCheckKind::MinProtein { grams: 20.0 },
        });
        let json = serde_json::to_value(&meal).unwrap();
        assert_eq!(json["target"], "meal");
        assert_eq!(json["kind"], "min_protein");
        assert_eq!(json["slot"], "lunch");
    }

    #[test]
    fn test_rule_json_parses_back() {
        let week = RuleCheck::Week(WeekCheck::MealCount { min: 2, max: 3 });
        let json = serde_json::to_string(&week).unwrap();
        let back: RuleCheck = serde_json::from_str(&json).unwrap();
        assert_eq!(back, week);
    }
}
