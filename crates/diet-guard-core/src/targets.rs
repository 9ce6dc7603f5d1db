//! Target extraction
//!
//! Flattens a meal-plan snapshot into the units rules are checked against:
//! one target per ingredient mention, one per meal, and one for the whole
//! plan. Every ingredient occurrence is kept, duplicates included, and each
//! target remembers the day and slot it came from.

use chrono::{NaiveDate, NaiveTime};
use diet_guard_rules::normalize_term;
use diet_guard_types::{MacroTotals, MealPlanSnapshot, MealSlot, PlanDay, PlannedMeal};
use serde::{Deserialize, Serialize};

/// One ingredient as mentioned in a meal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IngredientMention {
    /// Normalized lowercase display text
    pub text: String,
    pub canonical_id: Option<String>,
    pub quantity_g: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IngredientTarget {
    pub date: NaiveDate,
    pub slot: MealSlot,
    pub meal_id: String,
    #[serde(flatten)]
    pub mention: IngredientMention,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealTarget {
    pub date: NaiveDate,
    pub slot: MealSlot,
    pub meal_id: String,
    pub name: String,
    pub ingredients: Vec<IngredientMention>,
    pub macros: Option<MacroTotals>,
    pub prep_minutes: Option<u32>,
    pub scheduled_at: Option<NaiveTime>,
    /// Normalized lowercase tags
    pub tags: Vec<String>,
}

impl MealTarget {
    /// Whether any ingredient text contains one of `terms`.
    pub fn mentions_any(&self, terms: &[String]) -> bool {
        self.ingredients
            .iter()
            .any(|i| terms.iter().any(|t| i.text.contains(t.as_str())))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayTarget {
    pub date: NaiveDate,
    /// Upstream day totals, or the sum of meal estimates
    pub totals: Option<MacroTotals>,
    pub meals: Vec<MealTarget>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeekTarget {
    pub days: Vec<DayTarget>,
}

impl WeekTarget {
    pub fn meals(&self) -> impl Iterator<Item = &MealTarget> {
        self.days.iter().flat_map(|d| d.meals.iter())
    }

    pub fn meal_count(&self) -> usize {
        self.days.iter().map(|d| d.meals.len()).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuardTarget {
    Ingredient(IngredientTarget),
    Meal(MealTarget),
    Week(WeekTarget),
}

impl GuardTarget {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            GuardTarget::Ingredient(t) => Some(t.date),
            GuardTarget::Meal(t) => Some(t.date),
            GuardTarget::Week(_) => None,
        }
    }
}

fn mentions(meal: &PlannedMeal) -> Vec<IngredientMention> {
    let refs = meal.ingredient_refs.iter().map(|r| IngredientMention {
        text: normalize_term(&r.display_name),
        canonical_id: r
            .nevo_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        quantity_g: r.quantity_g,
    });
    let legacy = meal.legacy_ingredients.iter().map(|text| IngredientMention {
        text: normalize_term(text),
        canonical_id: None,
        quantity_g: None,
    });
    refs.chain(legacy).filter(|m| !m.text.is_empty() || m.canonical_id.is_some()).collect()
}

fn meal_target(day: &PlanDay, meal: &PlannedMeal) -> MealTarget {
    MealTarget {
        date: day.date,
        slot: meal.slot,
        meal_id: meal.id.clone(),
        name: meal.name.clone(),
        ingredients: mentions(meal),
        macros: meal.macros.clone(),
        prep_minutes: meal.prep_minutes,
        scheduled_at: meal.scheduled_at,
        tags: meal.tags.iter().map(|t| normalize_term(t)).collect(),
    }
}

/// Extract every target from a plan: ingredient targets in plan order,
/// then meal targets, then exactly one week target.
pub fn extract_targets(plan: &MealPlanSnapshot) -> Vec<GuardTarget> {
    let mut ingredients = Vec::new();
    let mut meals = Vec::new();
    let mut days = Vec::with_capacity(plan.days.len());

    for day in &plan.days {
        let mut day_meals = Vec::with_capacity(day.meals.len());
        for meal in &day.meals {
            let target = meal_target(day, meal);
            for mention in &target.ingredients {
                ingredients.push(GuardTarget::Ingredient(IngredientTarget {
                    date: day.date,
                    slot: meal.slot,
                    meal_id: meal.id.clone(),
                    mention: mention.clone(),
                }));
            }
            meals.push(GuardTarget::Meal(target.clone()));
            day_meals.push(target);
        }
        days.push(DayTarget {
            date: day.date,
            totals: day.effective_totals(),
            meals: day_meals,
        });
    }

    let mut targets = ingredients;
    targets.extend(meals);
    targets.push(GuardTarget::Week(WeekTarget { days }));
    targets
}
