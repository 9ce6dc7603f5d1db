//! Meal-plan snapshot
//!
//! The candidate plan handed to the evaluator. Read-only from the engine's
//! point of view; slot replacement is done by the caller.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::profile::MealSlot;

/// Estimated macro totals. Any field may be unknown.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroTotals {
    pub calories: Option<f64>,
    pub protein_g: Option<f64>,
    /// Net carbohydrates
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub saturated_fat_g: Option<f64>,
}

impl MacroTotals {
    /// Field-wise sum. A field is known in the result only if it is known
    /// in every input.
    pub fn sum<'a>(items: impl IntoIterator<Item = &'a MacroTotals>) -> Option<MacroTotals> {
        let mut iter = items.into_iter();
        let first = iter.next()?.clone();
        Some(iter.fold(first, |acc, m| MacroTotals {
            calories: add(acc.calories, m.calories),
            protein_g: add(acc.protein_g, m.protein_g),
            carbs_g: add(acc.carbs_g, m.carbs_g),
            fat_g: add(acc.fat_g, m.fat_g),
            saturated_fat_g: add(acc.saturated_fat_g, m.saturated_fat_g),
        }))
    }
}

fn add(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + b),
        _ => None,
    }
}

/// Reference to a canonical ingredient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IngredientRef {
    /// Canonical NEVO code, when resolved
    #[serde(default)]
    pub nevo_code: Option<String>,
    #[serde(default)]
    pub quantity_g: Option<f64>,
    pub display_name: String,
}

impl IngredientRef {
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            nevo_code: None,
            quantity_g: None,
            display_name: display_name.into(),
        }
    }

    pub fn with_quantity(mut self, grams: f64) -> Self {
        self.quantity_g = Some(grams);
        self
    }

    pub fn with_nevo_code(mut self, code: impl Into<String>) -> Self {
        self.nevo_code = Some(code.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannedMeal {
    pub id: String,
    pub slot: MealSlot,
    pub name: String,
    #[serde(default)]
    pub ingredient_refs: Vec<IngredientRef>,
    /// Free-text ingredients from older plans
    #[serde(default)]
    pub legacy_ingredients: Vec<String>,
    #[serde(default)]
    pub macros: Option<MacroTotals>,
    #[serde(default)]
    pub prep_minutes: Option<u32>,
    #[serde(default)]
    pub scheduled_at: Option<NaiveTime>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PlannedMeal {
    pub fn new(id: impl Into<String>, slot: MealSlot, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slot,
            name: name.into(),
            ingredient_refs: Vec::new(),
            legacy_ingredients: Vec::new(),
            macros: None,
            prep_minutes: None,
            scheduled_at: None,
            tags: Vec::new(),
        }
    }

    pub fn with_ingredient(mut self, ingredient: IngredientRef) -> Self {
        self.ingredient_refs.push(ingredient);
        self
    }

    pub fn with_legacy_ingredient(mut self, text: impl Into<String>) -> Self {
        self.legacy_ingredients.push(text.into());
        self
    }

    pub fn with_macros(mut self, macros: MacroTotals) -> Self {
        self.macros = Some(macros);
        self
    }

    pub fn with_prep_minutes(mut self, minutes: u32) -> Self {
        self.prep_minutes = Some(minutes);
        self
    }

    pub fn with_scheduled_at(mut self, at: NaiveTime) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub meals: Vec<PlannedMeal>,
    /// Day totals when estimated upstream; otherwise summed from meals
    #[serde(default)]
    pub totals: Option<MacroTotals>,
}

impl PlanDay {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            meals: Vec::new(),
            totals: None,
        }
    }

    pub fn with_meal(mut self, meal: PlannedMeal) -> Self {
        self.meals.push(meal);
        self
    }

    pub fn with_totals(mut self, totals: MacroTotals) -> Self {
        self.totals = Some(totals);
        self
    }

    /// Upstream totals, or the sum of meal estimates when every meal has one.
    pub fn effective_totals(&self) -> Option<MacroTotals> {
        if let Some(totals) = &self.totals {
            return Some(totals.clone());
        }
        if self.meals.is_empty() || self.meals.iter().any(|m| m.macros.is_none()) {
            return None;
        }
        MacroTotals::sum(self.meals.iter().filter_map(|m| m.macros.as_ref()))
    }

    pub fn meal(&self, slot: MealSlot) -> Option<&PlannedMeal> {
        self.meals.iter().find(|m| m.slot == slot)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealPlanSnapshot {
    pub plan_id: String,
    pub days: Vec<PlanDay>,
}

impl MealPlanSnapshot {
    pub fn new(plan_id: impl Into<String>) -> Self {
        Self {
            plan_id: plan_id.into(),
            days: Vec::new(),
        }
    }

    pub fn with_day(mut self, day: PlanDay) -> Self {
        self.days.push(day);
        self
    }

    pub fn day(&self, date: NaiveDate) -> Option<&PlanDay> {
        self.days.iter().find(|d| d.date == date)
    }

    pub fn day_mut(&mut self, date: NaiveDate) -> Option<&mut PlanDay> {
        self.days.iter_mut().find(|d| d.date == date)
    }

    pub fn meal_count(&self) -> usize {
        self.days.iter().map(|d| d.meals.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn macros(carbs: f64) -> MacroTotals {
        MacroTotals {
            carbs_g: Some(carbs),
            protein_g: Some(20.0),
            ..Default::default()
        }
    }

    #[test]
    fn effective_totals_prefers_upstream() {
        let day = PlanDay::new(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
            .with_meal(PlannedMeal::new("m1", MealSlot::Lunch, "Salade").with_macros(macros(5.0)))
            .with_totals(macros(35.0));
        assert_eq!(day.effective_totals().unwrap().carbs_g, Some(35.0));
    }

    #[test]
    fn effective_totals_sums_meals() {
        let day = PlanDay::new(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
            .with_meal(PlannedMeal::new("m1", MealSlot::Lunch, "Salade").with_macros(macros(5.0)))
            .with_meal(PlannedMeal::new("m2", MealSlot::Dinner, "Stoof").with_macros(macros(12.5)));
        let totals = day.effective_totals().unwrap();
        assert_eq!(totals.carbs_g, Some(17.5));
        assert_eq!(totals.protein_g, Some(40.0));
        assert_eq!(totals.calories, None);
    }

    #[test]
    fn effective_totals_unknown_when_a_meal_lacks_estimate() {
        let day = PlanDay::new(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
            .with_meal(PlannedMeal::new("m1", MealSlot::Lunch, "Salade").with_macros(macros(5.0)))
            .with_meal(PlannedMeal::new("m2", MealSlot::Dinner, "Stoof"));
        assert!(day.effective_totals().is_none());
    }
}
