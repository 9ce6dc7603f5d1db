use diet_guard_types::{DietKey, DietProfile, DietRuleSet, MacroConstraint, MacroScope, MealSlot};

use crate::categories::{self, FISH, OLIVE_OIL, VEGETABLES};
use crate::common::{
    base_rule_set, forbid_categories, generic_constraint_type, meal_count, per_day, per_week,
    protein_floor,
};

/// Mediterranean diet.
///
/// Nothing is banned outright: processed meat and processed sugar are
/// discouraged at the profile's strictness. Fish twice a week, vegetables
/// and olive oil daily, saturated fat capped.
pub fn mediterranean_rule_set(profile: &DietProfile) -> DietRuleSet {
    let generic = generic_constraint_type(profile);
    let mut rules = base_rule_set(DietKey::Mediterranean, profile);

    rules.ingredient_constraints.push(forbid_categories(
        &[categories::PROCESSED_MEAT, categories::PROCESSED_SUGAR],
        generic,
    ));

    rules.required_categories.push(per_week(FISH, 2, generic));
    rules.required_categories.push(per_day(VEGETABLES, 2, generic));
    rules.required_categories.push(per_day(OLIVE_OIL, 1, generic));

    let mut daily = MacroConstraint::new(MacroScope::Daily, generic);
    daily.max_saturated_fat_g = Some(22.0);
    rules.macro_constraints.push(daily);

    for slot in [MealSlot::Lunch, MealSlot::Dinner] {
        rules.per_meal_constraints.push(protein_floor(slot, 15.0, generic));
    }

    rules.meal_structure.push(meal_count(3, 4, generic));

    rules
}
