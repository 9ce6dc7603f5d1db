use diet_guard_types::{
    ConstraintType, DietKey, DietProfile, DietRuleSet, MacroConstraint, MacroScope, MealSlot,
};

use crate::categories::{self, HEALTHY_FATS};
use crate::common::{
    allow_categories, base_rule_set, forbid_categories, generic_constraint_type, meal_count,
    per_day, protein_floor,
};

/// Daily net carbohydrate ceiling. Fixed diet policy; never softened.
pub const KETO_MAX_NET_CARBS_G: f64 = 20.0;

/// Ketogenic diet.
///
/// Carbohydrate-heavy categories are hard bans and the daily net carb
/// ceiling is a hard [`KETO_MAX_NET_CARBS_G`]. Fat floors per meal and the
/// healthy-fat requirement follow the profile strictness.
pub fn keto_rule_set(profile: &DietProfile) -> DietRuleSet {
    let generic = generic_constraint_type(profile);
    let mut rules = base_rule_set(DietKey::Keto, profile);

    rules.ingredient_constraints.push(forbid_categories(
        &[
            categories::GRAINS,
            categories::STARCHY_VEGETABLES,
            categories::PROCESSED_SUGAR,
            categories::LEGUMES,
            categories::HIGH_SUGAR_FRUIT,
        ],
        ConstraintType::Hard,
    ));
    rules
        .ingredient_constraints
        .push(allow_categories(&[HEALTHY_FATS, categories::MEAT, categories::FISH], generic));

    let mut ceiling = MacroConstraint::new(MacroScope::Daily, ConstraintType::Hard);
    ceiling.max_carbs_g = Some(KETO_MAX_NET_CARBS_G);
    rules.macro_constraints.push(ceiling);

    let mut per_meal = MacroConstraint::new(MacroScope::PerMeal, generic);
    per_meal.min_fat_g = Some(15.0);
    per_meal.allowed_types = vec!["high_fat".into(), "moderate_protein".into()];
    per_meal.forbidden_types = vec!["high_carb".into(), "sugary".into()];
    rules.macro_constraints.push(per_meal);

    rules.required_categories.push(per_day(HEALTHY_FATS, 1, generic));

    for slot in [MealSlot::Lunch, MealSlot::Dinner] {
        rules.per_meal_constraints.push(protein_floor(slot, 20.0, generic));
    }

    rules.meal_structure.push(meal_count(2, 4, generic));

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use diet_guard_types::{IngredientConstraintKind, Strictness};

    #[test]
    fn keto_bans_starch_and_sugar_hard() {
        let profile = DietProfile::new(DietKey::Keto).with_strictness(Strictness::Flexible);
        let rules = keto_rule_set(&profile);
        let ban = rules.forbidden().find(|c| !c.categories.is_empty()).unwrap();
        assert_eq!(ban.constraint_type, ConstraintType::Hard);
        for category in [categories::GRAINS, categories::STARCHY_VEGETABLES, categories::HIGH_SUGAR_FRUIT] {
            assert!(ban.categories.iter().any(|c| c == category), "{category}");
        }
    }

    #[test]
    fn keto_allow_list_is_not_a_ban() {
        let rules = keto_rule_set(&DietProfile::new(DietKey::Keto));
        let allowed = rules
            .ingredient_constraints
            .iter()
            .filter(|c| c.kind == IngredientConstraintKind::Allowed)
            .count();
        assert_eq!(allowed, 1);
        assert!(rules.forbidden().all(|c| !c.categories.contains(&HEALTHY_FATS.to_string())));
    }

    #[test]
    fn keto_per_meal_fat_follows_strictness() {
        let flexible = keto_rule_set(&DietProfile::new(DietKey::Keto).with_strictness(Strictness::Flexible));
        let per_meal = flexible
            .macro_constraints
            .iter()
            .find(|m| m.scope == MacroScope::PerMeal)
            .unwrap();
        assert_eq!(per_meal.min_fat_g, Some(15.0));
        assert_eq!(per_meal.constraint_type, ConstraintType::Soft);
    }
}
