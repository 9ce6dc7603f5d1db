use diet_guard_types::{ConstraintType, DietKey, DietProfile, DietRuleSet, MealSlot};

use crate::categories::{self, LEGUMES};
use crate::common::{
    base_rule_set, forbid_categories, generic_constraint_type, meal_count, per_day,
    protein_floor,
};

/// Vegan diet. Animal products are hard bans; legumes daily for protein.
pub fn vegan_rule_set(profile: &DietProfile) -> DietRuleSet {
    let generic = generic_constraint_type(profile);
    let mut rules = base_rule_set(DietKey::Vegan, profile);

    rules.ingredient_constraints.push(forbid_categories(
        &[
            categories::MEAT,
            categories::FISH,
            categories::DAIRY,
            categories::EGGS,
            categories::HONEY,
        ],
        ConstraintType::Hard,
    ));

    rules.required_categories.push(per_day(LEGUMES, 1, generic));

    for slot in [MealSlot::Lunch, MealSlot::Dinner] {
        rules.per_meal_constraints.push(protein_floor(slot, 15.0, generic));
    }

    rules.meal_structure.push(meal_count(3, 5, generic));

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use diet_guard_types::Strictness;

    #[test]
    fn animal_products_always_hard() {
        for strictness in [Strictness::Strict, Strictness::Flexible] {
            let rules = vegan_rule_set(&DietProfile::new(DietKey::Vegan).with_strictness(strictness));
            let ban = rules.forbidden().find(|c| !c.categories.is_empty()).unwrap();
            assert_eq!(ban.constraint_type, ConstraintType::Hard);
            assert_eq!(ban.categories.len(), 5);
        }
    }
}
