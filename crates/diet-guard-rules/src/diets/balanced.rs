use diet_guard_types::{DietKey, DietProfile, DietRuleSet, MealSlot};

use crate::categories::VEGETABLES;
use crate::common::{base_rule_set, generic_constraint_type, meal_count, per_week, protein_floor};

/// Balanced diet, also the fallback for unrecognized diet keys.
///
/// No category bans. Only profile-level constraints plus mild protein
/// floors and a weekly vegetable requirement.
pub fn balanced_rule_set(profile: &DietProfile) -> DietRuleSet {
    let generic = generic_constraint_type(profile);
    let mut rules = base_rule_set(DietKey::Balanced, profile);

    for (slot, grams) in [
        (MealSlot::Breakfast, 10.0),
        (MealSlot::Lunch, 15.0),
        (MealSlot::Dinner, 20.0),
    ] {
        rules.per_meal_constraints.push(protein_floor(slot, grams, generic));
    }

    rules.required_categories.push(per_week(VEGETABLES, 5, generic));
    rules.meal_structure.push(meal_count(3, 5, generic));

    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_has_no_diet_bans() {
        let rules = balanced_rule_set(&DietProfile::new(DietKey::Balanced));
        assert_eq!(rules.forbidden().count(), 0);
        assert_eq!(rules.per_meal_constraints.len(), 3);
    }

    #[test]
    fn unknown_key_routes_here() {
        let profile: DietProfile =
            serde_json::from_str(r#"{"diet_key":"zone","dislikes":["spruitjes"]}"#).unwrap();
        assert_eq!(profile.diet_key, DietKey::Balanced);
        let rules = crate::derive_diet_rule_set(&profile);
        assert_eq!(rules, balanced_rule_set(&profile));
    }
}
