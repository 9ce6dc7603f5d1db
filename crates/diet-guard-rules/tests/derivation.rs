//! Property tests for rule derivation.

use diet_guard_rules::derive_diet_rule_set;
use diet_guard_types::{
    ConstraintOrigin, ConstraintType, DietKey, DietProfile, IngredientConstraintKind, MacroScope,
    MealStructureRule, Strictness, VarietyLevel,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn arb_diet_key() -> impl Strategy<Value = DietKey> {
    prop::sample::select(DietKey::ALL.to_vec())
}

fn arb_strictness() -> impl Strategy<Value = Strictness> {
    prop_oneof![Just(Strictness::Strict), Just(Strictness::Flexible)]
}

fn arb_variety() -> impl Strategy<Value = VarietyLevel> {
    prop_oneof![
        Just(VarietyLevel::Low),
        Just(VarietyLevel::Std),
        Just(VarietyLevel::High)
    ]
}

fn arb_term() -> impl Strategy<Value = String> {
    "[a-z]{3,10}( [a-z]{3,8})?"
}

fn arb_profile() -> impl Strategy<Value = DietProfile> {
    (
        arb_diet_key(),
        arb_strictness(),
        arb_variety(),
        prop::collection::vec(arb_term(), 0..4),
        prop::collection::vec(arb_term(), 0..4),
    )
        .prop_map(|(key, strictness, variety, allergies, dislikes)| {
            let mut profile = DietProfile::new(key)
                .with_strictness(strictness)
                .with_variety(variety);
            profile.allergies = allergies;
            profile.dislikes = dislikes;
            profile
        })
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn derivation_is_deterministic(profile in arb_profile()) {
        prop_assert_eq!(derive_diet_rule_set(&profile), derive_diet_rule_set(&profile));
    }

    #[test]
    fn every_allergy_is_a_hard_ban(profile in arb_profile()) {
        let rules = derive_diet_rule_set(&profile);
        for allergy in &profile.allergies {
            let found = rules.ingredient_constraints.iter().any(|c| {
                c.origin == ConstraintOrigin::Allergy
                    && c.kind == IngredientConstraintKind::Forbidden
                    && c.constraint_type == ConstraintType::Hard
                    && c.items.contains(allergy)
            });
            prop_assert!(found, "allergy {} missing", allergy);
        }
    }

    #[test]
    fn generic_constraints_follow_strictness(profile in arb_profile()) {
        let expected = ConstraintType::from(profile.strictness);
        let rules = derive_diet_rule_set(&profile);

        prop_assert_eq!(rules.weekly_variety.constraint_type, expected);
        for c in &rules.per_meal_constraints {
            prop_assert_eq!(c.constraint_type, expected);
        }
        for c in rules.ingredient_constraints.iter().filter(|c| c.origin == ConstraintOrigin::Dislike) {
            prop_assert_eq!(c.constraint_type, expected);
        }
        for c in &rules.required_categories {
            prop_assert_eq!(c.constraint_type, expected);
        }
    }

    #[test]
    fn intrinsic_rules_stay_hard(profile in arb_profile()) {
        let rules = derive_diet_rule_set(&profile);
        for m in &rules.meal_structure {
            if matches!(m.rule, MealStructureRule::VegetableCups(_)) {
                prop_assert_eq!(m.constraint_type, ConstraintType::Hard);
            }
        }
        if profile.diet_key == DietKey::Keto {
            let hard_ceiling = rules.macro_constraints.iter().any(|m| {
                m.scope == MacroScope::Daily
                    && m.max_carbs_g == Some(20.0)
                    && m.constraint_type == ConstraintType::Hard
            });
            prop_assert!(hard_ceiling);
        }
        prop_assert!(rules.vegetable_cup_rules() <= 1);
    }
}
