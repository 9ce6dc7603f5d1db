use chrono::NaiveTime;
use diet_guard_types::{
    ConstraintType, DietKey, DietProfile, DietRuleSet, MacroConstraint, MacroScope, MealSlot,
    MealStructureConstraint, MealStructureRule, VegetableCupsRequirement, VegetableQuota,
};

use crate::categories::{
    self, owned_terms, COLORED_VEGETABLES, LEAFY_GREENS, ORGAN_MEAT, SULFUR_VEGETABLES,
};
use crate::common::{
    base_rule_set, forbid_categories, generic_constraint_type, meal_count, per_week,
    protein_floor,
};

const DAILY_VEGETABLE_CUPS: f64 = 9.0;

/// Wahls Paleo Plus.
///
/// Therapeutic protocol:
/// - grains, dairy, legumes and processed sugar are hard bans
/// - 9 cups of vegetables a day: 3 leafy, 3 sulfur-rich, 3 colored (hard)
/// - organ meat twice a week
/// - moderate daily carbohydrates, protein at every main meal
/// - two or three meals, dinner not too late
pub fn wahls_paleo_plus_rule_set(profile: &DietProfile) -> DietRuleSet {
    let generic = generic_constraint_type(profile);
    let mut rules = base_rule_set(DietKey::WahlsPaleoPlus, profile);

    rules.ingredient_constraints.push(forbid_categories(
        &[
            categories::GRAINS,
            categories::DAIRY,
            categories::LEGUMES,
            categories::PROCESSED_SUGAR,
        ],
        ConstraintType::Hard,
    ));

    rules.required_categories.push(per_week(ORGAN_MEAT, 2, generic));

    for slot in [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner] {
        rules.per_meal_constraints.push(protein_floor(slot, 20.0, generic));
    }

    let mut daily = MacroConstraint::new(MacroScope::Daily, generic);
    daily.max_carbs_g = Some(75.0);
    rules.macro_constraints.push(daily);

    rules.meal_structure.push(MealStructureConstraint {
        rule: MealStructureRule::VegetableCups(vegetable_cups()),
        constraint_type: ConstraintType::Hard,
    });
    rules.meal_structure.push(meal_count(2, 3, generic));
    rules.meal_structure.push(MealStructureConstraint {
        rule: MealStructureRule::MealTiming {
            slot: MealSlot::Dinner,
            earliest: hm(16, 0),
            latest: hm(20, 0),
        },
        constraint_type: generic,
    });

    rules
}

fn vegetable_cups() -> VegetableCupsRequirement {
    let quota = |name: &str, grams_per_cup: f64| VegetableQuota {
        name: name.to_string(),
        cups: 3.0,
        grams_per_cup,
        vegetables: owned_terms(name),
    };
    VegetableCupsRequirement {
        total_cups: DAILY_VEGETABLE_CUPS,
        quotas: vec![
            quota(LEAFY_GREENS, 30.0),
            quota(SULFUR_VEGETABLES, 90.0),
            quota(COLORED_VEGETABLES, 90.0),
        ],
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}
