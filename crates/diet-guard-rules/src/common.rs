//! Profile-level constraints shared by every diet builder.

use diet_guard_types::{
    CalorieConstraint, ConstraintOrigin, ConstraintType, DietKey, DietProfile, DietRuleSet,
    IngredientConstraint, IngredientConstraintKind, MacroConstraint, MacroScope, MealSlot,
    MealStructureConstraint, MealStructureRule, PerMealConstraint, PrepTimeConstraint,
    RequiredCategory, WeeklyVariety,
};

use crate::categories::{normalize_term, owned_terms};
use crate::variety::variety_thresholds;

/// Constraint type for everything that is not allergy or diet identity.
pub fn generic_constraint_type(profile: &DietProfile) -> ConstraintType {
    profile.strictness.into()
}

/// Start a rule set for `diet` with the profile-level constraints every
/// builder carries: allergies (hard), dislikes (generic), variety, calorie
/// and macro targets, prep time, budget and pantry hints.
pub(crate) fn base_rule_set(diet: DietKey, profile: &DietProfile) -> DietRuleSet {
    let generic = generic_constraint_type(profile);
    let variety = variety_thresholds(diet, profile.variety_level);

    let mut ingredient_constraints = Vec::new();
    for allergy in terms(&profile.allergies) {
        ingredient_constraints.push(IngredientConstraint {
            kind: IngredientConstraintKind::Forbidden,
            origin: ConstraintOrigin::Allergy,
            items: vec![allergy],
            categories: Vec::new(),
            constraint_type: ConstraintType::Hard,
        });
    }
    for dislike in terms(&profile.dislikes) {
        ingredient_constraints.push(IngredientConstraint {
            kind: IngredientConstraintKind::Forbidden,
            origin: ConstraintOrigin::Dislike,
            items: vec![dislike],
            categories: Vec::new(),
            constraint_type: generic,
        });
    }

    let mut macro_constraints = Vec::new();
    if let Some(targets) = &profile.macro_targets {
        let mut daily = MacroConstraint::new(MacroScope::Daily, generic);
        daily.min_protein_g = targets.protein.as_ref().and_then(|r| r.min);
        daily.max_carbs_g = targets.carbs.as_ref().and_then(|r| r.max);
        daily.min_fat_g = targets.fat.as_ref().and_then(|r| r.min);
        if daily.min_protein_g.is_some() || daily.max_carbs_g.is_some() || daily.min_fat_g.is_some()
        {
            macro_constraints.push(daily);
        }
    }

    let calorie_target = (!profile.calorie_target.is_empty()).then(|| CalorieConstraint {
        target: profile.calorie_target.clone(),
        constraint_type: generic,
    });

    let prep = &profile.prep_time;
    let prep_time = (!prep.is_empty()).then(|| PrepTimeConstraint {
        max_minutes: prep.max_minutes,
        breakfast: prep.breakfast,
        lunch: prep.lunch,
        dinner: prep.dinner,
        batch_cooking: prep.batch_cooking,
        constraint_type: generic,
    });

    DietRuleSet {
        diet_key: diet,
        ingredient_constraints,
        required_categories: Vec::new(),
        per_meal_constraints: Vec::new(),
        weekly_variety: WeeklyVariety {
            max_repeats: variety.max_repeats,
            min_unique_meals: variety.min_unique_meals,
            exclude_near_duplicates: variety.exclude_near_duplicates,
            constraint_type: generic,
        },
        macro_constraints,
        meal_structure: Vec::new(),
        calorie_target,
        prep_time,
        budget: profile.budget,
        pantry_priority: profile.pantry_priority,
    }
}

fn terms(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for term in raw.iter().map(|t| normalize_term(t)) {
        if !term.is_empty() && !out.contains(&term) {
            out.push(term);
        }
    }
    out
}

/// Diet-level category ban.
pub(crate) fn forbid_categories(categories: &[&str], constraint_type: ConstraintType) -> IngredientConstraint {
    IngredientConstraint {
        kind: IngredientConstraintKind::Forbidden,
        origin: ConstraintOrigin::Diet,
        items: Vec::new(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        constraint_type,
    }
}

/// Diet-level allow list. Carried for the meal generator; guardrails do
/// not enforce allow lists.
pub(crate) fn allow_categories(categories: &[&str], constraint_type: ConstraintType) -> IngredientConstraint {
    IngredientConstraint {
        kind: IngredientConstraintKind::Allowed,
        origin: ConstraintOrigin::Diet,
        items: Vec::new(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        constraint_type,
    }
}

pub(crate) fn per_day(category: &str, min: u32, constraint_type: ConstraintType) -> RequiredCategory {
    RequiredCategory {
        category: category.to_string(),
        min_per_day: Some(min),
        min_per_week: None,
        items: owned_terms(category),
        constraint_type,
    }
}

pub(crate) fn per_week(category: &str, min: u32, constraint_type: ConstraintType) -> RequiredCategory {
    RequiredCategory {
        category: category.to_string(),
        min_per_day: None,
        min_per_week: Some(min),
        items: owned_terms(category),
        constraint_type,
    }
}

pub(crate) fn protein_floor(slot: MealSlot, grams: f64, constraint_type: ConstraintType) -> PerMealConstraint {
    PerMealConstraint {
        slot,
        min_protein_g: Some(grams),
        min_carbs_g: None,
        min_fat_g: None,
        max_calories: None,
        required_categories: Vec::new(),
        constraint_type,
    }
}

pub(crate) fn meal_count(min: u32, max: u32, constraint_type: ConstraintType) -> MealStructureConstraint {
    MealStructureConstraint {
        rule: MealStructureRule::MealCount {
            min_per_day: min,
            max_per_day: max,
        },
        constraint_type,
    }
}
