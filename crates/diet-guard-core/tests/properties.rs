//! Property tests for the guardrails evaluator.

use chrono::NaiveDate;
use diet_guard_core::{
    codes, evaluate_guardrails, extract_targets, EvaluationContext, ExcludeOverride, GuardRule,
    GuardRuleSet, IngredientMatcher, Outcome, RuleCheck, RuleSource,
};
use diet_guard_types::{
    ConstraintType, DietKey, IngredientRef, MealPlanSnapshot, MealSlot, PlanDay, PlannedMeal,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

const VOCAB: &[&str] = &[
    "rijst",
    "witte rijst",
    "aardappel",
    "zoete aardappel",
    "kaas",
    "melk",
    "spinazie",
    "bloem",
    "zalm",
    "honing",
];

/// Generate an ingredient text from a fixed vocabulary.
fn arb_ingredient() -> impl Strategy<Value = String> {
    prop::sample::select(VOCAB).prop_map(str::to_string)
}

/// Generate a strictness.
fn arb_strictness() -> impl Strategy<Value = ConstraintType> {
    prop_oneof![Just(ConstraintType::Hard), Just(ConstraintType::Soft)]
}

/// Generate ingredient rules with unique ids.
fn arb_rules() -> impl Strategy<Value = Vec<GuardRule>> {
    prop::collection::vec((arb_ingredient(), arb_strictness(), 0u32..1000), 0..8).prop_map(
        |specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (term, strictness, priority))| {
                    ban(&format!("rule-{i}"), &term, strictness, priority)
                })
                .collect()
        },
    )
}

/// Generate a plan of one to three days with a few meals each.
fn arb_plan() -> impl Strategy<Value = MealPlanSnapshot> {
    prop::collection::vec(
        prop::collection::vec(prop::collection::vec(arb_ingredient(), 0..4), 0..3),
        1..4,
    )
    .prop_map(|days| {
        days.into_iter()
            .enumerate()
            .fold(MealPlanSnapshot::new("prop-plan"), |plan, (d, meals)| {
                let date = NaiveDate::from_ymd_opt(2026, 3, 2 + d as u32).unwrap();
                let day = meals.into_iter().enumerate().fold(PlanDay::new(date), |day, (m, items)| {
                    let meal = items.into_iter().fold(
                        PlannedMeal::new(format!("m{d}-{m}"), MealSlot::Dinner, "Avondeten"),
                        |meal, i| meal.with_ingredient(IngredientRef::named(i)),
                    );
                    day.with_meal(meal)
                });
                plan.with_day(day)
            })
    })
}

/// Generate overrides that exempt a term when a longer phrase is present.
fn arb_overrides() -> impl Strategy<Value = Vec<ExcludeOverride>> {
    prop::collection::vec((arb_ingredient(), arb_ingredient(), any::<bool>()), 0..4).prop_map(
        |specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (term, phrase, active))| {
                    let o = ExcludeOverride::new(format!("ovr-{i}"), term, [phrase]);
                    if active {
                        o
                    } else {
                        o.deactivated()
                    }
                })
                .collect()
        },
    )
}

fn ban(id: &str, term: &str, strictness: ConstraintType, priority: u32) -> GuardRule {
    GuardRule::new(
        id,
        RuleSource::Admin,
        strictness,
        priority,
        RuleCheck::Ingredient(IngredientMatcher::terms([term])),
        codes::FORBIDDEN_INGREDIENT,
        term,
    )
}

fn evaluate(
    rules: Vec<GuardRule>,
    plan: &MealPlanSnapshot,
    ctx: &EvaluationContext,
) -> diet_guard_core::GuardrailsDecision {
    let set = GuardRuleSet::new(DietKey::Balanced, rules, 1).unwrap();
    evaluate_guardrails(&set, ctx, &extract_targets(plan))
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Blocked exactly when an applied hard match exists; ok mirrors it.
    #[test]
    fn outcome_follows_applied_strictness(
        rules in arb_rules(),
        plan in arb_plan(),
        overrides in arb_overrides(),
    ) {
        let ctx = EvaluationContext::new(DietKey::Balanced).with_overrides(overrides);
        let d = evaluate(rules, &plan, &ctx);

        let any_hard = d.applied_matches().any(|m| m.is_hard());
        let any_applied = d.applied_matches().next().is_some();
        prop_assert_eq!(d.outcome == Outcome::Blocked, any_hard);
        prop_assert_eq!(d.outcome == Outcome::Allowed, !any_applied);
        prop_assert_eq!(d.ok, !d.is_blocked());
        prop_assert!(d.counts.applied <= d.counts.matches);
        prop_assert_eq!(d.counts.matches, d.matches.len());
        prop_assert_eq!(d.reason_codes.is_empty(), !any_applied);
    }

    /// Adding rules can only raise the outcome.
    #[test]
    fn extra_rules_never_relax_outcome(
        rules in arb_rules(),
        extra_term in arb_ingredient(),
        strictness in arb_strictness(),
        plan in arb_plan(),
    ) {
        let ctx = EvaluationContext::new(DietKey::Balanced);
        let before = evaluate(rules.clone(), &plan, &ctx);

        let mut more = rules;
        more.push(ban("extra", &extra_term, strictness, 500));
        let after = evaluate(more, &plan, &ctx);

        prop_assert!(after.outcome >= before.outcome);
        prop_assert!(after.counts.applied >= before.counts.applied);
    }

    /// A hard rule on an ingredient already in the plan always blocks.
    #[test]
    fn hard_rule_on_present_ingredient_blocks(
        rules in arb_rules(),
        plan in arb_plan(),
        pick in any::<prop::sample::Index>(),
    ) {
        let present: Vec<String> = plan
            .days
            .iter()
            .flat_map(|d| d.meals.iter())
            .flat_map(|m| m.ingredient_refs.iter())
            .map(|r| r.display_name.clone())
            .collect();
        prop_assume!(!present.is_empty());
        let term = pick.get(&present).clone();

        let mut more = rules;
        more.push(ban("hard-extra", &term, ConstraintType::Hard, 999));
        let d = evaluate(more, &plan, &EvaluationContext::new(DietKey::Balanced));
        prop_assert_eq!(d.outcome, Outcome::Blocked);
        prop_assert!(!d.ok);
    }

    /// Overrides only ever suppress; they never add matches or raise the outcome.
    #[test]
    fn overrides_never_add_violations(
        rules in arb_rules(),
        plan in arb_plan(),
        overrides in arb_overrides(),
    ) {
        let bare = evaluate(rules.clone(), &plan, &EvaluationContext::new(DietKey::Balanced));
        let ctx = EvaluationContext::new(DietKey::Balanced).with_overrides(overrides);
        let with = evaluate(rules, &plan, &ctx);

        prop_assert_eq!(with.counts.matches, bare.counts.matches);
        prop_assert!(with.counts.applied <= bare.counts.applied);
        prop_assert!(with.outcome <= bare.outcome);
    }

    /// Same inputs, same decision.
    #[test]
    fn evaluation_is_deterministic(
        rules in arb_rules(),
        plan in arb_plan(),
        overrides in arb_overrides(),
    ) {
        let ctx = EvaluationContext::new(DietKey::Balanced).with_overrides(overrides);
        let a = evaluate(rules.clone(), &plan, &ctx);
        let b = evaluate(rules, &plan, &ctx);
        prop_assert_eq!(a, b);
    }

    /// The content hash does not depend on the order rules were supplied in.
    #[test]
    fn content_hash_ignores_insertion_order(rules in arb_rules()) {
        let mut reversed = rules.clone();
        reversed.reverse();
        let a = GuardRuleSet::new(DietKey::Keto, rules, 3).unwrap();
        let b = GuardRuleSet::new(DietKey::Keto, reversed, 3).unwrap();
        prop_assert_eq!(a.content_hash, b.content_hash);
        prop_assert_eq!(a.rules(), b.rules());
    }
}
