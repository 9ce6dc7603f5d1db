//! # diet-guard-core
//!
//! The guardrails decision procedure.
//!
//! ## Overview
//!
//! Rules from three sources are compiled into one [`GuardRule`] shape and
//! collected in a [`GuardRuleSet`]:
//!
//! - **Diet rules**: compiled from a derived [`DietRuleSet`] by
//!   [`compile_diet_rules`]
//! - **Admin rules**: admin-editable rule tables, versioned
//! - **Household rules**: [`HouseholdAvoidRule`]s at
//!   [`HOUSEHOLD_RULE_PRIORITY`], merged additively
//!
//! A meal-plan snapshot is flattened by [`extract_targets`] and checked by
//! [`evaluate_guardrails`], which returns a [`GuardrailsDecision`]:
//!
//! - `blocked` if any applied match is hard
//! - `warned` if no hard match applied but a soft one did
//! - `allowed` otherwise
//!
//! [`ExcludeOverride`]s in the [`EvaluationContext`] suppress false
//! positives for exactly the term they name.
//!
//! ## Example
//!
//! ```rust
//! use diet_guard_core::{
//!     compile_diet_rules, evaluate_guardrails, extract_targets, EvaluationContext,
//!     GuardRuleSet, Outcome,
//! };
//! use diet_guard_rules::derive_diet_rule_set;
//! use diet_guard_types::{
//!     DietKey, DietProfile, IngredientRef, MealPlanSnapshot, MealSlot, PlanDay, PlannedMeal,
//! };
//!
//! let profile = DietProfile::new(DietKey::Keto);
//! let rules = compile_diet_rules(&derive_diet_rule_set(&profile));
//! let ruleset = GuardRuleSet::new(DietKey::Keto, rules, 1).unwrap();
//!
//! let date = chrono::NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
//! let plan = MealPlanSnapshot::new("plan-1").with_day(
//!     PlanDay::new(date).with_meal(
//!         PlannedMeal::new("m1", MealSlot::Dinner, "Curry")
//!             .with_ingredient(IngredientRef::named("witte rijst").with_quantity(150.0)),
//!     ),
//! );
//!
//! let ctx = EvaluationContext::new(DietKey::Keto);
//! let decision = evaluate_guardrails(&ruleset, &ctx, &extract_targets(&plan));
//! assert_eq!(decision.outcome, Outcome::Blocked);
//! assert!(decision.has_reason("FORBIDDEN_CATEGORY_GRAINS"));
//! ```

pub mod checks;
pub mod compile;
pub mod context;
pub mod decision;
pub mod error;
pub mod evaluator;
pub mod household;
pub mod overrides;
pub mod rule;
pub mod ruleset;
pub mod targets;

pub use compile::{compile_diet_rules, BATCH_COOKING_TAG};
pub use context::{EvaluationContext, EvaluationMode};
pub use decision::{
    FlaggedIngredient, GuardrailsDecision, MatchCounts, Outcome, RuleMatch, TargetKind,
};
pub use diet_guard_types::DietRuleSet;
pub use error::{CoreError, Result};
pub use evaluator::{evaluate_guardrails, ingredient_hits, reason_histogram};
pub use household::{
    household_guard_rules, HouseholdAvoidRule, HouseholdMatchMode, HouseholdRuleType,
};
pub use overrides::ExcludeOverride;
pub use rule::{
    codes, GuardRule, IngredientMatcher, MealCheck, MealCheckKind, RuleCheck, RuleMetadata,
    RuleSource, WeekCheck, ADMIN_RULE_PRIORITY, HOUSEHOLD_RULE_PRIORITY,
};
pub use ruleset::{content_hash, GuardRuleSet};
pub use targets::{
    extract_targets, DayTarget, GuardTarget, IngredientMention, IngredientTarget, MealTarget,
    WeekTarget,
};
