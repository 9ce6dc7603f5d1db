//! # diet-guard-types
//!
//! Shared vocabulary for the diet guardrails engine.
//!
//! - [`DietProfile`]: household diet selection and stated preferences
//! - [`DietRuleSet`]: the machine-checkable guard-rail bundle derived from a profile
//! - [`MealPlanSnapshot`]: the candidate plan a ruleset is evaluated against
//! - [`ContentHash`]: BLAKE3 digest used to version rulesets
//!
//! Everything here is plain data. Derivation lives in `diet-guard-rules`,
//! evaluation in `diet-guard-core`.

pub mod hash;
pub mod plan;
pub mod profile;
pub mod ruleset;

pub use hash::{ContentHash, ContentHashError};
pub use plan::{IngredientRef, MacroTotals, MealPlanSnapshot, PlanDay, PlannedMeal};
pub use profile::{
    BudgetLevel, CalorieTarget, DietKey, DietProfile, MacroRange, MacroTargets, MealSlot,
    PrepTimePreferences, Strictness, VarietyLevel,
};
pub use ruleset::{
    CalorieConstraint, ConstraintOrigin, ConstraintType, DietRuleSet, IngredientConstraint,
    IngredientConstraintKind, MacroConstraint, MacroScope, MealStructureConstraint,
    MealStructureRule, PerMealConstraint, PrepTimeConstraint, RequiredCategory,
    VegetableCupsRequirement, VegetableQuota, WeeklyVariety,
};
