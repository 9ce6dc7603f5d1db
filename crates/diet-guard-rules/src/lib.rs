//! # diet-guard-rules
//!
//! Rule derivation: maps a household [`DietProfile`] to a concrete,
//! machine-checkable [`DietRuleSet`].
//!
//! ## Diets
//!
//! - **Wahls Paleo Plus**: therapeutic protocol. Grains, dairy, legumes and
//!   processed sugar are always hard bans; 9 vegetable cups a day split
//!   3/3/3 across leafy, sulfur-rich and colored vegetables.
//! - **Keto**: carbohydrate categories are hard bans and the daily net
//!   carbohydrate ceiling is a fixed hard 20 g.
//! - **Mediterranean**: fish, vegetables and olive oil requirements,
//!   processed meat and sugar discouraged.
//! - **Vegan**: animal products are hard bans.
//! - **Balanced**: generic fallback, also used for unrecognized diet keys.
//!
//! ## Strictness
//!
//! Allergies are always hard. Diet-intrinsic bans are always hard. Every
//! other constraint follows the profile: `strict` resolves to hard,
//! `flexible` to soft.
//!
//! Derivation is pure and deterministic; see [`derive_diet_rule_set`].

use diet_guard_types::{DietKey, DietProfile, DietRuleSet};
use tracing::debug;

pub mod categories;
pub mod common;
pub mod diets;
pub mod variety;

pub use categories::{category_terms, normalize_term, term_exclusions};
pub use common::generic_constraint_type;
pub use diets::{
    balanced_rule_set, keto_rule_set, mediterranean_rule_set, vegan_rule_set,
    wahls_paleo_plus_rule_set, KETO_MAX_NET_CARBS_G,
};
pub use variety::{variety_thresholds, VarietyThresholds};

/// Derive the rule set for a profile.
///
/// Dispatches on the profile's diet key. The match is exhaustive, so adding
/// a diet key without a builder fails to compile; unrecognized stored keys
/// already arrive here as [`DietKey::Balanced`].
pub fn derive_diet_rule_set(profile: &DietProfile) -> DietRuleSet {
    let rule_set = match profile.diet_key {
        DietKey::WahlsPaleoPlus => wahls_paleo_plus_rule_set(profile),
        DietKey::Keto => keto_rule_set(profile),
        DietKey::Mediterranean => mediterranean_rule_set(profile),
        DietKey::Vegan => vegan_rule_set(profile),
        DietKey::Balanced => balanced_rule_set(profile),
    };

    debug!(
        diet = %rule_set.diet_key,
        ingredient_constraints = rule_set.ingredient_constraints.len(),
        required_categories = rule_set.required_categories.len(),
        structure_rules = rule_set.meal_structure.len(),
        "Derived diet rule set"
    );

    rule_set
}
