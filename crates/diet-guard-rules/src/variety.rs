//! Weekly variety thresholds per diet and variety level.
//!
//! The numbers are a lookup table, not a formula: each diet tunes its own
//! repeat and uniqueness limits.

use diet_guard_types::{DietKey, VarietyLevel};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarietyThresholds {
    pub max_repeats: u32,
    pub min_unique_meals: u32,
    pub exclude_near_duplicates: bool,
}

const fn t(max_repeats: u32, min_unique_meals: u32, exclude_near_duplicates: bool) -> VarietyThresholds {
    VarietyThresholds {
        max_repeats,
        min_unique_meals,
        exclude_near_duplicates,
    }
}

pub fn variety_thresholds(diet: DietKey, level: VarietyLevel) -> VarietyThresholds {
    use VarietyLevel::*;
    match (diet, level) {
        (DietKey::WahlsPaleoPlus, Low) => t(3, 5, false),
        (DietKey::WahlsPaleoPlus, Std) => t(2, 7, false),
        (DietKey::WahlsPaleoPlus, High) => t(1, 10, true),

        // Keto menus lean on a smaller pool of compliant recipes.
        (DietKey::Keto, Low) => t(3, 4, false),
        (DietKey::Keto, Std) => t(2, 6, false),
        (DietKey::Keto, High) => t(1, 8, true),

        (DietKey::Mediterranean, Low) => t(3, 5, false),
        (DietKey::Mediterranean, Std) => t(2, 8, false),
        (DietKey::Mediterranean, High) => t(1, 12, true),

        (DietKey::Vegan, Low) => t(3, 5, false),
        (DietKey::Vegan, Std) => t(2, 7, false),
        (DietKey::Vegan, High) => t(1, 10, true),

        (DietKey::Balanced, Low) => t(3, 5, false),
        (DietKey::Balanced, Std) => t(2, 7, false),
        (DietKey::Balanced, High) => t(1, 10, true),
    }
}
