//! Household diet profile
//!
//! A profile is the input to rule derivation. It is edited through the
//! household settings forms and is never mutated by the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Diet selected by the household.
///
/// Unknown keys map to [`DietKey::Balanced`] rather than failing, so a
/// profile written by a newer client still derives a usable rule set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DietKey {
    /// Therapeutic paleo protocol (Wahls Paleo Plus)
    WahlsPaleoPlus,
    Keto,
    Mediterranean,
    Vegan,
    /// Generic fallback diet
    Balanced,
}

impl DietKey {
    pub const ALL: [DietKey; 5] = [
        DietKey::WahlsPaleoPlus,
        DietKey::Keto,
        DietKey::Mediterranean,
        DietKey::Vegan,
        DietKey::Balanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DietKey::WahlsPaleoPlus => "wahls_paleo_plus",
            DietKey::Keto => "keto",
            DietKey::Mediterranean => "mediterranean",
            DietKey::Vegan => "vegan",
            DietKey::Balanced => "balanced",
        }
    }

    /// Parse a stored diet key. Never fails: unrecognized keys are balanced.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "wahls_paleo_plus" | "wahls_paleo" | "wahls" => DietKey::WahlsPaleoPlus,
            "keto" | "ketogenic" => DietKey::Keto,
            "mediterranean" => DietKey::Mediterranean,
            "vegan" => DietKey::Vegan,
            _ => DietKey::Balanced,
        }
    }
}

impl From<String> for DietKey {
    fn from(raw: String) -> Self {
        DietKey::parse(&raw)
    }
}

impl From<DietKey> for String {
    fn from(key: DietKey) -> Self {
        key.as_str().to_string()
    }
}

impl fmt::Display for DietKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strictly generic constraints are enforced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    #[default]
    Strict,
    Flexible,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarietyLevel {
    Low,
    #[default]
    Std,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetLevel {
    Low,
    Medium,
    High,
}

/// Meal slot within a day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily calorie target range (kcal).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalorieTarget {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub target: Option<f64>,
}

impl CalorieTarget {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.target.is_none()
    }
}

/// Gram range for a single macronutrient.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub target: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroTargets {
    pub protein: Option<MacroRange>,
    pub carbs: Option<MacroRange>,
    pub fat: Option<MacroRange>,
}

/// Prep-time preferences in minutes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepTimePreferences {
    pub max_minutes: Option<u32>,
    pub breakfast: Option<u32>,
    pub lunch: Option<u32>,
    pub dinner: Option<u32>,
    pub batch_cooking: bool,
}

impl PrepTimePreferences {
    pub fn is_empty(&self) -> bool {
        self.max_minutes.is_none()
            && self.breakfast.is_none()
            && self.lunch.is_none()
            && self.dinner.is_none()
    }

    /// Minutes allowed for a slot, falling back to the global maximum.
    pub fn limit_for(&self, slot: MealSlot) -> Option<u32> {
        let per_slot = match slot {
            MealSlot::Breakfast => self.breakfast,
            MealSlot::Lunch => self.lunch,
            MealSlot::Dinner => self.dinner,
            MealSlot::Snack => None,
        };
        per_slot.or(self.max_minutes)
    }
}

/// Household-level diet selection and preferences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DietProfile {
    pub diet_key: DietKey,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub dislikes: Vec<String>,
    #[serde(default)]
    pub calorie_target: CalorieTarget,
    #[serde(default)]
    pub macro_targets: Option<MacroTargets>,
    #[serde(default)]
    pub prep_time: PrepTimePreferences,
    #[serde(default)]
    pub budget: Option<BudgetLevel>,
    #[serde(default)]
    pub pantry_priority: Option<bool>,
    #[serde(default = "default_servings")]
    pub servings: u32,
    #[serde(default)]
    pub variety_level: VarietyLevel,
    #[serde(default)]
    pub strictness: Strictness,
    #[serde(default)]
    pub meal_preferences: BTreeMap<MealSlot, Vec<String>>,
}

fn default_servings() -> u32 {
    1
}

impl DietProfile {
    /// A profile with only a diet selected and every preference at its default.
    pub fn new(diet_key: DietKey) -> Self {
        Self {
            diet_key,
            allergies: Vec::new(),
            dislikes: Vec::new(),
            calorie_target: CalorieTarget::default(),
            macro_targets: None,
            prep_time: PrepTimePreferences::default(),
            budget: None,
            pantry_priority: None,
            servings: default_servings(),
            variety_level: VarietyLevel::default(),
            strictness: Strictness::default(),
            meal_preferences: BTreeMap::new(),
        }
    }

    pub fn with_allergy(mut self, allergy: impl Into<String>) -> Self {
        self.allergies.push(allergy.into());
        self
    }

    pub fn with_dislike(mut self, dislike: impl Into<String>) -> Self {
        self.dislikes.push(dislike.into());
        self
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn with_variety(mut self, level: VarietyLevel) -> Self {
        self.variety_level = level;
        self
    }

    pub fn with_calorie_target(mut self, target: CalorieTarget) -> Self {
        self.calorie_target = target;
        self
    }

    pub fn with_prep_time(mut self, prep_time: PrepTimePreferences) -> Self {
        self.prep_time = prep_time;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_diet_key_is_balanced() {
        assert_eq!(DietKey::parse("paleo-zone-9000"), DietKey::Balanced);
        assert_eq!(DietKey::parse(""), DietKey::Balanced);
        assert_eq!(DietKey::parse("Wahls-Paleo-Plus"), DietKey::WahlsPaleoPlus);
    }

    #[test]
    fn diet_key_serde_falls_back() {
        let key: DietKey = serde_json::from_str("\"carnivore\"").unwrap();
        assert_eq!(key, DietKey::Balanced);
        let json = serde_json::to_string(&DietKey::Keto).unwrap();
        assert_eq!(json, "\"keto\"");
    }

    #[test]
    fn profile_defaults_from_minimal_json() {
        let profile: DietProfile = serde_json::from_str(r#"{"diet_key":"vegan"}"#).unwrap();
        assert_eq!(profile.diet_key, DietKey::Vegan);
        assert_eq!(profile.servings, 1);
        assert_eq!(profile.strictness, Strictness::Strict);
        assert_eq!(profile.variety_level, VarietyLevel::Std);
        assert!(profile.allergies.is_empty());
    }

    #[test]
    fn prep_limit_falls_back_to_global() {
        let prefs = PrepTimePreferences {
            max_minutes: Some(45),
            breakfast: Some(10),
            ..Default::default()
        };
        assert_eq!(prefs.limit_for(MealSlot::Breakfast), Some(10));
        assert_eq!(prefs.limit_for(MealSlot::Dinner), Some(45));
    }
}
