//! Diet rule set compilation
//!
//! Turns a derived [`DietRuleSet`] into [`GuardRule`]s. Allowed-ingredient
//! constraints are generation hints and produce no guard rules. Rule ids
//! are stable for a given rule set so the content hash only moves when the
//! rules do.

use diet_guard_rules::{category_terms, normalize_term, term_exclusions};
use diet_guard_types::{
    ConstraintOrigin, DietRuleSet, IngredientConstraintKind, MacroConstraint, MacroScope,
    MealSlot, MealStructureRule, PrepTimeConstraint,
};

use crate::rule::{
    codes, GuardRule, IngredientMatcher, MealCheck, MealCheckKind, RuleCheck, RuleSource,
    WeekCheck, ALLERGY_RULE_PRIORITY, DIET_BAN_PRIORITY, DISLIKE_RULE_PRIORITY,
    STRUCTURE_RULE_PRIORITY, VARIETY_RULE_PRIORITY,
};

/// Tag that exempts a meal from prep-time limits when batch cooking.
pub const BATCH_COOKING_TAG: &str = "batch";

/// Terms for a category, falling back to the category name itself.
fn terms_for(category: &str) -> Vec<String> {
    let terms = category_terms(category);
    if terms.is_empty() {
        vec![normalize_term(&category.replace('_', " "))]
    } else {
        terms.iter().map(|t| t.to_string()).collect()
    }
}

/// Ban matcher for a category, carrying the vocabulary's exclusions.
fn category_matcher(category: &str) -> IngredientMatcher {
    terms_for(category)
        .into_iter()
        .fold(IngredientMatcher::default(), |matcher, term| {
            let excludes = term_exclusions(&term);
            let mut matcher = matcher.with_exclusions(term.as_str(), excludes.iter().copied());
            matcher.terms.push(term);
            matcher
        })
}

struct Compiler<'a> {
    prefix: String,
    rules: &'a DietRuleSet,
    out: Vec<GuardRule>,
}

/// Compile a diet rule set into guard rules.
pub fn compile_diet_rules(rules: &DietRuleSet) -> Vec<GuardRule> {
    let mut c = Compiler {
        prefix: format!("diet:{}", rules.diet_key),
        rules,
        out: Vec::new(),
    };
    c.ingredients();
    c.required_categories();
    c.per_meal();
    c.macros();
    c.variety();
    c.structure();
    c.calories();
    c.prep_time();
    c.out
}

impl Compiler<'_> {
    fn push(&mut self, rule: GuardRule) {
        self.out.push(rule);
    }

    fn ingredients(&mut self) {
        let rules = self.rules;
        let forbidden = rules
            .ingredient_constraints
            .iter()
            .filter(|c| c.kind == IngredientConstraintKind::Forbidden);

        for constraint in forbidden {
            for item in &constraint.items {
                let term = normalize_term(item);
                if term.is_empty() {
                    continue;
                }
                let (kind, priority, code, label) = match constraint.origin {
                    ConstraintOrigin::Allergy => (
                        "allergy",
                        ALLERGY_RULE_PRIORITY,
                        codes::ALLERGEN_PRESENT,
                        format!("Allergen: {term}"),
                    ),
                    ConstraintOrigin::Dislike => (
                        "dislike",
                        DISLIKE_RULE_PRIORITY,
                        codes::DISLIKED_INGREDIENT,
                        format!("Disliked ingredient: {term}"),
                    ),
                    ConstraintOrigin::Diet => (
                        "item",
                        DIET_BAN_PRIORITY,
                        codes::FORBIDDEN_INGREDIENT,
                        format!("Not allowed on this diet: {term}"),
                    ),
                };
                let id = format!("{}:{}:{}", self.prefix, kind, term);
                self.push(GuardRule::new(
                    id,
                    RuleSource::Diet,
                    constraint.constraint_type,
                    priority,
                    RuleCheck::Ingredient(IngredientMatcher::terms([term])),
                    code,
                    label,
                ));
            }

            for category in &constraint.categories {
                let id = format!("{}:category:{}", self.prefix, category);
                self.push(
                    GuardRule::new(
                        id,
                        RuleSource::Diet,
                        constraint.constraint_type,
                        DIET_BAN_PRIORITY,
                        RuleCheck::Ingredient(category_matcher(category)),
                        codes::forbidden_category(category),
                        format!("Forbidden category: {}", category.replace('_', " ")),
                    )
                    .with_category(category.as_str()),
                );
            }
        }
    }

    fn required_categories(&mut self) {
        let rules = self.rules;
        for req in &rules.required_categories {
            let terms = if req.items.is_empty() {
                terms_for(&req.category)
            } else {
                req.items.iter().map(|t| normalize_term(t)).collect()
            };
            if let Some(min) = req.min_per_day {
                self.push(
                    GuardRule::new(
                        format!("{}:required:{}:day", self.prefix, req.category),
                        RuleSource::Diet,
                        req.constraint_type,
                        STRUCTURE_RULE_PRIORITY,
                        RuleCheck::Week(WeekCheck::CategoryPerDay {
                            category: req.category.clone(),
                            terms: terms.clone(),
                            min,
                        }),
                        codes::REQUIRED_CATEGORY_MISSING,
                        format!("At least {min}x {} per day", req.category.replace('_', " ")),
                    )
                    .with_category(req.category.as_str()),
                );
            }
            if let Some(min) = req.min_per_week {
                self.push(
                    GuardRule::new(
                        format!("{}:required:{}:week", self.prefix, req.category),
                        RuleSource::Diet,
                        req.constraint_type,
                        STRUCTURE_RULE_PRIORITY,
                        RuleCheck::Week(WeekCheck::CategoryPerWeek {
                            category: req.category.clone(),
                            terms,
                            min,
                        }),
                        codes::REQUIRED_CATEGORY_MISSING,
                        format!("At least {min}x {} per week", req.category.replace('_', " ")),
                    )
                    .with_category(req.category.as_str()),
                );
            }
        }
    }

    fn per_meal(&mut self) {
        let rules = self.rules;
        for pm in &rules.per_meal_constraints {
            let slot = pm.slot;
            let bounds = [
                (pm.min_protein_g.map(|g| MealCheckKind::MinProtein { grams: g }), "min_protein", codes::MEAL_MIN_PROTEIN),
                (pm.min_carbs_g.map(|g| MealCheckKind::MinCarbs { grams: g }), "min_carbs", codes::MEAL_MIN_CARBS),
                (pm.min_fat_g.map(|g| MealCheckKind::MinFat { grams: g }), "min_fat", codes::MEAL_MIN_FAT),
                (pm.max_calories.map(|k| MealCheckKind::MaxCalories { kcal: k }), "max_calories", codes::MEAL_MAX_CALORIES),
            ];
            for (kind, name, code) in bounds {
                if let Some(kind) = kind {
                    let label = meal_label(&kind, Some(slot));
                    self.push(GuardRule::new(
                        format!("{}:meal:{}:{}", self.prefix, slot, name),
                        RuleSource::Diet,
                        pm.constraint_type,
                        STRUCTURE_RULE_PRIORITY,
                        RuleCheck::Meal(MealCheck { slot: Some(slot), kind }),
                        code,
                        label,
                    ));
                }
            }
            for category in &pm.required_categories {
                let kind = MealCheckKind::RequiredCategory {
                    category: category.clone(),
                    terms: terms_for(category),
                };
                let label = meal_label(&kind, Some(slot));
                self.push(
                    GuardRule::new(
                        format!("{}:meal:{}:requires:{}", self.prefix, slot, category),
                        RuleSource::Diet,
                        pm.constraint_type,
                        STRUCTURE_RULE_PRIORITY,
                        RuleCheck::Meal(MealCheck { slot: Some(slot), kind }),
                        codes::MEAL_REQUIRED_CATEGORY,
                        label,
                    )
                    .with_category(category.as_str()),
                );
            }
        }
    }

    fn macros(&mut self) {
        let rules = self.rules;
        for (index, mc) in rules.macro_constraints.iter().enumerate() {
            match mc.scope {
                MacroScope::Daily => self.daily_macros(index, mc),
                MacroScope::PerMeal => self.per_meal_macros(index, mc),
            }
        }
    }

    fn daily_macros(&mut self, index: usize, mc: &MacroConstraint) {
        let none = WeekCheck::DailyMacro {
            max_carbs_g: None,
            max_saturated_fat_g: None,
            min_protein_g: None,
            min_fat_g: None,
        };
        let with = |grams: f64, set: fn(&mut WeekCheck, f64)| {
            let mut check = none.clone();
            set(&mut check, grams);
            (grams, check)
        };
        let bounds = [
            (
                mc.max_carbs_g.map(|g| with(g, set_max_carbs)),
                "max_carbs",
                codes::DAILY_MAX_CARBS,
                "Net carbs at most",
            ),
            (
                mc.max_saturated_fat_g.map(|g| with(g, set_max_saturated_fat)),
                "max_saturated_fat",
                codes::DAILY_MAX_SATURATED_FAT,
                "Saturated fat at most",
            ),
            (
                mc.min_protein_g.map(|g| with(g, set_min_protein)),
                "min_protein",
                codes::DAILY_MIN_PROTEIN,
                "Protein at least",
            ),
            (
                mc.min_fat_g.map(|g| with(g, set_min_fat)),
                "min_fat",
                codes::DAILY_MIN_FAT,
                "Fat at least",
            ),
        ];
        for (bound, name, code, text) in bounds {
            let Some((grams, check)) = bound else { continue };
            self.push(GuardRule::new(
                format!("{}:daily:{}:{}", self.prefix, index, name),
                RuleSource::Diet,
                mc.constraint_type,
                STRUCTURE_RULE_PRIORITY,
                RuleCheck::Week(check),
                code,
                format!("{text} {grams}g per day"),
            ));
        }
    }

    fn per_meal_macros(&mut self, index: usize, mc: &MacroConstraint) {
        let bounds = [
            (mc.max_carbs_g.map(|g| MealCheckKind::MaxCarbs { grams: g }), "max_carbs", codes::MEAL_MAX_CARBS),
            (mc.max_saturated_fat_g.map(|g| MealCheckKind::MaxSaturatedFat { grams: g }), "max_saturated_fat", codes::MEAL_MAX_SATURATED_FAT),
            (mc.min_protein_g.map(|g| MealCheckKind::MinProtein { grams: g }), "min_protein", codes::MEAL_MIN_PROTEIN),
            (mc.min_fat_g.map(|g| MealCheckKind::MinFat { grams: g }), "min_fat", codes::MEAL_MIN_FAT),
        ];
        for (kind, name, code) in bounds {
            if let Some(kind) = kind {
                let label = meal_label(&kind, None);
                self.push(GuardRule::new(
                    format!("{}:per_meal:{}:{}", self.prefix, index, name),
                    RuleSource::Diet,
                    mc.constraint_type,
                    STRUCTURE_RULE_PRIORITY,
                    RuleCheck::Meal(MealCheck { slot: None, kind }),
                    code,
                    label,
                ));
            }
        }
        if !mc.forbidden_types.is_empty() {
            let tags: Vec<String> = mc.forbidden_types.iter().map(|t| normalize_term(t)).collect();
            let kind = MealCheckKind::ForbiddenTags { tags };
            let label = meal_label(&kind, None);
            self.push(GuardRule::new(
                format!("{}:per_meal:{}:forbidden_types", self.prefix, index),
                RuleSource::Diet,
                mc.constraint_type,
                STRUCTURE_RULE_PRIORITY,
                RuleCheck::Meal(MealCheck { slot: None, kind }),
                codes::MEAL_FORBIDDEN_MACRO_TYPE,
                label,
            ));
        }
    }

    fn variety(&mut self) {
        let v = &self.rules.weekly_variety;
        let (max, min, near, ct) = (
            v.max_repeats,
            v.min_unique_meals,
            v.exclude_near_duplicates,
            v.constraint_type,
        );
        self.push(GuardRule::new(
            format!("{}:variety:max_repeats", self.prefix),
            RuleSource::Diet,
            ct,
            VARIETY_RULE_PRIORITY,
            RuleCheck::Week(WeekCheck::MaxRepeats {
                max,
                near_duplicates: near,
            }),
            codes::WEEKLY_MAX_REPEATS,
            format!("The same meal at most {max}x per week"),
        ));
        self.push(GuardRule::new(
            format!("{}:variety:min_unique", self.prefix),
            RuleSource::Diet,
            ct,
            VARIETY_RULE_PRIORITY,
            RuleCheck::Week(WeekCheck::MinUniqueMeals {
                min,
                near_duplicates: near,
            }),
            codes::WEEKLY_MIN_UNIQUE_MEALS,
            format!("At least {min} different meals per week"),
        ));
    }

    fn structure(&mut self) {
        let rules = self.rules;
        for entry in &rules.meal_structure {
            let ct = entry.constraint_type;
            match entry.rule.clone() {
                MealStructureRule::VegetableCups(req) => {
                    let label = format!("{} cups of vegetables per day", req.total_cups);
                    self.push(GuardRule::new(
                        format!("{}:structure:vegetable_cups", self.prefix),
                        RuleSource::Diet,
                        ct,
                        DIET_BAN_PRIORITY,
                        RuleCheck::Week(WeekCheck::VegetableCups(req)),
                        codes::VEGETABLE_CUPS_SHORTFALL,
                        label,
                    ));
                }
                MealStructureRule::MealCount {
                    min_per_day,
                    max_per_day,
                } => self.push(GuardRule::new(
                    format!("{}:structure:meal_count", self.prefix),
                    RuleSource::Diet,
                    ct,
                    STRUCTURE_RULE_PRIORITY,
                    RuleCheck::Week(WeekCheck::MealCount {
                        min: min_per_day,
                        max: max_per_day,
                    }),
                    codes::MEAL_COUNT_OUT_OF_RANGE,
                    format!("{min_per_day} to {max_per_day} meals per day"),
                )),
                MealStructureRule::MealTiming {
                    slot,
                    earliest,
                    latest,
                } => self.push(GuardRule::new(
                    format!("{}:structure:timing:{}", self.prefix, slot),
                    RuleSource::Diet,
                    ct,
                    STRUCTURE_RULE_PRIORITY,
                    RuleCheck::Week(WeekCheck::MealTiming {
                        slot,
                        earliest,
                        latest,
                    }),
                    codes::MEAL_TIMING_WINDOW,
                    format!(
                        "{} between {} and {}",
                        slot,
                        earliest.format("%H:%M"),
                        latest.format("%H:%M")
                    ),
                )),
            }
        }
    }

    fn calories(&mut self) {
        let rules = self.rules;
        let Some(cal) = &rules.calorie_target else {
            return;
        };
        let (min, max) = (cal.target.min, cal.target.max);
        if min.is_none() && max.is_none() {
            return;
        }
        let label = match (min, max) {
            (Some(lo), Some(hi)) => format!("{lo} to {hi} kcal per day"),
            (Some(lo), None) => format!("At least {lo} kcal per day"),
            (None, Some(hi)) => format!("At most {hi} kcal per day"),
            (None, None) => String::new(),
        };
        let rule = GuardRule::new(
            format!("{}:daily:calories", self.prefix),
            RuleSource::Diet,
            cal.constraint_type,
            STRUCTURE_RULE_PRIORITY,
            RuleCheck::Week(WeekCheck::DailyCalories { min, max }),
            codes::DAILY_CALORIE_RANGE,
            label,
        );
        self.push(rule);
    }

    fn prep_time(&mut self) {
        let rules = self.rules;
        let Some(prep) = &rules.prep_time else {
            return;
        };
        for slot in [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner, MealSlot::Snack] {
            let Some(minutes) = prep_limit(prep, slot) else {
                continue;
            };
            let kind = MealCheckKind::MaxPrepMinutes {
                minutes,
                exempt_tag: prep.batch_cooking.then(|| BATCH_COOKING_TAG.to_string()),
            };
            let label = meal_label(&kind, Some(slot));
            self.push(GuardRule::new(
                format!("{}:prep:{}", self.prefix, slot),
                RuleSource::Diet,
                prep.constraint_type,
                STRUCTURE_RULE_PRIORITY,
                RuleCheck::Meal(MealCheck {
                    slot: Some(slot),
                    kind,
                }),
                codes::PREP_TIME_EXCEEDED,
                label,
            ));
        }
    }
}

fn set_max_carbs(check: &mut WeekCheck, grams: f64) {
    if let WeekCheck::DailyMacro { max_carbs_g, .. } = check {
        *max_carbs_g = Some(grams);
    }
}

fn set_max_saturated_fat(check: &mut WeekCheck, grams: f64) {
    if let WeekCheck::DailyMacro { max_saturated_fat_g, .. } = check {
        *max_saturated_fat_g = Some(grams);
    }
}

fn set_min_protein(check: &mut WeekCheck, grams: f64) {
    if let WeekCheck::DailyMacro { min_protein_g, .. } = check {
        *min_protein_g = Some(grams);
    }
}

fn set_min_fat(check: &mut WeekCheck, grams: f64) {
    if let WeekCheck::DailyMacro { min_fat_g, .. } = check {
        *min_fat_g = Some(grams);
    }
}

fn prep_limit(prep: &PrepTimeConstraint, slot: MealSlot) -> Option<u32> {
    let per_slot = match slot {
        MealSlot::Breakfast => prep.breakfast,
        MealSlot::Lunch => prep.lunch,
        MealSlot::Dinner => prep.dinner,
        MealSlot::Snack => None,
    };
    per_slot.or(prep.max_minutes)
}

fn meal_label(kind: &MealCheckKind, slot: Option<MealSlot>) -> String {
    let scope = slot.map(|s| s.to_string()).unwrap_or_else(|| "every meal".into());
    match kind {
        MealCheckKind::MinProtein { grams } => format!("At least {grams}g protein at {scope}"),
        MealCheckKind::MinCarbs { grams } => format!("At least {grams}g carbs at {scope}"),
        MealCheckKind::MinFat { grams } => format!("At least {grams}g fat at {scope}"),
        MealCheckKind::MaxCarbs { grams } => format!("At most {grams}g carbs at {scope}"),
        MealCheckKind::MaxSaturatedFat { grams } => {
            format!("At most {grams}g saturated fat at {scope}")
        }
        MealCheckKind::MaxCalories { kcal } => format!("At most {kcal} kcal at {scope}"),
        MealCheckKind::RequiredCategory { category, .. } => {
            format!("{} required at {scope}", category.replace('_', " "))
        }
        MealCheckKind::ForbiddenTags { tags } => {
            format!("No {} meals", tags.join(" or ").replace('_', " "))
        }
        MealCheckKind::MaxPrepMinutes { minutes, .. } => {
            format!("At most {minutes} minutes prep at {scope}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diet_guard_rules::derive_diet_rule_set;
    use diet_guard_types::{
        ConstraintType, DietKey, DietProfile, PrepTimePreferences, Strictness,
    };

    fn compiled(profile: &DietProfile) -> Vec<GuardRule> {
        compile_diet_rules(&derive_diet_rule_set(profile))
    }

    #[test]
    fn test_keto_grains_rule() {
        let rules = compiled(&DietProfile::new(DietKey::Keto));
        let grains = rules.iter().find(|r| r.id == "diet:keto:category:grains").unwrap();
        assert_eq!(grains.rule_code(), "FORBIDDEN_CATEGORY_GRAINS");
        assert_eq!(grains.strictness, ConstraintType::Hard);
        match &grains.check {
            RuleCheck::Ingredient(m) => assert!(m.terms.iter().any(|t| t == "rijst")),
            other => panic!("unexpected check {other:?}"),
        }
    }

    #[test]
    fn test_category_bans_carry_vocabulary_exclusions() {
        let rules = compiled(&DietProfile::new(DietKey::WahlsPaleoPlus));
        let grains = rules
            .iter()
            .find(|r| r.id == "diet:wahls_paleo_plus:category:grains")
            .unwrap();
        let RuleCheck::Ingredient(m) = &grains.check else {
            panic!("unexpected check {:?}", grains.check);
        };
        assert_eq!(m.exclusions.get("bloem"), Some(&vec!["bloemkool".to_string()]));
        assert!(!m.term_hits("bloem", "bloemkool"));
        assert!(m.term_hits("bloem", "tarwebloem"));
        assert!(!m.exclusions.contains_key("haver"));
    }

    #[test]
    fn test_keto_carb_ceiling_is_hard_daily_rule() {
        let rules = compiled(&DietProfile::new(DietKey::Keto).with_strictness(Strictness::Flexible));
        let ceiling = rules
            .iter()
            .find(|r| {
                r.rule_code() == codes::DAILY_MAX_CARBS
                    && matches!(r.check, RuleCheck::Week(WeekCheck::DailyMacro { max_carbs_g: Some(g), .. }) if g == 20.0)
            })
            .unwrap();
        assert_eq!(ceiling.strictness, ConstraintType::Hard);
    }

    #[test]
    fn test_allowed_constraints_produce_no_rules() {
        let rules = compiled(&DietProfile::new(DietKey::Keto));
        assert!(!rules.iter().any(|r| r.id.contains("healthy_fats") && matches!(r.check, RuleCheck::Ingredient(_))));
    }

    #[test]
    fn test_rule_ids_unique() {
        for key in DietKey::ALL {
            let profile = DietProfile::new(key)
                .with_allergy("pinda")
                .with_dislike("spruitjes")
                .with_prep_time(PrepTimePreferences {
                    max_minutes: Some(30),
                    ..Default::default()
                });
            let rules = compiled(&profile);
            let mut ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
            let total = ids.len();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), total, "{key}");
        }
    }

    #[test]
    fn test_allergy_and_dislike_codes() {
        let profile = DietProfile::new(DietKey::Balanced)
            .with_allergy("Pinda")
            .with_dislike("paddenstoelen")
            .with_strictness(Strictness::Flexible);
        let rules = compiled(&profile);
        let allergy = rules.iter().find(|r| r.rule_code() == codes::ALLERGEN_PRESENT).unwrap();
        assert_eq!(allergy.id, "diet:balanced:allergy:pinda");
        assert_eq!(allergy.priority, ALLERGY_RULE_PRIORITY);
        assert!(allergy.is_hard());
        let dislike = rules.iter().find(|r| r.rule_code() == codes::DISLIKED_INGREDIENT).unwrap();
        assert_eq!(dislike.strictness, ConstraintType::Soft);
    }

    #[test]
    fn test_batch_cooking_exempts_tag() {
        let profile = DietProfile::new(DietKey::Balanced).with_prep_time(PrepTimePreferences {
            dinner: Some(40),
            batch_cooking: true,
            ..Default::default()
        });
        let rules = compiled(&profile);
        let dinner = rules.iter().find(|r| r.id == "diet:balanced:prep:dinner").unwrap();
        assert!(matches!(
            &dinner.check,
            RuleCheck::Meal(MealCheck {
                kind: MealCheckKind::MaxPrepMinutes { minutes: 40, exempt_tag: Some(tag) },
                ..
            }) if tag == BATCH_COOKING_TAG
        ));
        // No global maximum, so only the dinner limit exists.
        assert!(!rules.iter().any(|r| r.id == "diet:balanced:prep:lunch"));
    }
}
