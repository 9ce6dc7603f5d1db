//! Meal and week checks
//!
//! Each check returns the violations it finds; the evaluator attaches rule
//! metadata. Missing data (no macro estimate, no schedule) is never a
//! violation.

use chrono::NaiveDate;
use diet_guard_types::{MacroTotals, MealSlot, VegetableCupsRequirement};
use std::collections::{BTreeSet, HashMap};

use crate::rule::{MealCheck, MealCheckKind, WeekCheck};
use crate::targets::{DayTarget, MealTarget, WeekTarget};

const EPSILON: f64 = 1e-9;

/// Where a check failed and why
#[derive(Clone, Debug, PartialEq)]
pub struct Violation {
    pub date: Option<NaiveDate>,
    pub slot: Option<MealSlot>,
    pub meal_id: Option<String>,
    pub detail: String,
}

impl Violation {
    fn meal(meal: &MealTarget, detail: String) -> Self {
        Self {
            date: Some(meal.date),
            slot: Some(meal.slot),
            meal_id: Some(meal.meal_id.clone()),
            detail,
        }
    }

    fn day(date: NaiveDate, detail: String) -> Self {
        Self {
            date: Some(date),
            slot: None,
            meal_id: None,
            detail,
        }
    }

    fn plan(detail: String) -> Self {
        Self {
            date: None,
            slot: None,
            meal_id: None,
            detail,
        }
    }
}

fn below(value: Option<f64>, min: f64) -> Option<f64> {
    value.filter(|v| *v + EPSILON < min)
}

fn above(value: Option<f64>, max: f64) -> Option<f64> {
    value.filter(|v| *v > max + EPSILON)
}

fn macro_of(macros: Option<&MacroTotals>, field: fn(&MacroTotals) -> Option<f64>) -> Option<f64> {
    macros.and_then(field)
}

// ---------------------------------------------------------------------------
// Meal checks
// ---------------------------------------------------------------------------

pub fn check_meal(check: &MealCheck, meal: &MealTarget) -> Option<Violation> {
    if check.slot.is_some_and(|slot| slot != meal.slot) {
        return None;
    }
    let macros = meal.macros.as_ref();
    let detail = match &check.kind {
        MealCheckKind::MinProtein { grams } => below(macro_of(macros, |m| m.protein_g), *grams)
            .map(|v| format!("{v}g protein, need {grams}g")),
        MealCheckKind::MinCarbs { grams } => below(macro_of(macros, |m| m.carbs_g), *grams)
            .map(|v| format!("{v}g carbs, need {grams}g")),
        MealCheckKind::MinFat { grams } => below(macro_of(macros, |m| m.fat_g), *grams)
            .map(|v| format!("{v}g fat, need {grams}g")),
        MealCheckKind::MaxCarbs { grams } => above(macro_of(macros, |m| m.carbs_g), *grams)
            .map(|v| format!("{v}g carbs, limit {grams}g")),
        MealCheckKind::MaxSaturatedFat { grams } => {
            above(macro_of(macros, |m| m.saturated_fat_g), *grams)
                .map(|v| format!("{v}g saturated fat, limit {grams}g"))
        }
        MealCheckKind::MaxCalories { kcal } => above(macro_of(macros, |m| m.calories), *kcal)
            .map(|v| format!("{v} kcal, limit {kcal} kcal")),
        MealCheckKind::RequiredCategory { category, terms } => (!meal.mentions_any(terms))
            .then(|| format!("no {} in {}", category.replace('_', " "), meal.name)),
        MealCheckKind::ForbiddenTags { tags } => {
            let hit: Vec<&str> = meal
                .tags
                .iter()
                .filter(|t| tags.contains(t))
                .map(String::as_str)
                .collect();
            (!hit.is_empty()).then(|| format!("tagged {}", hit.join(", ")))
        }
        MealCheckKind::MaxPrepMinutes { minutes, exempt_tag } => {
            let exempt = exempt_tag
                .as_ref()
                .is_some_and(|tag| meal.tags.contains(tag));
            meal.prep_minutes
                .filter(|p| !exempt && p > minutes)
                .map(|p| format!("{p} minutes prep, limit {minutes}"))
        }
    };
    detail.map(|d| Violation::meal(meal, d))
}

// ---------------------------------------------------------------------------
// Week checks
// ---------------------------------------------------------------------------

pub fn check_week(check: &WeekCheck, week: &WeekTarget) -> Vec<Violation> {
    match check {
        WeekCheck::MaxRepeats {
            max,
            near_duplicates,
        } => max_repeats(week, *max, *near_duplicates),
        WeekCheck::MinUniqueMeals {
            min,
            near_duplicates,
        } => min_unique(week, *min, *near_duplicates),
        WeekCheck::DailyMacro {
            max_carbs_g,
            max_saturated_fat_g,
            min_protein_g,
            min_fat_g,
        } => week
            .days
            .iter()
            .filter_map(|day| {
                let totals = day.totals.as_ref();
                let mut found = Vec::new();
                if let Some(v) = max_carbs_g.and_then(|g| above(macro_of(totals, |m| m.carbs_g), g)) {
                    found.push(format!("{v}g net carbs, limit {}g", fmt_g(*max_carbs_g)));
                }
                if let Some(v) = max_saturated_fat_g
                    .and_then(|g| above(macro_of(totals, |m| m.saturated_fat_g), g))
                {
                    found.push(format!("{v}g saturated fat, limit {}g", fmt_g(*max_saturated_fat_g)));
                }
                if let Some(v) = min_protein_g.and_then(|g| below(macro_of(totals, |m| m.protein_g), g)) {
                    found.push(format!("{v}g protein, need {}g", fmt_g(*min_protein_g)));
                }
                if let Some(v) = min_fat_g.and_then(|g| below(macro_of(totals, |m| m.fat_g), g)) {
                    found.push(format!("{v}g fat, need {}g", fmt_g(*min_fat_g)));
                }
                (!found.is_empty()).then(|| Violation::day(day.date, found.join("; ")))
            })
            .collect(),
        WeekCheck::DailyCalories { min, max } => week
            .days
            .iter()
            .filter_map(|day| {
                let kcal = macro_of(day.totals.as_ref(), |m| m.calories)?;
                let low = min.is_some_and(|lo| kcal + EPSILON < lo);
                let high = max.is_some_and(|hi| kcal > hi + EPSILON);
                (low || high).then(|| {
                    Violation::day(
                        day.date,
                        format!("{kcal} kcal, range {}-{}", fmt_g(*min), fmt_g(*max)),
                    )
                })
            })
            .collect(),
        WeekCheck::CategoryPerDay {
            category,
            terms,
            min,
        } => planned_days(week)
            .filter_map(|day| {
                let count = day.meals.iter().filter(|m| m.mentions_any(terms)).count() as u32;
                (count < *min).then(|| {
                    Violation::day(
                        day.date,
                        format!("{count}x {}, need {min}", category.replace('_', " ")),
                    )
                })
            })
            .collect(),
        WeekCheck::CategoryPerWeek {
            category,
            terms,
            min,
        } => {
            let required = scaled_minimum(*min, week.days.len(), week.meal_count());
            let count = week.meals().filter(|m| m.mentions_any(terms)).count() as u32;
            if count < required {
                vec![Violation::plan(format!(
                    "{count}x {} in plan, need {required}",
                    category.replace('_', " ")
                ))]
            } else {
                Vec::new()
            }
        }
        WeekCheck::VegetableCups(req) => planned_days(week)
            .filter_map(|day| vegetable_cups(req, day))
            .collect(),
        WeekCheck::MealCount { min, max } => planned_days(week)
            .filter_map(|day| {
                let count = day
                    .meals
                    .iter()
                    .filter(|m| m.slot != MealSlot::Snack)
                    .count() as u32;
                (count < *min || count > *max)
                    .then(|| Violation::day(day.date, format!("{count} meals, expected {min}-{max}")))
            })
            .collect(),
        WeekCheck::MealTiming {
            slot,
            earliest,
            latest,
        } => week
            .meals()
            .filter(|m| m.slot == *slot)
            .filter_map(|m| {
                let at = m.scheduled_at?;
                (at < *earliest || at > *latest).then(|| {
                    Violation::meal(
                        m,
                        format!(
                            "scheduled at {}, window {}-{}",
                            at.format("%H:%M"),
                            earliest.format("%H:%M"),
                            latest.format("%H:%M")
                        ),
                    )
                })
            })
            .collect(),
    }
}

/// Days with at least one meal. A day without meals is not planned yet and
/// is skipped by every per-day check.
fn planned_days(week: &WeekTarget) -> impl Iterator<Item = &DayTarget> {
    week.days.iter().filter(|day| !day.meals.is_empty())
}

fn fmt_g(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

/// Scale a full-week minimum to the plan length, never above the number
/// of meals actually planned.
pub fn scaled_minimum(weekly_min: u32, days: usize, meals: usize) -> u32 {
    let scaled = if days >= 7 {
        weekly_min
    } else {
        (weekly_min as usize * days).div_ceil(7) as u32
    };
    scaled.min(meals as u32)
}

/// Identity of a meal for repeat counting.
///
/// Exact mode compares normalized names. Near-duplicate mode compares the
/// sorted set of significant words, so "Kip met broccoli" and "Broccoli
/// met kip" count as the same meal.
pub fn meal_key(name: &str, near_duplicates: bool) -> String {
    let lowered = name.to_lowercase();
    if !near_duplicates {
        return lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    let words: BTreeSet<String> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 3)
        .map(str::to_string)
        .collect();
    words.into_iter().collect::<Vec<_>>().join(" ")
}

fn max_repeats(week: &WeekTarget, max: u32, near_duplicates: bool) -> Vec<Violation> {
    let mut seen: HashMap<String, u32> = HashMap::new();
    let mut out = Vec::new();
    for meal in week.meals() {
        let key = meal_key(&meal.name, near_duplicates);
        if key.is_empty() {
            continue;
        }
        let count = seen.entry(key).or_insert(0);
        *count += 1;
        if *count == max + 1 {
            out.push(Violation::meal(
                meal,
                format!("{} planned more than {max}x", meal.name),
            ));
        }
    }
    out
}

fn min_unique(week: &WeekTarget, min: u32, near_duplicates: bool) -> Vec<Violation> {
    let required = scaled_minimum(min, week.days.len(), week.meal_count());
    let unique: BTreeSet<String> = week
        .meals()
        .map(|m| meal_key(&m.name, near_duplicates))
        .filter(|k| !k.is_empty())
        .collect();
    if (unique.len() as u32) < required {
        vec![Violation::plan(format!(
            "{} different meals, need {required}",
            unique.len()
        ))]
    } else {
        Vec::new()
    }
}

/// Tally vegetable cups for one day.
///
/// An ingredient counts toward the first quota whose vegetables it
/// mentions. Quantities convert via the quota's grams per cup; a mention
/// without a quantity counts as one cup.
pub fn tally_cups(req: &VegetableCupsRequirement, day: &DayTarget) -> Vec<f64> {
    let mut cups = vec![0.0; req.quotas.len()];
    for mention in day.meals.iter().flat_map(|m| m.ingredients.iter()) {
        let quota = req
            .quotas
            .iter()
            .position(|q| q.vegetables.iter().any(|v| mention.text.contains(v.as_str())));
        if let Some(index) = quota {
            let per_cup = req.quotas[index].grams_per_cup;
            cups[index] += match mention.quantity_g {
                Some(grams) if per_cup > 0.0 => grams / per_cup,
                _ => 1.0,
            };
        }
    }
    cups
}

fn vegetable_cups(req: &VegetableCupsRequirement, day: &DayTarget) -> Option<Violation> {
    let cups = tally_cups(req, day);
    let total: f64 = cups.iter().sum();
    let short_quota = req
        .quotas
        .iter()
        .zip(&cups)
        .any(|(q, c)| c + EPSILON < q.cups);
    if total + EPSILON >= req.total_cups && !short_quota {
        return None;
    }
    let parts: Vec<String> = req
        .quotas
        .iter()
        .zip(&cups)
        .map(|(q, c)| format!("{} {:.1}/{}", q.name, c, q.cups))
        .collect();
    Some(Violation::day(
        day.date,
        format!("{:.1} of {} cups ({})", total, req.total_cups, parts.join(", ")),
    ))
}
