//! Guardrails decision procedure
//!
//! Checks every applicable rule against every target of its type and
//! aggregates the matches into one [`GuardrailsDecision`]. Pure and
//! deterministic; never fails for well-formed input.

use std::collections::HashMap;

use tracing::debug;

use crate::checks::{check_meal, check_week, Violation};
use crate::context::EvaluationContext;
use crate::decision::{
    reason_codes, summary, worst_day, FlaggedIngredient, GuardrailsDecision, MatchCounts,
    Outcome, RuleMatch, TargetKind,
};
use crate::overrides::{find_suppressing, ExcludeOverride};
use crate::rule::{GuardRule, IngredientMatcher, RuleCheck};
use crate::ruleset::GuardRuleSet;
use crate::targets::{GuardTarget, IngredientTarget};

/// Terms (or identifiers) of `matcher` found in the ingredient.
///
/// The canonical identifier decides when both sides have one; otherwise
/// every rule term is tested as a substring of the ingredient text outside
/// the term's exclusions.
pub fn ingredient_hits(matcher: &IngredientMatcher, target: &IngredientTarget) -> Vec<String> {
    if let Some(id) = &target.mention.canonical_id {
        if !matcher.canonical_ids.is_empty() {
            return matcher
                .canonical_ids
                .iter()
                .filter(|c| c.trim().eq_ignore_ascii_case(id))
                .cloned()
                .collect();
        }
    }
    let text = &target.mention.text;
    matcher
        .terms
        .iter()
        .filter(|t| matcher.term_hits(t, text))
        .cloned()
        .collect()
}

fn rule_match(rule: &GuardRule, target: TargetKind, v: Violation) -> RuleMatch {
    RuleMatch {
        rule_id: rule.id.clone(),
        rule_code: rule.metadata.rule_code.clone(),
        label: rule.metadata.label.clone(),
        strictness: rule.strictness,
        priority: rule.priority,
        source: rule.source,
        target,
        date: v.date,
        slot: v.slot,
        meal_id: v.meal_id,
        detail: v.detail,
        suppressed_by: None,
    }
}

fn ingredient_matches(
    rules: &[&GuardRule],
    overrides: &[&ExcludeOverride],
    target: &IngredientTarget,
    out: &mut Vec<RuleMatch>,
) -> Option<FlaggedIngredient> {
    let mut flagged: Option<FlaggedIngredient> = None;
    for rule in rules {
        let RuleCheck::Ingredient(matcher) = &rule.check else {
            continue;
        };
        for term in ingredient_hits(matcher, target) {
            let suppressed_by = find_suppressing(overrides.iter().copied(), &term, &target.mention.text)
                .map(|o| o.id.clone());
            let applied = suppressed_by.is_none();
            let mut m = rule_match(
                rule,
                TargetKind::Ingredient,
                Violation {
                    date: Some(target.date),
                    slot: Some(target.slot),
                    meal_id: Some(target.meal_id.clone()),
                    detail: term,
                },
            );
            m.suppressed_by = suppressed_by;
            out.push(m);

            if !applied {
                continue;
            }
            // Rules arrive highest priority first, so the first applied
            // match owns the metadata.
            match &mut flagged {
                Some(f) => f.blocking |= rule.is_hard(),
                None => {
                    flagged = Some(FlaggedIngredient {
                        date: target.date,
                        slot: target.slot,
                        meal_id: target.meal_id.clone(),
                        text: target.mention.text.clone(),
                        rule_id: rule.id.clone(),
                        rule_code: rule.metadata.rule_code.clone(),
                        label: rule.metadata.label.clone(),
                        blocking: rule.is_hard(),
                    })
                }
            }
        }
    }
    flagged
}

/// Evaluate `targets` against the rule set.
pub fn evaluate_guardrails(
    ruleset: &GuardRuleSet,
    ctx: &EvaluationContext,
    targets: &[GuardTarget],
) -> GuardrailsDecision {
    let rules: Vec<&GuardRule> = ruleset.rules_for(ctx.mode).collect();
    let overrides: Vec<&ExcludeOverride> = ctx.active_overrides().collect();

    let mut matches = Vec::new();
    let mut flagged_ingredients = Vec::new();

    for target in targets {
        match target {
            GuardTarget::Ingredient(t) => {
                if let Some(f) = ingredient_matches(&rules, &overrides, t, &mut matches) {
                    flagged_ingredients.push(f);
                }
            }
            GuardTarget::Meal(meal) => {
                for rule in &rules {
                    if let RuleCheck::Meal(check) = &rule.check {
                        if let Some(v) = check_meal(check, meal) {
                            matches.push(rule_match(rule, TargetKind::Meal, v));
                        }
                    }
                }
            }
            GuardTarget::Week(week) => {
                for rule in &rules {
                    if let RuleCheck::Week(check) = &rule.check {
                        for v in check_week(check, week) {
                            matches.push(rule_match(rule, TargetKind::Week, v));
                        }
                    }
                }
            }
        }
    }

    let outcome = Outcome::from_strictness(
        matches.iter().filter(|m| m.is_applied()).map(|m| m.strictness),
    );
    let counts = MatchCounts {
        matches: matches.len(),
        applied: matches.iter().filter(|m| m.is_applied()).count(),
    };

    debug!(
        diet = %ctx.diet_key,
        mode = %ctx.mode,
        rules = rules.len(),
        targets = targets.len(),
        matches = counts.matches,
        applied = counts.applied,
        outcome = %outcome,
        "Evaluated guardrails"
    );

    GuardrailsDecision {
        ok: outcome != Outcome::Blocked,
        outcome,
        reason_codes: reason_codes(&matches),
        summary: summary(outcome, &matches),
        ruleset_version: ruleset.version,
        content_hash: ruleset.content_hash,
        counts,
        worst_day: worst_day(&matches),
        matches,
        flagged_ingredients,
        mode: ctx.mode,
        evaluated_at: ctx.timestamp,
    }
}

/// Applied match counts per reason code.
pub fn reason_histogram(decision: &GuardrailsDecision) -> HashMap<&str, usize> {
    let mut out = HashMap::new();
    for m in decision.applied_matches() {
        *out.entry(m.rule_code.as_str()).or_insert(0) += 1;
    }
    out
}
