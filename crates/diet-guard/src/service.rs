//! Guardrails service
//!
//! Loads the rule set and overrides, builds a fresh context and evaluates
//! the plan. Fails closed: a loader failure is an `Err`, never an allowed
//! decision.

use chrono::Utc;
use diet_guard_core::{
    evaluate_guardrails, extract_targets, EvaluationContext, EvaluationMode, GuardrailsDecision,
};
use diet_guard_types::{DietProfile, MealPlanSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::OverrideCache;
use crate::config::GuardrailsConfig;
use crate::error::{GuardError, GuardResult};
use crate::loader::RulesetLoader;

/// One plan to evaluate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub profile: DietProfile,
    #[serde(default)]
    pub household_id: Option<String>,
    pub plan: MealPlanSnapshot,
    #[serde(default)]
    pub mode: Option<EvaluationMode>,
    #[serde(default)]
    pub locale: Option<String>,
}

impl EvaluationRequest {
    pub fn new(profile: DietProfile, plan: MealPlanSnapshot) -> Self {
        Self {
            profile,
            household_id: None,
            plan,
            mode: None,
            locale: None,
        }
    }

    pub fn with_household(mut self, household_id: impl Into<String>) -> Self {
        self.household_id = Some(household_id.into());
        self
    }

    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// A decision with its identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailsResult {
    pub decision_id: Uuid,
    pub decision: GuardrailsDecision,
}

/// Reject snapshots the evaluator cannot interpret.
pub fn validate_plan(plan: &MealPlanSnapshot) -> GuardResult<()> {
    let mut dates = HashSet::new();
    for day in &plan.days {
        if !dates.insert(day.date) {
            return Err(GuardError::InvalidPlan {
                reason: format!("day {} appears more than once", day.date),
            });
        }
        if let Some(meal) = day.meals.iter().find(|m| m.id.trim().is_empty()) {
            return Err(GuardError::InvalidPlan {
                reason: format!("{} meal on {} has no id", meal.slot, day.date),
            });
        }
    }
    Ok(())
}

#[derive(Debug)]
pub struct GuardrailsService {
    loader: RulesetLoader,
    overrides: Arc<OverrideCache>,
    config: GuardrailsConfig,
}

impl GuardrailsService {
    pub fn new(loader: RulesetLoader, overrides: Arc<OverrideCache>, config: GuardrailsConfig) -> Self {
        Self {
            loader,
            overrides,
            config,
        }
    }

    pub fn override_cache(&self) -> &Arc<OverrideCache> {
        &self.overrides
    }

    pub async fn evaluate_plan(&self, request: &EvaluationRequest) -> GuardResult<GuardrailsResult> {
        let plan_id = request.plan.plan_id.as_str();
        let diet = request.profile.diet_key;
        let mode = request.mode.unwrap_or(self.config.default_mode);
        let locale = request
            .locale
            .as_deref()
            .unwrap_or(&self.config.default_locale);

        let fail = |e: GuardError| {
            warn!(plan_id = %plan_id, diet = %diet, error = %e, "Guardrails evaluation failed closed");
            e
        };

        validate_plan(&request.plan).map_err(fail)?;
        let ruleset = self
            .loader
            .load(&request.profile, request.household_id.as_deref(), mode, locale)
            .await
            .map_err(fail)?;
        let overrides = self.overrides.get().await.map_err(fail)?;

        let ctx = EvaluationContext::new(diet)
            .with_locale(locale)
            .with_mode(mode)
            .with_timestamp(Utc::now())
            .with_overrides(overrides.as_ref().clone());
        let decision = evaluate_guardrails(&ruleset, &ctx, &extract_targets(&request.plan));
        let decision_id = Uuid::new_v4();

        if decision.is_blocked() {
            warn!(
                plan_id = %plan_id,
                decision_id = %decision_id,
                diet = %diet,
                reasons = ?decision.reason_codes,
                "Plan blocked by guardrails"
            );
        } else {
            info!(
                plan_id = %plan_id,
                decision_id = %decision_id,
                diet = %diet,
                outcome = %decision.outcome,
                "Plan passed guardrails"
            );
        }

        Ok(GuardrailsResult {
            decision_id,
            decision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use diet_guard_types::{MealSlot, PlanDay, PlannedMeal};

    #[test]
    fn test_validate_plan_rejects_duplicate_days() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let plan = MealPlanSnapshot::new("p")
            .with_day(PlanDay::new(date))
            .with_day(PlanDay::new(date));
        assert!(matches!(validate_plan(&plan), Err(GuardError::InvalidPlan { .. })));
    }

    #[test]
    fn test_validate_plan_rejects_meal_without_id() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let plan = MealPlanSnapshot::new("p")
            .with_day(PlanDay::new(date).with_meal(PlannedMeal::new(" ", MealSlot::Lunch, "Soep")));
        assert!(validate_plan(&plan).is_err());
        assert!(validate_plan(&MealPlanSnapshot::new("empty")).is_ok());
    }
}
