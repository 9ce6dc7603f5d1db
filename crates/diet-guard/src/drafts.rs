//! Draft meal-plan actions
//!
//! Mutations on one plan id run one at a time. Each action checks the
//! expected version, validates the structure it touches, evaluates the
//! resulting plan and persists it only if guardrails did not block it.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use diet_guard_types::{DietProfile, MealPlanSnapshot, MealSlot, PlannedMeal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DraftError, DraftResult, GuardError};
use crate::loader::SourceResult;
use crate::service::{EvaluationRequest, GuardrailsResult, GuardrailsService};

/// A meal plan awaiting acceptance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftPlan {
    pub plan_id: String,
    /// Changes on every persisted mutation
    pub draft_id: Uuid,
    pub version: u64,
    pub profile: DietProfile,
    #[serde(default)]
    pub household_id: Option<String>,
    pub snapshot: MealPlanSnapshot,
}

impl DraftPlan {
    pub fn new(profile: DietProfile, snapshot: MealPlanSnapshot) -> Self {
        Self {
            plan_id: snapshot.plan_id.clone(),
            draft_id: Uuid::new_v4(),
            version: 0,
            profile,
            household_id: None,
            snapshot,
        }
    }

    pub fn with_household(mut self, household_id: impl Into<String>) -> Self {
        self.household_id = Some(household_id.into());
        self
    }
}

/// Result of a persisted draft mutation
#[derive(Debug, Clone)]
pub struct DraftUpdate {
    pub draft: DraftPlan,
    pub guardrails: GuardrailsResult,
}

#[async_trait]
pub trait DraftPlanStore: Send + Sync {
    async fn load(&self, plan_id: &str) -> SourceResult<Option<DraftPlan>>;
    async fn save(&self, draft: DraftPlan) -> SourceResult<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryDraftStore {
    drafts: RwLock<HashMap<String, DraftPlan>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftPlanStore for InMemoryDraftStore {
    async fn load(&self, plan_id: &str) -> SourceResult<Option<DraftPlan>> {
        Ok(self.drafts.read().await.get(plan_id).cloned())
    }

    async fn save(&self, draft: DraftPlan) -> SourceResult<()> {
        self.drafts.write().await.insert(draft.plan_id.clone(), draft);
        Ok(())
    }
}

pub struct DraftActions {
    service: Arc<GuardrailsService>,
    store: Arc<dyn DraftPlanStore>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl DraftActions {
    pub fn new(service: Arc<GuardrailsService>, store: Arc<dyn DraftPlanStore>) -> Self {
        Self {
            service,
            store,
            locks: DashMap::new(),
        }
    }

    fn plan_lock(&self, plan_id: &str) -> Arc<Mutex<()>> {
        self.locks.entry(plan_id.to_string()).or_default().clone()
    }

    /// Drop the plan's lock entry unless another action still holds a clone.
    fn release_lock(&self, plan_id: &str, lock: Arc<Mutex<()>>) {
        self.locks.remove_if(plan_id, |_, held| Arc::strong_count(held) == 2);
        drop(lock);
    }

    /// Plans with an action in flight or waiting.
    pub fn active_plan_locks(&self) -> usize {
        self.locks.len()
    }

    async fn load_checked(&self, plan_id: &str, expected_version: Option<u64>) -> DraftResult<DraftPlan> {
        let draft = self
            .store
            .load(plan_id)
            .await?
            .ok_or_else(|| DraftError::PlanNotFound(plan_id.to_string()))?;
        if let Some(expected) = expected_version {
            if expected != draft.version {
                return Err(DraftError::VersionConflict {
                    expected,
                    actual: draft.version,
                });
            }
        }
        Ok(draft)
    }

    /// Evaluate `snapshot` and persist it as the next version unless blocked.
    async fn commit(&self, mut draft: DraftPlan, snapshot: MealPlanSnapshot) -> DraftResult<DraftUpdate> {
        let request = EvaluationRequest {
            profile: draft.profile.clone(),
            household_id: draft.household_id.clone(),
            plan: snapshot,
            mode: None,
            locale: None,
        };
        let guardrails = self.service.evaluate_plan(&request).await?;

        if guardrails.decision.is_blocked() {
            warn!(
                plan_id = %draft.plan_id,
                decision_id = %guardrails.decision_id,
                version = draft.version,
                "Draft not persisted: blocked by guardrails"
            );
            return Err(DraftError::Blocked {
                decision: Box::new(guardrails.decision),
            });
        }

        draft.snapshot = request.plan;
        draft.version += 1;
        draft.draft_id = Uuid::new_v4();
        self.store.save(draft.clone()).await?;
        info!(
            plan_id = %draft.plan_id,
            version = draft.version,
            outcome = %guardrails.decision.outcome,
            "Draft persisted"
        );
        Ok(DraftUpdate { draft, guardrails })
    }

    /// Replace the whole draft snapshot.
    pub async fn apply_draft(
        &self,
        plan_id: &str,
        snapshot: MealPlanSnapshot,
        expected_version: Option<u64>,
    ) -> DraftResult<DraftUpdate> {
        let lock = self.plan_lock(plan_id);
        let result = {
            let _guard = lock.lock().await;
            self.apply_locked(plan_id, snapshot, expected_version).await
        };
        self.release_lock(plan_id, lock);
        result
    }

    async fn apply_locked(
        &self,
        plan_id: &str,
        snapshot: MealPlanSnapshot,
        expected_version: Option<u64>,
    ) -> DraftResult<DraftUpdate> {
        let draft = self.load_checked(plan_id, expected_version).await?;
        if snapshot.plan_id != plan_id {
            return Err(DraftError::Guard(GuardError::InvalidPlan {
                reason: format!("snapshot is for plan {}, not {plan_id}", snapshot.plan_id),
            }));
        }
        debug!(plan_id = %plan_id, days = snapshot.days.len(), "Applying draft");
        self.commit(draft, snapshot).await
    }

    /// Replace the meal in one slot of one day.
    pub async fn update_draft_slot(
        &self,
        plan_id: &str,
        date: NaiveDate,
        slot: MealSlot,
        meal: PlannedMeal,
        expected_version: Option<u64>,
    ) -> DraftResult<DraftUpdate> {
        let lock = self.plan_lock(plan_id);
        let result = {
            let _guard = lock.lock().await;
            self.update_slot_locked(plan_id, date, slot, meal, expected_version)
                .await
        };
        self.release_lock(plan_id, lock);
        result
    }

    async fn update_slot_locked(
        &self,
        plan_id: &str,
        date: NaiveDate,
        slot: MealSlot,
        meal: PlannedMeal,
        expected_version: Option<u64>,
    ) -> DraftResult<DraftUpdate> {
        let draft = self.load_checked(plan_id, expected_version).await?;
        let mut snapshot = draft.snapshot.clone();
        let day = snapshot
            .day_mut(date)
            .ok_or(DraftError::DayNotFound(date))?;
        let existing = day
            .meals
            .iter_mut()
            .find(|m| m.slot == slot)
            .ok_or(DraftError::SlotNotFound { date, slot })?;
        *existing = PlannedMeal { slot, ..meal };

        debug!(plan_id = %plan_id, date = %date, slot = %slot, "Updating draft slot");
        self.commit(draft, snapshot).await
    }
}

impl std::fmt::Debug for DraftActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftActions")
            .field("locked_plans", &self.locks.len())
            .finish_non_exhaustive()
    }
}
