//! Collaborator traits and ruleset loading
//!
//! Sources hand back raw rows; they are validated here before anything
//! reaches the evaluator. Any failure surfaces as
//! [`GuardError::RulesetUnavailable`], never as an empty rule set.

use async_trait::async_trait;
use diet_guard_core::{
    compile_diet_rules, household_guard_rules, EvaluationMode, GuardRule, GuardRuleSet,
    HouseholdAvoidRule,
};
use diet_guard_rules::derive_diet_rule_set;
use diet_guard_types::{DietKey, DietProfile};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{GuardError, GuardResult, SourceError};
use crate::records::{RawGuardRuleRow, RawHouseholdRuleRow, RawOverrideRow};

pub type SourceResult<T> = Result<T, SourceError>;

/// Admin rule table for one diet, with its version
#[derive(Debug, Clone, Default)]
pub struct AdminRuleTable {
    pub rules: Vec<RawGuardRuleRow>,
    pub version: u64,
}

/// Admin-editable guard rules
#[async_trait]
pub trait RulesetSource: Send + Sync {
    async fn load_rules(
        &self,
        diet_key: DietKey,
        mode: EvaluationMode,
        locale: &str,
    ) -> SourceResult<AdminRuleTable>;
}

/// False-positive exclusion table
#[async_trait]
pub trait OverrideSource: Send + Sync {
    async fn load_overrides(&self) -> SourceResult<Vec<RawOverrideRow>>;
}

/// Write side of the exclusion table
#[async_trait]
pub trait OverrideStore: Send + Sync {
    async fn insert_override(&self, row: RawOverrideRow) -> SourceResult<()>;
    /// Returns `false` if no row has that id.
    async fn update_override(&self, row: RawOverrideRow) -> SourceResult<bool>;
    /// Returns `false` if no row has that id.
    async fn delete_override(&self, id: &str) -> SourceResult<bool>;
}

/// Per-household avoid rules
#[async_trait]
pub trait HouseholdRuleSource: Send + Sync {
    async fn load_household_rules(&self, household_id: &str) -> SourceResult<Vec<RawHouseholdRuleRow>>;
}

// ---------------------------------------------------------------------------
// In-memory sources
// ---------------------------------------------------------------------------

/// In-memory admin rule tables, keyed by diet.
#[derive(Debug, Default)]
pub struct InMemoryRuleTable {
    tables: RwLock<HashMap<DietKey, AdminRuleTable>>,
}

impl InMemoryRuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a diet's table.
    pub async fn set_table(&self, diet_key: DietKey, table: AdminRuleTable) {
        self.tables.write().await.insert(diet_key, table);
    }
}

#[async_trait]
impl RulesetSource for InMemoryRuleTable {
    async fn load_rules(
        &self,
        diet_key: DietKey,
        _mode: EvaluationMode,
        _locale: &str,
    ) -> SourceResult<AdminRuleTable> {
        let tables = self.tables.read().await;
        Ok(tables.get(&diet_key).cloned().unwrap_or_default())
    }
}

/// In-memory override table; both the read and the write side.
#[derive(Debug, Default)]
pub struct InMemoryOverrideStore {
    rows: RwLock<Vec<RawOverrideRow>>,
}

impl InMemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<RawOverrideRow>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }
}

#[async_trait]
impl OverrideSource for InMemoryOverrideStore {
    async fn load_overrides(&self) -> SourceResult<Vec<RawOverrideRow>> {
        Ok(self.rows.read().await.clone())
    }
}

#[async_trait]
impl OverrideStore for InMemoryOverrideStore {
    async fn insert_override(&self, row: RawOverrideRow) -> SourceResult<()> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|r| r.id.is_some() && r.id == row.id) {
            return Err(SourceError::Unavailable(format!(
                "override {} already exists",
                row.id.unwrap_or_default()
            )));
        }
        rows.push(row);
        Ok(())
    }

    async fn update_override(&self, row: RawOverrideRow) -> SourceResult<bool> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|r| r.id == row.id) {
            Some(existing) => {
                *existing = row;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_override(&self, id: &str) -> SourceResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| r.id.as_deref() != Some(id));
        Ok(rows.len() != before)
    }
}

/// In-memory household avoid rules, keyed by household.
#[derive(Debug, Default)]
pub struct InMemoryHouseholdRules {
    rules: RwLock<HashMap<String, Vec<RawHouseholdRuleRow>>>,
}

impl InMemoryHouseholdRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_rules(&self, household_id: impl Into<String>, rows: Vec<RawHouseholdRuleRow>) {
        self.rules.write().await.insert(household_id.into(), rows);
    }
}

#[async_trait]
impl HouseholdRuleSource for InMemoryHouseholdRules {
    async fn load_household_rules(&self, household_id: &str) -> SourceResult<Vec<RawHouseholdRuleRow>> {
        Ok(self
            .rules
            .read()
            .await
            .get(household_id)
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Ruleset loader
// ---------------------------------------------------------------------------

fn unavailable(diet_key: DietKey, reason: impl ToString) -> GuardError {
    let reason = reason.to_string();
    warn!(diet = %diet_key, reason = %reason, "Guardrails ruleset unavailable");
    GuardError::RulesetUnavailable { reason }
}

/// Builds the evaluation rule set: derived diet rules, admin rules and
/// household rules.
#[derive(Clone)]
pub struct RulesetLoader {
    rules: Arc<dyn RulesetSource>,
    households: Arc<dyn HouseholdRuleSource>,
}

impl std::fmt::Debug for RulesetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulesetLoader").finish_non_exhaustive()
    }
}

impl RulesetLoader {
    pub fn new(rules: Arc<dyn RulesetSource>, households: Arc<dyn HouseholdRuleSource>) -> Self {
        Self { rules, households }
    }

    pub async fn load(
        &self,
        profile: &DietProfile,
        household_id: Option<&str>,
        mode: EvaluationMode,
        locale: &str,
    ) -> GuardResult<GuardRuleSet> {
        let diet_key = profile.diet_key;
        let compiled = compile_diet_rules(&derive_diet_rule_set(profile));

        let table = self
            .rules
            .load_rules(diet_key, mode, locale)
            .await
            .map_err(|e| unavailable(diet_key, e))?;
        let admin = table
            .rules
            .iter()
            .filter(|row| row.is_active())
            .map(GuardRule::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| unavailable(diet_key, e))?;

        let household = match household_id {
            Some(id) => {
                let rows = self
                    .households
                    .load_household_rules(id)
                    .await
                    .map_err(|e| unavailable(diet_key, e))?;
                let rules = rows
                    .iter()
                    .map(HouseholdAvoidRule::try_from)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| unavailable(diet_key, e))?;
                household_guard_rules(&rules)
            }
            None => Vec::new(),
        };

        let (admin_count, household_count) = (admin.len(), household.len());
        let set = GuardRuleSet::new(diet_key, compiled, table.version)
            .and_then(|set| set.merge(admin))
            .and_then(|set| set.merge(household))
            .map_err(|e| unavailable(diet_key, e))?;

        debug!(
            diet = %diet_key,
            mode = %mode,
            locale = %locale,
            rules = set.len(),
            admin = admin_count,
            household = household_count,
            version = set.version,
            content_hash = %set.content_hash,
            "Loaded guardrails ruleset"
        );
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diet_guard_core::{RuleSource, ADMIN_RULE_PRIORITY, HOUSEHOLD_RULE_PRIORITY};

    fn row(id: &str, value: &str) -> RawGuardRuleRow {
        RawGuardRuleRow {
            id: Some(id.into()),
            match_mode: Some("term".into()),
            match_value: Some(value.into()),
            ..Default::default()
        }
    }

    fn loader(table: Arc<InMemoryRuleTable>, households: Arc<InMemoryHouseholdRules>) -> RulesetLoader {
        RulesetLoader::new(table, households)
    }

    #[tokio::test]
    async fn test_merges_admin_and_household_rules() {
        let table = Arc::new(InMemoryRuleTable::new());
        let mut inactive = row("a2", "suiker");
        inactive.is_active = Some(false);
        table
            .set_table(DietKey::Keto, AdminRuleTable { rules: vec![row("a1", "pinda"), inactive], version: 7 })
            .await;
        let households = Arc::new(InMemoryHouseholdRules::new());
        households
            .set_rules(
                "hh-1",
                vec![RawHouseholdRuleRow {
                    id: Some("h1".into()),
                    match_mode: Some("term".into()),
                    match_value: Some("kaas".into()),
                    ..Default::default()
                }],
            )
            .await;

        let set = loader(table, households)
            .load(&DietProfile::new(DietKey::Keto), Some("hh-1"), EvaluationMode::PlanChat, "nl")
            .await
            .unwrap();
        assert_eq!(set.version, 7);
        assert_eq!(set.rules()[0].source, RuleSource::Household);
        assert_eq!(set.rules()[0].priority, HOUSEHOLD_RULE_PRIORITY);
        assert_eq!(set.rule("admin:a1").map(|r| r.priority), Some(ADMIN_RULE_PRIORITY));
        assert!(set.rule("admin:a2").is_none());
    }

    #[tokio::test]
    async fn test_invalid_admin_row_fails_closed() {
        let table = Arc::new(InMemoryRuleTable::new());
        table
            .set_table(DietKey::Balanced, AdminRuleTable { rules: vec![row("a1", " ")], version: 1 })
            .await;
        let err = loader(table, Arc::new(InMemoryHouseholdRules::new()))
            .load(&DietProfile::new(DietKey::Balanced), None, EvaluationMode::PlanChat, "nl")
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::RulesetUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_admin_priority_stays_below_household() {
        let households = Arc::new(InMemoryHouseholdRules::new());
        households
            .set_rules(
                "hh-1",
                vec![RawHouseholdRuleRow {
                    id: Some("h1".into()),
                    match_mode: Some("term".into()),
                    match_value: Some("kaas".into()),
                    ..Default::default()
                }],
            )
            .await;
        let profile = DietProfile::new(DietKey::Balanced);

        let table = Arc::new(InMemoryRuleTable::new());
        let mut outranking = row("a1", "kaas");
        outranking.strictness = Some("soft".into());
        outranking.priority = Some(5000);
        table
            .set_table(DietKey::Balanced, AdminRuleTable { rules: vec![outranking.clone()], version: 1 })
            .await;
        let err = loader(table.clone(), households.clone())
            .load(&profile, Some("hh-1"), EvaluationMode::PlanChat, "nl")
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::RulesetUnavailable { .. }));
        assert!(err.to_string().contains("priority"));

        outranking.priority = Some(i64::from(HOUSEHOLD_RULE_PRIORITY) - 1);
        table
            .set_table(DietKey::Balanced, AdminRuleTable { rules: vec![outranking], version: 2 })
            .await;
        let set = loader(table, households)
            .load(&profile, Some("hh-1"), EvaluationMode::PlanChat, "nl")
            .await
            .unwrap();
        assert_eq!(set.rules()[0].id, "household:h1");
        assert_eq!(set.rules()[1].id, "admin:a1");
    }

    #[tokio::test]
    async fn test_duplicate_admin_ids_fail_closed() {
        let table = Arc::new(InMemoryRuleTable::new());
        table
            .set_table(
                DietKey::Balanced,
                AdminRuleTable { rules: vec![row("a1", "pinda"), row("a1", "noten")], version: 1 },
            )
            .await;
        let err = loader(table, Arc::new(InMemoryHouseholdRules::new()))
            .load(&DietProfile::new(DietKey::Balanced), None, EvaluationMode::PlanChat, "nl")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("duplicate guard rule id"));
    }

    #[tokio::test]
    async fn test_override_store_crud() {
        let store = InMemoryOverrideStore::new();
        let row = RawOverrideRow {
            id: Some("ovr-1".into()),
            forbidden_term: Some("aardappel".into()),
            exclude_if_contains: vec!["zoete aardappel".into()],
            is_active: None,
        };
        store.insert_override(row.clone()).await.unwrap();
        assert!(store.insert_override(row.clone()).await.is_err());
        assert!(store.update_override(RawOverrideRow { is_active: Some(false), ..row }).await.unwrap());
        assert_eq!(store.load_overrides().await.unwrap()[0].is_active, Some(false));
        assert!(store.delete_override("ovr-1").await.unwrap());
        assert!(!store.delete_override("ovr-1").await.unwrap());
    }
}
