//! # diet-guard
//!
//! Service layer around the guardrails decision procedure.
//!
//! - [`RulesetLoader`]: derives the diet rule set from a profile and merges
//!   admin and household rules loaded through async source traits
//! - [`OverrideCache`] / [`OverrideAdmin`]: memoized override table with
//!   write-through invalidation
//! - [`GuardrailsService`]: fail-closed plan evaluation
//! - [`DraftActions`]: draft plan mutations, serialized per plan and
//!   persisted only when not blocked
//!
//! Raw rows from external tables are validated in [`records`] before they
//! reach the evaluator.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use diet_guard::{
//!     EvaluationRequest, GuardConfig, GuardrailsService, InMemoryHouseholdRules,
//!     InMemoryOverrideStore, InMemoryRuleTable, OverrideCache, RulesetLoader,
//! };
//! use diet_guard_types::{DietKey, DietProfile, MealPlanSnapshot};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GuardConfig::load(None)?;
//! diet_guard::logging::init(&config.logging);
//!
//! let loader = RulesetLoader::new(
//!     Arc::new(InMemoryRuleTable::new()),
//!     Arc::new(InMemoryHouseholdRules::new()),
//! );
//! let overrides = Arc::new(OverrideCache::new(Arc::new(InMemoryOverrideStore::new())));
//! let service = GuardrailsService::new(loader, overrides, config.guardrails);
//!
//! let request = EvaluationRequest::new(DietProfile::new(DietKey::Keto), MealPlanSnapshot::new("plan-1"));
//! let result = service.evaluate_plan(&request).await?;
//! println!("{}: {}", result.decision.outcome, result.decision.summary);
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod cache;
pub mod config;
pub mod drafts;
pub mod error;
pub mod loader;
pub mod logging;
pub mod records;
pub mod service;

pub use admin::OverrideAdmin;
pub use cache::OverrideCache;
pub use config::{GuardConfig, GuardrailsConfig, LoggingConfig};
pub use drafts::{DraftActions, DraftPlan, DraftPlanStore, DraftUpdate, InMemoryDraftStore};
pub use error::{DraftError, DraftResult, GuardError, GuardResult, SourceError};
pub use loader::{
    AdminRuleTable, HouseholdRuleSource, InMemoryHouseholdRules, InMemoryOverrideStore,
    InMemoryRuleTable, OverrideSource, OverrideStore, RulesetLoader, RulesetSource, SourceResult,
};
pub use records::{RawGuardRuleRow, RawHouseholdRuleRow, RawOverrideRow, RecordError};
pub use service::{validate_plan, EvaluationRequest, GuardrailsResult, GuardrailsService};

pub use diet_guard_core::{EvaluationMode, GuardrailsDecision, Outcome};
