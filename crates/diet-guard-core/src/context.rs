//! Evaluation context
//!
//! Built fresh by the caller for every evaluation. Carries the diet, the
//! locale, the evaluation mode and the override exclusions in force.

use chrono::{DateTime, Utc};
use diet_guard_types::DietKey;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::overrides::ExcludeOverride;

/// Where an evaluation is coming from. Rules may be scoped to a subset of
/// modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Interactive edits through the plan chat
    #[default]
    PlanChat,
    /// Whole-plan generation
    BatchGeneration,
}

impl EvaluationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationMode::PlanChat => "plan_chat",
            EvaluationMode::BatchGeneration => "batch_generation",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "plan_chat" | "plan-chat" => Some(EvaluationMode::PlanChat),
            "batch_generation" | "batch-generation" | "batch" => {
                Some(EvaluationMode::BatchGeneration)
            }
            _ => None,
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context for one guardrails evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationContext {
    pub diet_key: DietKey,

    /// Locale of the plan content (ingredient texts are matched as-is)
    pub locale: String,

    pub mode: EvaluationMode,

    /// When the evaluation was requested
    pub timestamp: DateTime<Utc>,

    /// False-positive exclusions; inactive entries are ignored
    pub exclude_overrides: Vec<ExcludeOverride>,
}

impl EvaluationContext {
    /// Create a context for a diet with the default locale and mode
    pub fn new(diet_key: DietKey) -> Self {
        Self {
            diet_key,
            locale: "nl".into(),
            mode: EvaluationMode::default(),
            timestamp: Utc::now(),
            exclude_overrides: Vec::new(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Pin the timestamp (tests and replays)
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_overrides(mut self, overrides: Vec<ExcludeOverride>) -> Self {
        self.exclude_overrides = overrides;
        self
    }

    /// Overrides that can suppress a match
    pub fn active_overrides(&self) -> impl Iterator<Item = &ExcludeOverride> {
        self.exclude_overrides.iter().filter(|o| o.active)
    }
}
