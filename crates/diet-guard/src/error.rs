//! Error types for the guardrails service layer

use chrono::NaiveDate;
use diet_guard_core::GuardrailsDecision;
use diet_guard_types::MealSlot;
use thiserror::Error;

use crate::records::RecordError;

/// Failures reported by an external collaborator.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Errors from loading rules and evaluating a plan.
///
/// Callers must treat every variant as a block.
#[derive(Error, Debug, Clone)]
pub enum GuardError {
    #[error("guardrails ruleset unavailable: {reason}")]
    RulesetUnavailable { reason: String },

    #[error("guardrail overrides unavailable: {reason}")]
    OverridesUnavailable { reason: String },

    #[error("invalid meal plan: {reason}")]
    InvalidPlan { reason: String },
}

/// Errors from draft plan actions.
#[derive(Error, Debug)]
pub enum DraftError {
    #[error("draft plan not found: {0}")]
    PlanNotFound(String),

    #[error("plan has no day {0}")]
    DayNotFound(NaiveDate),

    #[error("plan has no {slot} meal on {date}")]
    SlotNotFound { date: NaiveDate, slot: MealSlot },

    #[error("draft version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("plan blocked by guardrails: {}", .decision.summary)]
    Blocked { decision: Box<GuardrailsDecision> },

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error("draft store error: {0}")]
    Store(#[from] SourceError),
}

impl DraftError {
    /// The blocking decision, when the draft was refused by guardrails.
    pub fn decision(&self) -> Option<&GuardrailsDecision> {
        match self {
            DraftError::Blocked { decision } => Some(decision),
            _ => None,
        }
    }
}

pub type GuardResult<T> = Result<T, GuardError>;
pub type DraftResult<T> = Result<T, DraftError>;
