//! # Workflow Settings
//!
//! Immutable timing and retry policy consulted by the workflow step scheduler.
//!
//! ## Overview
//!
//! A [`WorkflowSettings`] value answers four questions:
//!
//! - when to retry a state after an error ([`WorkflowSettings::error_backoff_deadline`])
//! - when to re-run a state that loops without progress ([`WorkflowSettings::busy_loop_backoff_deadline`])
//! - how many consecutive executions a state may have ([`WorkflowSettings::max_subsequent_executions`])
//! - whether a completed workflow's history may be deleted ([`WorkflowSettings::should_delete_history`])
//!
//! Values are produced by [`WorkflowSettingsBuilder::build`] and never change
//! afterwards. The only shared mutable element is the random source behind the
//! default history deletion policy.
//!
//! ## Usage
//!
//! ```rust
//! use workflow_settings::WorkflowSettingsBuilder;
//!
//! #[derive(Debug, Clone, PartialEq, Eq, Hash)]
//! enum OrderState {
//!     Validate,
//!     Charge,
//! }
//!
//! let settings = WorkflowSettingsBuilder::new()
//!     .with_min_error_transition_delay(1000)
//!     .with_max_error_transition_delay(60_000)
//!     .with_max_subsequent_state_executions_for(OrderState::Charge, 3)
//!     .build();
//!
//! assert_eq!(settings.error_transition_delay(0), 2000);
//! assert_eq!(settings.max_subsequent_executions(&OrderState::Charge), 3);
//! assert_eq!(settings.max_subsequent_executions(&OrderState::Validate), 100);
//! ```

mod builder;

pub use builder::WorkflowSettingsBuilder;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::backoff::{deadline_after, BinaryBackoff};
use crate::history::DeleteHistoryCondition;

/// Token identifying a workflow state, supplied by the workflow definition
pub trait WorkflowState: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> WorkflowState for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// Resolved workflow execution policy
#[derive(Debug, Clone)]
pub struct WorkflowSettings<S: WorkflowState> {
    min_error_transition_delay: u64,
    max_error_transition_delay: u64,
    short_transition_delay: u64,
    immediate_transition_delay: u64,
    max_retries: u32,
    max_subsequent_state_executions: u32,
    max_subsequent_state_executions_per_state: HashMap<S, u32>,
    history_deletable_after_hours: Option<u32>,
    default_priority: i16,
    delete_history_condition: DeleteHistoryCondition,
}

/// Serializable view of the scalar settings, for logging and diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsSummary {
    pub min_error_transition_delay_ms: u64,
    pub max_error_transition_delay_ms: u64,
    pub short_transition_delay_ms: u64,
    pub immediate_transition_delay_ms: u64,
    pub max_retries: u32,
    pub max_subsequent_state_executions: u32,
    pub state_overrides: usize,
    pub history_deletable_after_hours: Option<u32>,
    pub default_priority: i16,
}

impl<S: WorkflowState> WorkflowSettings<S> {
    /// Time of the next attempt after `retry_count` failed retries
    pub fn error_backoff_deadline(&self, retry_count: u32) -> DateTime<Utc> {
        self.error_backoff_deadline_from(Utc::now(), retry_count)
    }

    /// [`error_backoff_deadline`](Self::error_backoff_deadline) measured from an explicit `now`
    pub fn error_backoff_deadline_from(&self, now: DateTime<Utc>, retry_count: u32) -> DateTime<Utc> {
        self.error_backoff().next_activation(now, retry_count)
    }

    /// Backoff delay in milliseconds after `retry_count` failed retries.
    ///
    /// Always within `[min_error_transition_delay, max_error_transition_delay]`
    /// and non-decreasing in `retry_count`.
    pub fn error_transition_delay(&self, retry_count: u32) -> u64 {
        self.error_backoff().delay_for_retry(retry_count)
    }

    /// Time to re-run a state detected spinning without progress
    pub fn busy_loop_backoff_deadline(&self) -> DateTime<Utc> {
        self.busy_loop_backoff_deadline_from(Utc::now())
    }

    pub fn busy_loop_backoff_deadline_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        deadline_after(now, self.short_transition_delay)
    }

    /// Time to run a state scheduled for immediate execution
    pub fn immediate_transition_deadline(&self) -> DateTime<Utc> {
        self.immediate_transition_deadline_from(Utc::now())
    }

    pub fn immediate_transition_deadline_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        deadline_after(now, self.immediate_transition_delay)
    }

    /// Consecutive executions allowed for `state` before it is treated as stuck
    pub fn max_subsequent_executions(&self, state: &S) -> u32 {
        self.max_subsequent_state_executions_per_state
            .get(state)
            .copied()
            .unwrap_or(self.max_subsequent_state_executions)
    }

    /// Evaluate the history deletion policy once
    pub fn should_delete_history(&self) -> bool {
        self.delete_history_condition.evaluate()
    }

    pub fn min_error_transition_delay(&self) -> u64 {
        self.min_error_transition_delay
    }

    pub fn max_error_transition_delay(&self) -> u64 {
        self.max_error_transition_delay
    }

    pub fn short_transition_delay(&self) -> u64 {
        self.short_transition_delay
    }

    pub fn immediate_transition_delay(&self) -> u64 {
        self.immediate_transition_delay
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Fallback cap for states without an override
    pub fn default_max_subsequent_state_executions(&self) -> u32 {
        self.max_subsequent_state_executions
    }

    pub fn history_deletable_after_hours(&self) -> Option<u32> {
        self.history_deletable_after_hours
    }

    pub fn default_priority(&self) -> i16 {
        self.default_priority
    }

    pub fn delete_history_condition(&self) -> &DeleteHistoryCondition {
        &self.delete_history_condition
    }

    pub fn summary(&self) -> SettingsSummary {
        SettingsSummary {
            min_error_transition_delay_ms: self.min_error_transition_delay,
            max_error_transition_delay_ms: self.max_error_transition_delay,
            short_transition_delay_ms: self.short_transition_delay,
            immediate_transition_delay_ms: self.immediate_transition_delay,
            max_retries: self.max_retries,
            max_subsequent_state_executions: self.max_subsequent_state_executions,
            state_overrides: self.max_subsequent_state_executions_per_state.len(),
            history_deletable_after_hours: self.history_deletable_after_hours,
            default_priority: self.default_priority,
        }
    }

    fn error_backoff(&self) -> BinaryBackoff {
        BinaryBackoff::new(
            self.min_error_transition_delay,
            self.max_error_transition_delay,
        )
    }
}
