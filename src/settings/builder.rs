//! Builder for [`WorkflowSettings`].
//!
//! Setters consume and return the builder. [`WorkflowSettingsBuilder::build`]
//! borrows it, so one builder can produce several independent snapshots.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{WorkflowSettings, WorkflowState};
use crate::config::{property_or, ConfigResult, ConfigSource, ConfigurationError, EnvironmentSource};
use crate::constants::{defaults, keys};
use crate::history::{DeleteHistoryCondition, RandomSource, ThreadSafeRng};

/// Mutable defaults that freeze into [`WorkflowSettings`]
#[derive(Debug, Clone)]
pub struct WorkflowSettingsBuilder<S: WorkflowState> {
    min_error_transition_delay: u64,
    max_error_transition_delay: u64,
    short_transition_delay: u64,
    immediate_transition_delay: u64,
    max_retries: u32,
    max_subsequent_state_executions: u32,
    max_subsequent_state_executions_per_state: HashMap<S, u32>,
    history_deletable_after_hours: Option<u32>,
    default_priority: i16,
    delete_history_condition: Option<DeleteHistoryCondition>,
    random: Arc<dyn RandomSource>,
}

impl<S: WorkflowState> WorkflowSettingsBuilder<S> {
    /// Builder with the hard-coded defaults
    pub fn new() -> Self {
        Self {
            min_error_transition_delay: defaults::MIN_ERROR_TRANSITION_DELAY_MS,
            max_error_transition_delay: defaults::MAX_ERROR_TRANSITION_DELAY_MS,
            short_transition_delay: defaults::SHORT_TRANSITION_DELAY_MS,
            immediate_transition_delay: defaults::IMMEDIATE_TRANSITION_DELAY_MS,
            max_retries: defaults::MAX_RETRIES,
            max_subsequent_state_executions: defaults::MAX_SUBSEQUENT_STATE_EXECUTIONS,
            max_subsequent_state_executions_per_state: HashMap::new(),
            history_deletable_after_hours: None,
            default_priority: defaults::DEFAULT_PRIORITY,
            delete_history_condition: None,
            random: Arc::new(ThreadSafeRng::new()),
        }
    }

    /// Builder seeded from `source`, one lookup per key.
    ///
    /// A missing source or a missing key keeps the default. A value that is
    /// present but does not parse is an error.
    pub fn from_source(source: Option<&dyn ConfigSource>) -> ConfigResult<Self> {
        let mut builder = Self::new();

        builder.min_error_transition_delay = property_or(
            source,
            keys::ERROR_TRANSITION_MIN_DELAY_MS,
            defaults::MIN_ERROR_TRANSITION_DELAY_MS,
        )?;
        builder.max_error_transition_delay = property_or(
            source,
            keys::ERROR_TRANSITION_MAX_DELAY_MS,
            defaults::MAX_ERROR_TRANSITION_DELAY_MS,
        )?;
        builder.short_transition_delay = property_or(
            source,
            keys::SHORT_TRANSITION_DELAY_MS,
            defaults::SHORT_TRANSITION_DELAY_MS,
        )?;
        builder.immediate_transition_delay = property_or(
            source,
            keys::IMMEDIATE_TRANSITION_DELAY_MS,
            defaults::IMMEDIATE_TRANSITION_DELAY_MS,
        )?;
        builder.max_retries = property_or(source, keys::MAX_STATE_RETRIES, defaults::MAX_RETRIES)?;

        Ok(builder)
    }

    /// Builder seeded from `WORKFLOW_*` environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_source(Some(&EnvironmentSource))
    }

    /// Error backoff floor, in milliseconds
    pub fn with_min_error_transition_delay(mut self, delay_ms: u64) -> Self {
        self.min_error_transition_delay = delay_ms;
        self
    }

    /// Error backoff ceiling, in milliseconds
    pub fn with_max_error_transition_delay(mut self, delay_ms: u64) -> Self {
        self.max_error_transition_delay = delay_ms;
        self
    }

    /// Busy loop delay, in milliseconds
    pub fn with_short_transition_delay(mut self, delay_ms: u64) -> Self {
        self.short_transition_delay = delay_ms;
        self
    }

    pub fn with_immediate_transition_delay(mut self, delay_ms: u64) -> Self {
        self.immediate_transition_delay = delay_ms;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Cap for states without their own override
    pub fn with_max_subsequent_state_executions(mut self, executions: u32) -> Self {
        self.max_subsequent_state_executions = executions;
        self
    }

    /// Cap for one state. Later calls for the same state replace earlier ones.
    pub fn with_max_subsequent_state_executions_for(mut self, state: S, executions: u32) -> Self {
        self.max_subsequent_state_executions_per_state
            .insert(state, executions);
        self
    }

    pub fn with_history_deletable_after_hours(mut self, hours: Option<u32>) -> Self {
        self.history_deletable_after_hours = hours;
        self
    }

    pub fn with_default_priority(mut self, priority: i16) -> Self {
        self.default_priority = priority;
        self
    }

    /// Replace the default one-in-ten sampler
    pub fn with_delete_history_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.delete_history_condition = Some(DeleteHistoryCondition::custom(condition));
        self
    }

    pub fn with_delete_history_policy(mut self, condition: DeleteHistoryCondition) -> Self {
        self.delete_history_condition = Some(condition);
        self
    }

    /// Random source behind the default history sampler
    pub fn with_random_source(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Freeze the current values. The override map is copied, so later changes
    /// to this builder never reach the returned settings.
    pub fn build(&self) -> WorkflowSettings<S> {
        let delete_history_condition = self
            .delete_history_condition
            .clone()
            .unwrap_or_else(|| DeleteHistoryCondition::default_sampler(Arc::clone(&self.random)));

        debug!(
            min_error_transition_delay = self.min_error_transition_delay,
            max_error_transition_delay = self.max_error_transition_delay,
            short_transition_delay = self.short_transition_delay,
            max_retries = self.max_retries,
            state_overrides = self.max_subsequent_state_executions_per_state.len(),
            "Building workflow settings"
        );

        WorkflowSettings {
            min_error_transition_delay: self.min_error_transition_delay,
            max_error_transition_delay: self.max_error_transition_delay,
            short_transition_delay: self.short_transition_delay,
            immediate_transition_delay: self.immediate_transition_delay,
            max_retries: self.max_retries,
            max_subsequent_state_executions: self.max_subsequent_state_executions,
            max_subsequent_state_executions_per_state: self
                .max_subsequent_state_executions_per_state
                .clone(),
            history_deletable_after_hours: self.history_deletable_after_hours,
            default_priority: self.default_priority,
            delete_history_condition,
        }
    }

    /// [`build`](Self::build), rejecting an error delay floor above its ceiling
    pub fn try_build(&self) -> ConfigResult<WorkflowSettings<S>> {
        if self.min_error_transition_delay > self.max_error_transition_delay {
            warn!(
                min = self.min_error_transition_delay,
                max = self.max_error_transition_delay,
                "Rejecting workflow settings with min error delay above max"
            );
            return Err(ConfigurationError::validation_error(format!(
                "min error transition delay {}ms exceeds max {}ms",
                self.min_error_transition_delay, self.max_error_transition_delay
            )));
        }
        Ok(self.build())
    }
}

impl<S: WorkflowState> Default for WorkflowSettingsBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
