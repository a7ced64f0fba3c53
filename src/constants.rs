//! # Settings Constants
//!
//! Configuration keys and hard-coded defaults that define the timing and retry
//! boundaries of workflow step scheduling.
//!
//! Keys are dotted paths. When read from the process environment they are
//! upper-cased with `.` replaced by `_`, so
//! `workflow.transition.delay.error.min.ms` becomes
//! `WORKFLOW_TRANSITION_DELAY_ERROR_MIN_MS`.

/// Configuration keys consulted when seeding a builder from a [`ConfigSource`](crate::config::ConfigSource)
pub mod keys {
    /// Floor of the error backoff delay, in milliseconds
    pub const ERROR_TRANSITION_MIN_DELAY_MS: &str = "workflow.transition.delay.error.min.ms";

    /// Ceiling of the error backoff delay, in milliseconds
    pub const ERROR_TRANSITION_MAX_DELAY_MS: &str = "workflow.transition.delay.error.max.ms";

    /// Fixed delay after busy loop detection, in milliseconds
    pub const SHORT_TRANSITION_DELAY_MS: &str = "workflow.transition.delay.waitshort.ms";

    /// Delay for steps scheduled to run immediately, in milliseconds
    pub const IMMEDIATE_TRANSITION_DELAY_MS: &str = "workflow.transition.delay.immediate.ms";

    /// Advisory maximum number of retries per state
    pub const MAX_STATE_RETRIES: &str = "workflow.max.state.retries";

    /// All keys read by the builder, in lookup order
    pub const ALL: &[&str] = &[
        ERROR_TRANSITION_MIN_DELAY_MS,
        ERROR_TRANSITION_MAX_DELAY_MS,
        SHORT_TRANSITION_DELAY_MS,
        IMMEDIATE_TRANSITION_DELAY_MS,
        MAX_STATE_RETRIES,
    ];
}

/// Default values used when a key is absent or no source is available
pub mod defaults {
    /// One minute
    pub const MIN_ERROR_TRANSITION_DELAY_MS: u64 = 60 * 1000;

    /// One day
    pub const MAX_ERROR_TRANSITION_DELAY_MS: u64 = 24 * 60 * 60 * 1000;

    /// Thirty seconds
    pub const SHORT_TRANSITION_DELAY_MS: u64 = 30 * 1000;

    pub const IMMEDIATE_TRANSITION_DELAY_MS: u64 = 0;

    pub const MAX_RETRIES: u32 = 17;

    /// Consecutive executions of one state before the scheduler treats it as stuck
    pub const MAX_SUBSEQUENT_STATE_EXECUTIONS: u32 = 100;

    pub const DEFAULT_PRIORITY: i16 = 0;

    /// History of roughly one in this many completed workflows is deleted
    pub const DELETE_HISTORY_ONE_IN: u32 = 10;
}

/// Environment variables that steer loading and logging
pub mod environment {
    /// Prefix shared by every configuration key
    pub const KEY_PREFIX: &str = "WORKFLOW";

    /// Primary environment selector (development, test, production)
    pub const ENV_VAR: &str = "WORKFLOW_ENV";

    /// Fallback environment selector
    pub const FALLBACK_ENV_VAR: &str = "APP_ENV";

    /// Set to `json` for machine-readable log output
    pub const LOG_FORMAT_VAR: &str = "WORKFLOW_LOG_FORMAT";

    pub const DEFAULT_ENVIRONMENT: &str = "development";

    /// Base name of layered configuration files (`workflow.toml`, `workflow.test.yaml`, ...)
    pub const CONFIG_FILE_STEM: &str = "workflow";
}
