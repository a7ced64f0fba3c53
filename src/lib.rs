#![allow(clippy::doc_markdown)] // Allow technical terms in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Workflow Settings
//!
//! Timing and retry policy for workflow step scheduling.
//!
//! ## Overview
//!
//! A workflow engine repeatedly asks the same questions while driving steps:
//! how long to back off after an error, how long to wait when a step spins
//! without progress, how many times a step may re-run before it is stuck, and
//! whether a finished workflow's history should be cleaned up. This crate
//! answers them from one immutable [`WorkflowSettings`] value.
//!
//! ## Module Organization
//!
//! - [`settings`] - The settings value and its builder
//! - [`backoff`] - Overflow-safe binary exponential backoff
//! - [`history`] - History deletion sampling with injectable randomness
//! - [`config`] - Configuration sources and the layered loader
//! - [`constants`] - Configuration keys and defaults
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use workflow_settings::WorkflowSettingsBuilder;
//!
//! let settings = WorkflowSettingsBuilder::<&'static str>::new()
//!     .with_max_subsequent_state_executions(200)
//!     .with_max_subsequent_state_executions_for("poll", 300)
//!     .build();
//!
//! let retry_at = settings.error_backoff_deadline(0);
//! let spin_at = settings.busy_loop_backoff_deadline();
//! assert!(retry_at > spin_at);
//!
//! assert_eq!(settings.max_subsequent_executions(&"poll"), 300);
//! assert_eq!(settings.max_subsequent_executions(&"charge"), 200);
//! ```

pub mod backoff;
pub mod config;
pub mod constants;
pub mod history;
pub mod logging;
pub mod settings;

pub use backoff::{binary_backoff_delay, BinaryBackoff};
pub use crate::config::{
    ConfigResult, ConfigSource, ConfigurationError, EnvironmentSource, SettingsLoader,
};
pub use history::{DeleteHistoryCondition, RandomSource, ThreadSafeRng};
pub use settings::{SettingsSummary, WorkflowSettings, WorkflowSettingsBuilder, WorkflowState};
