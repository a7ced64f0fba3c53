use proptest::prelude::*;
use workflow_settings::{binary_backoff_delay, WorkflowSettingsBuilder};

proptest! {
    /// Property: backoff delays stay within [min, max]
    #[test]
    fn backoff_delay_is_bounded(
        min in 0u64..10_000_000,
        extra in 0u64..10_000_000_000,
        exponent in 0u32..200,
    ) {
        let max = min + extra;
        let delay = binary_backoff_delay(exponent, min, max);
        prop_assert!(delay >= min);
        prop_assert!(delay <= max);
    }

    /// Property: backoff never decreases as the retry count grows
    #[test]
    fn backoff_delay_is_monotonic(
        min in 0u64..u64::MAX / 2,
        extra in 0u64..u64::MAX / 2,
        exponent in 0u32..300,
    ) {
        let max = min + extra;
        prop_assert!(binary_backoff_delay(exponent + 1, min, max) >= binary_backoff_delay(exponent, min, max));
    }

    /// Property: once the cap is reached every later retry stays on it
    #[test]
    fn backoff_plateau_is_stable(min in 1u64..1_000_000, max_factor in 1u64..1_000) {
        let max = min * max_factor;
        let settings = WorkflowSettingsBuilder::<u8>::new()
            .with_min_error_transition_delay(min)
            .with_max_error_transition_delay(max)
            .build();

        let first_capped = (0..200u32)
            .find(|r| settings.error_transition_delay(*r) == max)
            .expect("delay should reach the cap");
        for retry_count in first_capped..first_capped + 100 {
            prop_assert_eq!(settings.error_transition_delay(retry_count), max);
        }
    }

    /// Property: override lookups return the override or the default, nothing else
    #[test]
    fn state_override_lookup(
        default_cap in 0u32..10_000,
        overrides in proptest::collection::hash_map(0u8..32, 0u32..10_000, 0..16),
        state in 0u8..64,
    ) {
        let mut builder = WorkflowSettingsBuilder::new().with_max_subsequent_state_executions(default_cap);
        for (overridden, cap) in &overrides {
            builder = builder.with_max_subsequent_state_executions_for(*overridden, *cap);
        }
        let settings = builder.build();

        let expected = overrides.get(&state).copied().unwrap_or(default_cap);
        prop_assert_eq!(settings.max_subsequent_executions(&state), expected);
    }
}
