// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for rate limiting
//!
//! These tests use proptest to validate invariants about per-chain limit and
//! timeout resolution across a wide range of configurations.

use std::time::Duration;

use proptest::prelude::*;
use swapscan::{SwapscanConfig, SwapscanConfigBuilder};

// Chain names as the feed adapter produces them
fn arb_chain() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("Ethereum"),
        Just("Arbitrum"),
        Just("Base"),
        Just("Optimism"),
        Just("Polygon"),
        Just("Avalanche"),
        Just("BSC"),
        Just("Blast"),
    ]
}

// Same chain name with arbitrary casing
fn recased(chain: &str, mask: u32) -> String {
    chain
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if mask & (1 << (i % 32)) != 0 {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

proptest! {
    /// Property: Chain-specific limit should always override the global limit
    #[test]
    fn prop_chain_override_always_wins(
        global in 1u32..=100,
        per_chain in 1u32..=100,
        chain in arb_chain(),
    ) {
        let config = SwapscanConfigBuilder::new()
            .requests_per_second(global)
            .chain_requests_per_second(chain, per_chain)
            .build();

        prop_assert_eq!(config.get_requests_per_second(chain), Some(per_chain));
    }

    /// Property: If no chain-specific override, the global limit applies
    #[test]
    fn prop_global_applies_without_override(global in 1u32..=100, chain in arb_chain()) {
        let config = SwapscanConfigBuilder::new()
            .requests_per_second(global)
            .build();

        prop_assert_eq!(config.get_requests_per_second(chain), Some(global));
    }

    /// Property: Minimal config never limits any chain
    #[test]
    fn prop_minimal_always_none(chain in arb_chain()) {
        let config = SwapscanConfig::minimal();
        prop_assert_eq!(config.get_requests_per_second(chain), None);
        prop_assert_eq!(config.get_rpc_timeout(chain), Duration::from_secs(30));
    }

    /// Property: Overrides resolve regardless of the casing used on either side
    #[test]
    fn prop_lookup_ignores_case(
        chain in arb_chain(),
        set_mask in any::<u32>(),
        get_mask in any::<u32>(),
        rps in 1u32..=100,
    ) {
        let config = SwapscanConfigBuilder::new()
            .chain_requests_per_second(&recased(chain, set_mask), rps)
            .build();

        prop_assert_eq!(config.get_requests_per_second(&recased(chain, get_mask)), Some(rps));
    }

    /// Property: Multiple chain overrides should be independent
    #[test]
    fn prop_multiple_overrides_independent(
        chain1 in arb_chain(),
        chain2 in arb_chain(),
        rps1 in 1u32..=100,
        rps2 in 1u32..=100,
    ) {
        prop_assume!(chain1 != chain2);

        let config = SwapscanConfigBuilder::new()
            .chain_requests_per_second(chain1, rps1)
            .chain_requests_per_second(chain2, rps2)
            .build();

        prop_assert_eq!(config.get_requests_per_second(chain1), Some(rps1));
        prop_assert_eq!(config.get_requests_per_second(chain2), Some(rps2));
    }

    /// Property: Limit and timeout for one chain are preserved independently
    #[test]
    fn prop_independent_chain_settings(
        chain in arb_chain(),
        rps in 1u32..=100,
        timeout_secs in 1u64..=600,
    ) {
        let timeout = Duration::from_secs(timeout_secs);
        let config = SwapscanConfigBuilder::new()
            .chain_timeout(chain, timeout)
            .chain_requests_per_second(chain, rps)
            .build();

        prop_assert_eq!(config.get_requests_per_second(chain), Some(rps));
        prop_assert_eq!(config.get_rpc_timeout(chain), timeout);
    }

    /// Property: Overriding a chain multiple times should use the last value
    #[test]
    fn prop_last_override_wins(
        chain in arb_chain(),
        first in 1u32..=100,
        second in 1u32..=100,
        last in 1u32..=100,
    ) {
        let config = SwapscanConfigBuilder::new()
            .chain_requests_per_second(chain, first)
            .chain_requests_per_second(chain, second)
            .chain_requests_per_second(chain, last)
            .build();

        prop_assert_eq!(config.get_requests_per_second(chain), Some(last));
    }
}
