//! Integration tests for receipt-log decoding feeding leg selection

mod helpers;

use alloy_primitives::{address, Address, B256, U256};
use alloy_sol_types::SolEvent;
use helpers::create_test_log;
use swapscan::config::constants::INTEGRATOR_ADDRESS;
use swapscan::events::Transfer;
use swapscan::extract::logs::transfers_from_logs;
use swapscan::extract::plan_extraction;
use swapscan::{ExtractionMethod, TokenId};

const SENDER: Address = address!("00000000000000000000000000000000000000a1");
const ROUTER: Address = address!("1111111254eeb25477b68fb85ed929f73a960582");
const TOKEN_A: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
const TOKEN_B: Address = address!("dac17f958d2ee523a2206206994597c13d831ec7");

fn transfer_log(token: Address, from: Address, to: Address, amount: u64) -> alloy_rpc_types::Log {
    create_test_log(
        token,
        vec![Transfer::SIGNATURE_HASH, from.into_word(), to.into_word()],
        U256::from(amount).to_be_bytes::<32>().to_vec(),
    )
}

#[test]
fn test_two_transfer_swap_yields_both_legs() {
    let logs = vec![
        transfer_log(TOKEN_A, SENDER, ROUTER, 100),
        transfer_log(TOKEN_B, ROUTER, SENDER, 95),
    ];
    let transfers = transfers_from_logs(&logs).unwrap();
    assert_eq!(transfers.len(), 2);

    let plan = plan_extraction(SENDER, U256::ZERO, &[], &transfers, INTEGRATOR_ADDRESS).unwrap();

    assert_eq!(plan.token_in.token, TokenId::Erc20(TOKEN_A));
    assert_eq!(plan.token_in.amount, U256::from(100));
    let out = plan.token_out.unwrap();
    assert_eq!(out.token, TokenId::Erc20(TOKEN_B));
    assert_eq!(out.amount, U256::from(95));
    assert_eq!(plan.method, ExtractionMethod::LogsAndTrace);
}

#[test]
fn test_fee_skim_is_never_the_out_leg() {
    let logs = vec![
        transfer_log(TOKEN_A, SENDER, ROUTER, 100),
        transfer_log(TOKEN_B, ROUTER, INTEGRATOR_ADDRESS, 5),
    ];
    let transfers = transfers_from_logs(&logs).unwrap();

    let plan = plan_extraction(SENDER, U256::ZERO, &[], &transfers, INTEGRATOR_ADDRESS).unwrap();

    assert_eq!(plan.token_in.token, TokenId::Erc20(TOKEN_A));
    assert!(plan.token_out.is_none());
}

#[test]
fn test_non_transfer_and_nft_logs_are_ignored() {
    let approval = create_test_log(
        TOKEN_A,
        vec![B256::repeat_byte(0x8c), SENDER.into_word(), ROUTER.into_word()],
        U256::from(1).to_be_bytes::<32>().to_vec(),
    );
    let nft = create_test_log(
        TOKEN_B,
        vec![
            Transfer::SIGNATURE_HASH,
            SENDER.into_word(),
            ROUTER.into_word(),
            B256::with_last_byte(7),
        ],
        Vec::new(),
    );

    assert!(transfers_from_logs(&[approval, nft]).unwrap().is_empty());
}

#[test]
fn test_truncated_transfer_data_is_a_decode_failure() {
    let truncated = create_test_log(
        TOKEN_A,
        vec![Transfer::SIGNATURE_HASH, SENDER.into_word(), ROUTER.into_word()],
        vec![0u8; 4],
    );

    let err = transfers_from_logs(&[truncated]).unwrap_err();
    assert_eq!(err.error_type(), "decode_failure");
}
