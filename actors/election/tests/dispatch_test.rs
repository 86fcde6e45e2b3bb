// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod common;

use std::collections::HashSet;

use common::*;
use dpos_actor_election::abi::{self, Token};
use dpos_actor_election::power::vote_power;
use dpos_actor_election::{state, Election, ElectionError, Method};
use num_bigint::BigInt;
use runtime::StateDB;

#[test]
fn the_stake_selector_matches_the_published_fingerprint() {
    assert_eq!(Method::Stake.selector(), [0xa6, 0x94, 0xfc, 0x3a]);
}

#[test]
fn selectors_are_distinct() {
    let selectors: HashSet<_> = Method::ALL.iter().map(|m| m.selector()).collect();
    assert_eq!(selectors.len(), Method::ALL.len());
    for method in Method::ALL {
        assert_eq!(Method::from_selector(method.selector()), Some(method));
    }
}

#[test]
fn unknown_and_short_selectors_are_refused() {
    let mut ctx = new_context();
    assert_eq!(
        Election::run(&mut ctx, &hex::decode("c94ba775").unwrap()),
        Err(ElectionError::MethodUnknown)
    );
    assert_eq!(Election::run(&mut ctx, &[0xa6, 0x94]), Err(ElectionError::MethodUnknown));
    assert_eq!(Election::run(&mut ctx, &[]), Err(ElectionError::MethodUnknown));
}

#[test]
fn garbled_arguments_are_refused() {
    let mut ctx = new_context();
    ctx.db.add_balance(&addr(111), &wei(100));

    // stake(uint256) with a truncated word.
    let mut input = Method::Stake.selector().to_vec();
    input.extend_from_slice(&[0u8; 16]);
    assert_eq!(Election::run(&mut ctx, &input), Err(ElectionError::InvalidArgument));
}

#[test]
fn staking_through_the_dispatcher_moves_the_balance() {
    let mut ctx = new_context();
    ctx.db.add_balance(&addr(111), &wei(100));

    let input = abi::encode_call("stake(uint256)", &[Token::Uint(BigInt::from(100))]);
    let output = Election::run(&mut ctx, &input).unwrap();

    assert!(output.is_empty());
    assert_eq!(ctx.db.get_balance(&addr(111)), BigInt::from(0));
    assert_eq!(
        state::get_stake(&ctx.db, &addr(111)).unwrap().stake_count,
        BigInt::from(100)
    );
}

/// Drives a full election round through the raw call interface only.
#[test]
fn a_round_through_the_dispatcher() {
    let mut ctx = new_context();

    // Witnesses register themselves.
    for witness in candidates() {
        ctx.origin = witness;
        Election::run(&mut ctx, &abi::encode_call("registerWitness(bytes)", &[Token::Bytes(test_url())]))
            .unwrap();
    }

    // A proxy opens for delegation and votes its own stake.
    ctx.origin = addr(10);
    ctx.db.add_balance(&addr(10), &wei(100));
    Election::run(&mut ctx, &abi::encode_call("stake(uint256)", &[Token::Uint(BigInt::from(100))]))
        .unwrap();
    Election::run(&mut ctx, &abi::encode_call("startProxy()", &[])).unwrap();
    Election::run(
        &mut ctx,
        &abi::encode_call("voteWitnesses(address[])", &[Token::Addresses(candidates())]),
    )
    .unwrap();

    // A delegator hands its weight over.
    ctx.origin = addr(111);
    ctx.db.add_balance(&addr(111), &wei(10));
    Election::run(&mut ctx, &abi::encode_call("stake(uint256)", &[Token::Uint(BigInt::from(10))]))
        .unwrap();
    Election::run(&mut ctx, &abi::encode_call("setProxy(address)", &[Token::Address(addr(10))]))
        .unwrap();

    let expect = vote_power(&BigInt::from(100), &ctx.time) + vote_power(&BigInt::from(10), &ctx.time);
    for candidate in candidates() {
        assert_eq!(state::get_candidate(&ctx.db, &candidate).unwrap().vote_count, expect);
    }
    assert_state_valid(&ctx);

    // And takes it back.
    Election::run(&mut ctx, &abi::encode_call("cancelProxy()", &[])).unwrap();
    let expect = vote_power(&BigInt::from(100), &ctx.time);
    for candidate in candidates() {
        assert_eq!(state::get_candidate(&ctx.db, &candidate).unwrap().vote_count, expect);
    }
    assert_state_valid(&ctx);
}

#[test]
fn calls_without_preconditions_fail_cleanly() {
    let mut ctx = new_context();
    let calls: Vec<(Vec<u8>, ElectionError)> = vec![
        (abi::encode_call("unStake()", &[]), ElectionError::StakeMissing),
        (abi::encode_call("unregisterWitness()", &[]), ElectionError::CandidateMissing),
        (
            abi::encode_call("voteWitnesses(address[])", &[Token::Addresses(vec![addr(10)])]),
            ElectionError::StakeMissing,
        ),
        (abi::encode_call("cancelVote()", &[]), ElectionError::NoVoter(addr(111))),
        (abi::encode_call("stopProxy()", &[]), ElectionError::ProxyMissing),
        (
            abi::encode_call("setProxy(address)", &[Token::Address(addr(10))]),
            ElectionError::StakeMissing,
        ),
        (abi::encode_call("cancelProxy()", &[]), ElectionError::NotSetProxy),
        (abi::encode_call("extractOwnBounty()", &[]), ElectionError::CandidateMissing),
    ];
    for (input, expect) in calls {
        let before = ctx.db.clone();
        assert_eq!(Election::run(&mut ctx, &input), Err(expect));
        assert_eq!(ctx.db, before, "failed call must leave no trace");
    }
}

#[test]
fn identical_inputs_produce_identical_states() {
    let run = || {
        let mut ctx = new_context();
        register_candidates(&mut ctx, &candidates());
        ctx.db.add_balance(&addr(111), &wei(10));
        let inputs = [
            abi::encode_call("stake(uint256)", &[Token::Uint(BigInt::from(10))]),
            abi::encode_call("startProxy()", &[]),
            abi::encode_call("voteWitnesses(address[])", &[Token::Addresses(candidates())]),
            abi::encode_call("stopProxy()", &[]),
        ];
        for input in &inputs {
            Election::run(&mut ctx, input).unwrap();
        }
        ctx.db
    };
    assert_eq!(run(), run());
}
