// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

// Not every test binary uses every helper.
#![allow(dead_code)]

use ethereum_types::H160;
use num_bigint::BigInt;

use dpos_actor_election::policy::WEI_PER_COIN;
use dpos_actor_election::testing::check_state_invariants;
use dpos_actor_election::ElectionContext;
use runtime::test_utils::TestContext;
use runtime::StateDB;

/// Block time most scenarios start at (era 6 of the bonus curve).
pub const BASE_TIME: u64 = 1_531_328_510;

/// A day and a second: enough to clear every cooldown.
pub const DAY_AND_ONE: u64 = 24 * 3600 + 1;

pub fn addr(n: u8) -> H160 {
    H160::from_low_u64_be(n as u64)
}

/// Nine registered witnesses, addresses 0x01..0x09.
pub fn candidates() -> Vec<H160> {
    (1..=9).map(addr).collect()
}

pub fn test_url() -> Vec<u8> {
    b"enode://bfa70f1319b40c319f9a7900bfb8605cae1d616f6e110bd64185397c16da658eb10980a45f6fc035da5ecdb4593008511096cb04d01ff6d44ac51200b9b903fa@[::]:30303"
        .to_vec()
}

pub fn new_context() -> TestContext {
    TestContext::new(addr(111), BASE_TIME)
}

pub fn wei(coins: u64) -> BigInt {
    BigInt::from(coins) * BigInt::from(WEI_PER_COIN)
}

/// Funds `owner` with `coins` whole coins and stakes them all.
pub fn fund_and_stake(ctx: &mut TestContext, owner: H160, coins: u64) {
    ctx.db.add_balance(&owner, &wei(coins));
    ElectionContext::new(ctx).stake(owner, &BigInt::from(coins)).unwrap();
}

pub fn register_candidates(ctx: &mut TestContext, owners: &[H160]) {
    let mut election = ElectionContext::new(ctx);
    for owner in owners {
        election.register_witness(*owner, &test_url()).unwrap();
    }
}

/// Asserts every cross-record invariant of the current state.
#[track_caller]
pub fn assert_state_valid(ctx: &TestContext) {
    let (_, acc) = check_state_invariants(&ctx.db);
    acc.assert_empty();
}
