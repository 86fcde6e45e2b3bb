// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Whole-state invariant checks for tests and conformance tooling.

use std::collections::{BTreeMap, BTreeSet};

use ethereum_types::H160;
use num_bigint::BigInt;
use num_traits::Signed;

use runtime::util::MessageAccumulator;
use runtime::StateDB;

use crate::policy::VOTE_LIMIT;
use crate::power::vote_power;
use crate::state;

#[derive(Debug, Default)]
pub struct StateSummary {
    pub voter_count: usize,
    pub candidate_count: usize,
    pub proxy_count: usize,
}

/// Checks every cross-record invariant of the election state.
///
/// Tally conservation: a candidate's `vote_count` must equal the sum of
/// `last_vote_count + proxy_vote_count` over the voters listing it.
/// Delegated weight counts whenever it is present, including for a voter
/// whose proxy role has since been stopped. Received delegations sum one
/// hop only: a proxy's `proxy_vote_count` is the sum of its delegators'
/// `last_vote_count`.
pub fn check_state_invariants<DB: StateDB>(db: &DB) -> (StateSummary, MessageAccumulator) {
    let acc = MessageAccumulator::default();
    let voters = state::all_voters(db);
    let candidates = state::all_candidates(db);

    let mut expected_tally: BTreeMap<H160, BigInt> = BTreeMap::new();
    let mut expected_received: BTreeMap<H160, BigInt> = BTreeMap::new();

    for voter in &voters {
        let acc = acc.with_prefix(format!("voter {:x}: ", voter.owner));

        acc.require(!voter.last_vote_count.is_negative(), "negative recorded ballot weight");
        acc.require(!voter.proxy_vote_count.is_negative(), "negative received delegations");
        acc.require(
            voter.vote_candidates.len() <= VOTE_LIMIT,
            format!("ballot lists {} witnesses, over the limit", voter.vote_candidates.len()),
        );
        let distinct: BTreeSet<_> = voter.vote_candidates.iter().collect();
        acc.require(distinct.len() == voter.vote_candidates.len(), "duplicate ballot entries");

        if voter.has_proxy() {
            acc.require(
                !voter.is_proxy && voter.vote_candidates.is_empty(),
                "delegating voter may neither be a proxy nor hold a ballot",
            );
            *expected_received.entry(voter.proxy).or_default() += &voter.last_vote_count;
        }

        if voter.last_vote_count.is_positive() {
            acc.require(voter.time_stamp.is_positive(), "recorded weight without a timestamp");
            match state::get_stake(db, &voter.owner) {
                Some(stake) => {
                    acc.require(
                        stake.time_stamp.is_positive(),
                        "recorded weight without a stake timestamp",
                    );
                    // With the stake unchanged since the ballot, the recorded
                    // weight must be reproducible from it.
                    if stake.stake_count.is_positive() && stake.time_stamp <= voter.time_stamp {
                        let expect = vote_power(&stake.stake_count, &voter.time_stamp);
                        acc.require(
                            voter.last_vote_count == expect,
                            format!(
                                "recorded weight {} but stake {} at {} converts to {}",
                                voter.last_vote_count,
                                stake.stake_count,
                                voter.time_stamp,
                                expect
                            ),
                        );
                    }
                }
                None => acc.add("recorded weight without a stake record"),
            }
        }

        for candidate in &voter.vote_candidates {
            *expected_tally.entry(*candidate).or_default() +=
                &voter.last_vote_count + &voter.proxy_vote_count;
        }
    }

    for voter in &voters {
        let expect = expected_received.remove(&voter.owner).unwrap_or_default();
        acc.require(
            voter.proxy_vote_count == expect,
            format!(
                "voter {:x} holds {} received delegations but delegators supply {}",
                voter.owner, voter.proxy_vote_count, expect
            ),
        );
    }
    for (proxy, expect) in &expected_received {
        acc.require(
            !expect.is_positive(),
            format!("delegations point at {proxy:x} which has no voter record"),
        );
    }

    for candidate in &candidates {
        let expect = expected_tally.remove(&candidate.owner).unwrap_or_default();
        acc.require(
            candidate.vote_count == expect,
            format!(
                "candidate {:x} tally {} but ballots supply {}",
                candidate.owner, candidate.vote_count, expect
            ),
        );
        acc.require(
            !candidate.total_bounty.is_negative()
                && candidate.extracted_bounty <= candidate.total_bounty,
            format!("candidate {:x} has inconsistent bounty counters", candidate.owner),
        );
    }
    for candidate in expected_tally.keys() {
        acc.add(format!("ballots name {candidate:x} which has no candidate record"));
    }

    acc.require(!state::rest_bounty(db).is_negative(), "negative rest bounty pool");

    let summary = StateSummary {
        voter_count: voters.len(),
        candidate_count: candidates.len(),
        proxy_count: voters.iter().filter(|v| v.is_proxy).count(),
    };
    (summary, acc)
}

/// Four-bit status of an address in the voting lattice: bit 3 direct
/// ballot, bit 2 proxy role, bit 1 delegation set, bit 0 delegated weight
/// received. Unknown addresses read as zero.
///
/// A standing ballot always lists at least one witness (an all-filtered
/// ballot is rejected and cancellation zeroes the recorded weight), so the
/// ballot bit reads off the candidate list alone.
pub fn address_status<DB: StateDB>(db: &DB, addr: &H160) -> u8 {
    let Some(voter) = state::get_voter(db, addr) else {
        return 0;
    };
    let mut status = 0u8;
    if !voter.vote_candidates.is_empty() {
        status |= 1 << 3;
    }
    if voter.is_proxy {
        status |= 1 << 2;
    }
    if voter.has_proxy() {
        status |= 1 << 1;
    }
    if voter.proxy_vote_count.is_positive() {
        status |= 1;
    }
    status
}
