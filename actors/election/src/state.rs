// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Election records and their typed store facade.
//!
//! All reads and writes go through here so callers never see the slot
//! layout. Getters return `None` when the owner slot is zero; records are
//! never erased, only zeroed or deactivated.

use ethereum_types::H160;
use num_bigint::BigInt;
use runtime::StateDB;

use crate::policy::{BOUNTY_PREFIX, CANDIDATE_PREFIX, STAKE_PREFIX, VOTER_PREFIX};
use crate::slots::{owner_of_key, prefix_of_key, record_key, slot_to_int, SlotReader, SlotWriter};

/// A voter's standing ballot state, keyed by owner.
///
/// Only one level of delegation exists: a voter with `proxy` set can
/// neither be a proxy nor hold a ballot, so `proxy_vote_count` received
/// from delegators never cascades further.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Voter {
    pub owner: H160,
    pub is_proxy: bool,
    /// Delegate this voter appointed; zero when voting directly.
    pub proxy: H160,
    /// Stake snapshot taken by the last vote or delegation.
    pub last_stake_count: BigInt,
    /// Ballot weight produced by that snapshot at `time_stamp`.
    pub last_vote_count: BigInt,
    /// Block time of the last vote or delegation.
    pub time_stamp: BigInt,
    /// Voted witnesses, in ballot order; empty while delegating.
    pub vote_candidates: Vec<H160>,
    /// Delegated weight currently flowing through this voter.
    pub proxy_vote_count: BigInt,
}

impl Voter {
    pub fn new(owner: H160) -> Self {
        Voter { owner, ..Default::default() }
    }

    pub fn has_proxy(&self) -> bool {
        !self.proxy.is_zero()
    }
}

/// A witness candidate, keyed by owner. Unregistering deactivates the
/// record but keeps its tally and bounty counters; re-registering inherits
/// them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Candidate {
    pub owner: H160,
    pub active: bool,
    /// Node URL the witness publishes for peers, at most 255 bytes.
    pub url: Vec<u8>,
    pub vote_count: BigInt,
    pub total_bounty: BigInt,
    pub extracted_bounty: BigInt,
    pub last_extract_time: BigInt,
}

impl Candidate {
    pub fn new(owner: H160, url: Vec<u8>) -> Self {
        Candidate { owner, active: true, url, ..Default::default() }
    }

    /// Effective weight for ranking: an inactive witness sorts by the
    /// negation of its tally.
    pub fn votes(&self) -> BigInt {
        if self.active {
            self.vote_count.clone()
        } else {
            -self.vote_count.clone()
        }
    }
}

/// Witness records ordered for selection: descending effective votes,
/// owner address as the deterministic tie-break.
#[derive(Clone, Debug, Default)]
pub struct CandidateList(pub Vec<Candidate>);

impl CandidateList {
    pub fn sort(&mut self) {
        self.0
            .sort_by(|a, b| b.votes().cmp(&a.votes()).then_with(|| a.owner.cmp(&b.owner)));
    }
}

/// Stake record, keyed by owner. `stake_count` is whole coins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stake {
    pub owner: H160,
    pub stake_count: BigInt,
    /// Block time of the most recent stake.
    pub time_stamp: BigInt,
    /// Cooldown reference for unstaking.
    pub last_stake_time_stamp: BigInt,
}

impl Stake {
    pub fn new(owner: H160) -> Self {
        Stake { owner, ..Default::default() }
    }
}

pub fn get_voter<DB: StateDB>(db: &DB, owner: &H160) -> Option<Voter> {
    let mut r = SlotReader::new(db, VOTER_PREFIX, *owner);
    let stored = r.read_address();
    if stored.is_zero() {
        return None;
    }
    Some(Voter {
        owner: stored,
        is_proxy: r.read_bool(),
        proxy: r.read_address(),
        last_stake_count: r.read_int(),
        last_vote_count: r.read_int(),
        time_stamp: r.read_int(),
        vote_candidates: r.read_addresses(),
        proxy_vote_count: r.read_int(),
    })
}

pub fn set_voter<DB: StateDB>(db: &mut DB, voter: &Voter) {
    let mut w = SlotWriter::new(db, VOTER_PREFIX, voter.owner);
    w.write_address(&voter.owner);
    w.write_bool(voter.is_proxy);
    w.write_address(&voter.proxy);
    w.write_int(&voter.last_stake_count);
    w.write_int(&voter.last_vote_count);
    w.write_int(&voter.time_stamp);
    w.write_addresses(&voter.vote_candidates);
    w.write_int(&voter.proxy_vote_count);
}

pub fn get_candidate<DB: StateDB>(db: &DB, owner: &H160) -> Option<Candidate> {
    let mut r = SlotReader::new(db, CANDIDATE_PREFIX, *owner);
    let stored = r.read_address();
    if stored.is_zero() {
        return None;
    }
    Some(Candidate {
        owner: stored,
        active: r.read_bool(),
        url: r.read_bytes(),
        vote_count: r.read_int(),
        total_bounty: r.read_int(),
        extracted_bounty: r.read_int(),
        last_extract_time: r.read_int(),
    })
}

pub fn set_candidate<DB: StateDB>(db: &mut DB, candidate: &Candidate) {
    let mut w = SlotWriter::new(db, CANDIDATE_PREFIX, candidate.owner);
    w.write_address(&candidate.owner);
    w.write_bool(candidate.active);
    w.write_bytes(&candidate.url);
    w.write_int(&candidate.vote_count);
    w.write_int(&candidate.total_bounty);
    w.write_int(&candidate.extracted_bounty);
    w.write_int(&candidate.last_extract_time);
}

pub fn get_stake<DB: StateDB>(db: &DB, owner: &H160) -> Option<Stake> {
    let mut r = SlotReader::new(db, STAKE_PREFIX, *owner);
    let stored = r.read_address();
    if stored.is_zero() {
        return None;
    }
    Some(Stake {
        owner: stored,
        stake_count: r.read_int(),
        time_stamp: r.read_int(),
        last_stake_time_stamp: r.read_int(),
    })
}

pub fn set_stake<DB: StateDB>(db: &mut DB, stake: &Stake) {
    let mut w = SlotWriter::new(db, STAKE_PREFIX, stake.owner);
    w.write_address(&stake.owner);
    w.write_int(&stake.stake_count);
    w.write_int(&stake.time_stamp);
    w.write_int(&stake.last_stake_time_stamp);
}

/// The undistributed bounty pool, a single global slot.
pub fn rest_bounty<DB: StateDB>(db: &DB) -> BigInt {
    let key = record_key(BOUNTY_PREFIX, &H160::zero(), 0);
    slot_to_int(&db.get_slot(&crate::policy::ELECTION_CONTRACT_ADDRESS, &key))
}

pub fn set_rest_bounty<DB: StateDB>(db: &mut DB, amount: &BigInt) {
    let key = record_key(BOUNTY_PREFIX, &H160::zero(), 0);
    db.set_slot(&crate::policy::ELECTION_CONTRACT_ADDRESS, key, crate::slots::int_to_slot(amount));
}

/// Owners of every record stored under `prefix`, in key order.
fn record_owners<DB: StateDB>(db: &DB, prefix: u8) -> Vec<H160> {
    let mut owners = Vec::new();
    db.for_each_slot(&crate::policy::ELECTION_CONTRACT_ADDRESS, &mut |key, _| {
        if prefix_of_key(key) == prefix && key.as_bytes()[31] == 0 {
            owners.push(owner_of_key(key));
        }
        true
    });
    owners
}

/// Every voter record in the store, in address order.
pub fn all_voters<DB: StateDB>(db: &DB) -> Vec<Voter> {
    record_owners(db, VOTER_PREFIX)
        .iter()
        .filter_map(|owner| get_voter(db, owner))
        .collect()
}

/// Every candidate record in the store, active or not, in address order.
pub fn all_candidates<DB: StateDB>(db: &DB) -> Vec<Candidate> {
    record_owners(db, CANDIDATE_PREFIX)
        .iter()
        .filter_map(|owner| get_candidate(db, owner))
        .collect()
}

/// Voters currently registered as proxies.
pub fn all_proxies<DB: StateDB>(db: &DB) -> Vec<Voter> {
    all_voters(db).into_iter().filter(|v| v.is_proxy).collect()
}
