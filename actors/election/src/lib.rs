// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Witness-election system actor.
//!
//! The contract keeps four record families in the world state under its
//! own address: voters, witness candidates, stakes and the undistributed
//! bounty pool. Stakes convert into ballot weight through the bonus curve
//! in [`power`]; weight flows onto candidate tallies either directly or
//! through one level of proxy delegation. Candidate tallies therefore
//! always equal the sum of `last_vote_count + proxy_vote_count` over the
//! voters listing them.
//!
//! The VM invokes [`Election::run`] with the raw call input; everything
//! else here is reachable for the consensus layer (bounty grants, witness
//! ranking) and for tests.

use std::collections::HashMap;

use ethereum_types::H160;
use lazy_static::lazy_static;
use num_bigint::BigInt;
use num_traits::{One, Zero};

use runtime::{ChainContext, StateDB};

pub mod abi;
mod error;
pub mod policy;
pub mod power;
mod slots;
pub mod state;
pub mod testing;

pub use error::ElectionError;
pub use state::{Candidate, CandidateList, Stake, Voter};

use policy::{MAX_URL_LENGTH, OP_COOLDOWN_SECS, VOTE_LIMIT, WEI_PER_COIN};
use power::vote_power;

/// Election contract methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Stake,
    UnStake,
    RegisterWitness,
    UnregisterWitness,
    VoteWitnesses,
    CancelVote,
    StartProxy,
    StopProxy,
    SetProxy,
    CancelProxy,
    ExtractOwnBounty,
}

impl Method {
    pub const ALL: [Method; 11] = [
        Method::Stake,
        Method::UnStake,
        Method::RegisterWitness,
        Method::UnregisterWitness,
        Method::VoteWitnesses,
        Method::CancelVote,
        Method::StartProxy,
        Method::StopProxy,
        Method::SetProxy,
        Method::CancelProxy,
        Method::ExtractOwnBounty,
    ];

    /// Canonical signature hashed into the method's selector.
    pub fn signature(self) -> &'static str {
        match self {
            Method::Stake => "stake(uint256)",
            Method::UnStake => "unStake()",
            Method::RegisterWitness => "registerWitness(bytes)",
            Method::UnregisterWitness => "unregisterWitness()",
            Method::VoteWitnesses => "voteWitnesses(address[])",
            Method::CancelVote => "cancelVote()",
            Method::StartProxy => "startProxy()",
            Method::StopProxy => "stopProxy()",
            Method::SetProxy => "setProxy(address)",
            Method::CancelProxy => "cancelProxy()",
            Method::ExtractOwnBounty => "extractOwnBounty()",
        }
    }

    pub fn selector(self) -> [u8; abi::SELECTOR_LENGTH] {
        abi::selector(self.signature())
    }

    pub fn from_selector(selector: [u8; abi::SELECTOR_LENGTH]) -> Option<Method> {
        SELECTORS.get(&selector).copied()
    }
}

lazy_static! {
    static ref SELECTORS: HashMap<[u8; abi::SELECTOR_LENGTH], Method> =
        Method::ALL.iter().map(|m| (m.selector(), *m)).collect();
}

/// The election system contract.
pub struct Election;

impl Election {
    /// Entry point from the VM: decodes the selector and arguments and runs
    /// the operation as the transaction origin. Success returns empty
    /// bytes; on error the host reverts to its pre-call snapshot.
    pub fn run<C: ChainContext>(ctx: &mut C, input: &[u8]) -> Result<Vec<u8>, ElectionError> {
        if input.len() < abi::SELECTOR_LENGTH {
            return Err(ElectionError::MethodUnknown);
        }
        let mut selector = [0u8; abi::SELECTOR_LENGTH];
        selector.copy_from_slice(&input[..abi::SELECTOR_LENGTH]);
        let method = Method::from_selector(selector).ok_or(ElectionError::MethodUnknown)?;
        let args = &input[abi::SELECTOR_LENGTH..];

        let caller = ctx.origin();
        log::debug!("election: {:?} from {:x}", method, caller);

        let mut election = ElectionContext::new(ctx);
        match method {
            Method::Stake => {
                let amount = abi::decode_uint(args, 0)?;
                election.stake(caller, &amount)
            }
            Method::UnStake => election.unstake(caller),
            Method::RegisterWitness => {
                let url = abi::decode_bytes(args, 0)?;
                election.register_witness(caller, &url)
            }
            Method::UnregisterWitness => election.unregister_witness(caller),
            Method::VoteWitnesses => {
                let candidates = abi::decode_address_array(args, 0)?;
                election.vote_witnesses(caller, &candidates)
            }
            Method::CancelVote => election.cancel_vote(caller),
            Method::StartProxy => election.start_proxy(caller),
            Method::StopProxy => election.stop_proxy(caller),
            Method::SetProxy => {
                let proxy = abi::decode_address(args, 0)?;
                election.set_proxy(caller, proxy)
            }
            Method::CancelProxy => election.cancel_proxy(caller),
            Method::ExtractOwnBounty => election.extract_own_bounty(caller),
        }?;
        Ok(Vec::new())
    }
}

/// Operation surface of the election contract, bound to one invocation.
pub struct ElectionContext<'a, C: ChainContext> {
    ctx: &'a mut C,
}

impl<'a, C: ChainContext> ElectionContext<'a, C> {
    pub fn new(ctx: &'a mut C) -> Self {
        Self { ctx }
    }

    fn now(&self) -> BigInt {
        self.ctx.time()
    }

    fn db(&mut self) -> &mut C::DB {
        self.ctx.state()
    }

    /// Locks `amount` whole coins of `addr`'s balance as stake.
    pub fn stake(&mut self, addr: H160, amount: &BigInt) -> Result<(), ElectionError> {
        if amount < &BigInt::one() {
            return Err(ElectionError::InvalidStakeAmount);
        }
        let now = self.now();
        let wei = amount * BigInt::from(WEI_PER_COIN);
        let db = self.db();
        if db.get_balance(&addr) < wei {
            return Err(ElectionError::InsufficientBalance);
        }
        db.sub_balance(&addr, &wei);

        let mut stake = state::get_stake(db, &addr).unwrap_or_else(|| Stake::new(addr));
        stake.stake_count += amount;
        // The stake timestamp moves on every stake so recorded ballot
        // weights are only ever compared against the stake they were cast
        // with.
        stake.time_stamp = now.clone();
        stake.last_stake_time_stamp = now;
        state::set_stake(db, &stake);
        Ok(())
    }

    /// Releases the entire stake back to `addr`'s balance.
    pub fn unstake(&mut self, addr: H160) -> Result<(), ElectionError> {
        let now = self.now();
        let db = self.db();
        let mut stake = state::get_stake(db, &addr).ok_or(ElectionError::StakeMissing)?;
        if stake.stake_count.is_zero() {
            return Err(ElectionError::StakeMissing);
        }
        if now - &stake.last_stake_time_stamp < cooldown() {
            return Err(ElectionError::StakeCooldown);
        }
        db.add_balance(&addr, &(&stake.stake_count * BigInt::from(WEI_PER_COIN)));
        stake.stake_count = BigInt::zero();
        state::set_stake(db, &stake);
        Ok(())
    }

    /// Registers `addr` as a witness candidate publishing `url`. A
    /// previously unregistered candidate is re-activated with its tally and
    /// bounty counters intact.
    pub fn register_witness(&mut self, addr: H160, url: &[u8]) -> Result<(), ElectionError> {
        if !is_valid_node_url(url) {
            return Err(ElectionError::InvalidUrl);
        }
        let db = self.db();
        match state::get_candidate(db, &addr) {
            Some(candidate) if candidate.active => Err(ElectionError::CandidateExists),
            Some(mut candidate) => {
                candidate.active = true;
                candidate.url = url.to_vec();
                state::set_candidate(db, &candidate);
                Ok(())
            }
            None => {
                state::set_candidate(db, &Candidate::new(addr, url.to_vec()));
                Ok(())
            }
        }
    }

    /// Deactivates the witness. The record stays behind with its tally and
    /// bounty counters; standing votes for it keep accruing.
    pub fn unregister_witness(&mut self, addr: H160) -> Result<(), ElectionError> {
        let db = self.db();
        match state::get_candidate(db, &addr) {
            Some(mut candidate) if candidate.active => {
                candidate.active = false;
                state::set_candidate(db, &candidate);
                Ok(())
            }
            _ => Err(ElectionError::CandidateMissing),
        }
    }

    /// Pays the witness its not-yet-extracted bounty share.
    pub fn extract_own_bounty(&mut self, addr: H160) -> Result<(), ElectionError> {
        let now = self.now();
        let db = self.db();
        let mut candidate = state::get_candidate(db, &addr).ok_or(ElectionError::CandidateMissing)?;
        if !candidate.active {
            return Err(ElectionError::CandidateMissing);
        }
        if &now - &candidate.last_extract_time < cooldown() {
            return Err(ElectionError::ExtractCooldown);
        }
        let pending = &candidate.total_bounty - &candidate.extracted_bounty;
        db.add_balance(&addr, &pending);
        candidate.extracted_bounty = candidate.total_bounty.clone();
        candidate.last_extract_time = now;
        state::set_candidate(db, &candidate);
        Ok(())
    }

    /// Opens `addr` for delegation. Standing direct votes are kept.
    pub fn start_proxy(&mut self, addr: H160) -> Result<(), ElectionError> {
        let db = self.db();
        let mut voter = state::get_voter(db, &addr).unwrap_or_else(|| Voter::new(addr));
        if voter.is_proxy {
            return Err(ElectionError::ProxyAlready);
        }
        if voter.has_proxy() {
            return Err(ElectionError::CannotBecomeProxy);
        }
        voter.is_proxy = true;
        state::set_voter(db, &voter);
        Ok(())
    }

    /// Closes `addr` for new delegations. Delegations already received stay
    /// in force: their weight keeps flowing through `proxy_vote_count`
    /// until each delegator cancels or re-votes on its own.
    pub fn stop_proxy(&mut self, addr: H160) -> Result<(), ElectionError> {
        let db = self.db();
        let mut voter = state::get_voter(db, &addr).ok_or(ElectionError::ProxyMissing)?;
        if !voter.is_proxy {
            return Err(ElectionError::NotProxy);
        }
        voter.is_proxy = false;
        state::set_voter(db, &voter);
        Ok(())
    }

    /// Delegates `addr`'s ballot weight to `proxy`.
    pub fn set_proxy(&mut self, addr: H160, proxy: H160) -> Result<(), ElectionError> {
        if addr == proxy {
            return Err(ElectionError::ProxySelf);
        }
        let now = self.now();
        let db = self.db();
        let mut voter = state::get_voter(db, &addr).unwrap_or_else(|| Voter::new(addr));
        if voter.is_proxy {
            return Err(ElectionError::SelfIsProxy);
        }
        let stake_count =
            state::get_stake(db, &addr).map(|s| s.stake_count).unwrap_or_default();
        if stake_count.is_zero() {
            return Err(ElectionError::StakeMissing);
        }
        check_cooldown(&voter, &now)?;
        match state::get_voter(db, &proxy) {
            Some(target) if target.is_proxy => {}
            _ => return Err(ElectionError::TargetNotProxy(proxy)),
        }

        remove_standing_influence(db, &voter);

        let new_power = vote_power(&stake_count, &now);
        voter.proxy = proxy;
        voter.last_stake_count = stake_count;
        voter.last_vote_count = new_power.clone();
        voter.time_stamp = now;
        voter.vote_candidates.clear();
        state::set_voter(db, &voter);

        // Reload the target: the removal above may have touched it when the
        // voter re-delegates to the same proxy.
        let mut target =
            state::get_voter(db, &proxy).ok_or(ElectionError::TargetNotProxy(proxy))?;
        target.proxy_vote_count += &new_power;
        state::set_voter(db, &target);
        add_to_tallies(db, &target.vote_candidates, &new_power);
        Ok(())
    }

    /// Takes `addr`'s weight back from its proxy.
    pub fn cancel_proxy(&mut self, addr: H160) -> Result<(), ElectionError> {
        let db = self.db();
        let mut voter = state::get_voter(db, &addr).ok_or(ElectionError::NotSetProxy)?;
        if !voter.has_proxy() {
            return Err(ElectionError::NotSetProxy);
        }
        remove_standing_influence(db, &voter);
        voter.proxy = H160::zero();
        voter.last_vote_count = BigInt::zero();
        state::set_voter(db, &voter);
        Ok(())
    }

    /// Casts a direct ballot for up to 30 witnesses, replacing whatever the
    /// voter's weight was doing before.
    pub fn vote_witnesses(&mut self, addr: H160, candidates: &[H160]) -> Result<(), ElectionError> {
        if candidates.len() > VOTE_LIMIT {
            return Err(ElectionError::TooMany { limit: VOTE_LIMIT, voted: candidates.len() });
        }
        let now = self.now();
        let db = self.db();
        let stake_count =
            state::get_stake(db, &addr).map(|s| s.stake_count).unwrap_or_default();
        if stake_count.is_zero() {
            return Err(ElectionError::StakeMissing);
        }
        let mut voter = state::get_voter(db, &addr).unwrap_or_else(|| Voter::new(addr));
        check_cooldown(&voter, &now)?;

        // Keep the first occurrence of each registered, active witness.
        let mut valid: Vec<H160> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if valid.contains(candidate) {
                continue;
            }
            match state::get_candidate(db, candidate) {
                Some(c) if c.active => valid.push(*candidate),
                _ => {}
            }
        }
        if valid.is_empty() {
            return Err(ElectionError::NoValid);
        }

        remove_standing_influence(db, &voter);

        let new_power = vote_power(&stake_count, &now);
        voter.proxy = H160::zero();
        voter.last_stake_count = stake_count;
        voter.last_vote_count = new_power.clone();
        voter.time_stamp = now;
        voter.vote_candidates = valid.clone();
        state::set_voter(db, &voter);

        // Delegated weight the voter carries rides along with its own.
        let weight = new_power + &voter.proxy_vote_count;
        add_to_tallies(db, &valid, &weight);
        Ok(())
    }

    /// Withdraws the voter's direct ballot. Received delegations stay.
    pub fn cancel_vote(&mut self, addr: H160) -> Result<(), ElectionError> {
        let db = self.db();
        let mut voter = state::get_voter(db, &addr).ok_or(ElectionError::NoVoter(addr))?;
        if voter.has_proxy() {
            return Err(ElectionError::CancelProxyFirst(voter.proxy));
        }
        let weight = &voter.last_vote_count + &voter.proxy_vote_count;
        add_to_tallies(db, &voter.vote_candidates.clone(), &-weight);
        voter.vote_candidates.clear();
        voter.last_vote_count = BigInt::zero();
        state::set_voter(db, &voter);
        Ok(())
    }
}

/// Deducts `amount` from the undistributed bounty pool, returning the new
/// pool value. Called from the block-reward path, not dispatched.
pub fn grant_bounty<DB: StateDB>(db: &mut DB, amount: &BigInt) -> Result<BigInt, ElectionError> {
    let pool = state::rest_bounty(db);
    if &pool < amount {
        return Err(ElectionError::InsufficientRestBounty);
    }
    let rest = pool - amount;
    state::set_rest_bounty(db, &rest);
    Ok(rest)
}

fn cooldown() -> BigInt {
    BigInt::from(OP_COOLDOWN_SECS)
}

/// A vote or delegation needs 24 hours of distance from the previous one;
/// a fresh record (zero timestamp) has nothing to wait for.
fn check_cooldown(voter: &Voter, now: &BigInt) -> Result<(), ElectionError> {
    if voter.time_stamp.is_zero() {
        return Ok(());
    }
    if now - &voter.time_stamp < cooldown() {
        return Err(ElectionError::Cooldown24h {
            last: voter.time_stamp.clone(),
            now: now.clone(),
        });
    }
    Ok(())
}

fn is_valid_node_url(url: &[u8]) -> bool {
    !url.is_empty()
        && url.len() <= MAX_URL_LENGTH
        && url.iter().all(|b| (0x20..=0x7e).contains(b))
}

/// Backs the voter's current weight out of whatever carries it: its own
/// candidates' tallies (direct ballot plus any delegated weight riding on
/// it), or, when delegating, the proxy's received count and the proxy's
/// candidates' tallies. The voter's own `proxy_vote_count` never cascades
/// past one hop.
fn remove_standing_influence<DB: StateDB>(db: &mut DB, voter: &Voter) {
    if voter.has_proxy() {
        if let Some(mut proxy) = state::get_voter(db, &voter.proxy) {
            proxy.proxy_vote_count -= &voter.last_vote_count;
            state::set_voter(db, &proxy);
            add_to_tallies(db, &proxy.vote_candidates, &-voter.last_vote_count.clone());
        }
    } else if !voter.vote_candidates.is_empty() {
        let weight = &voter.last_vote_count + &voter.proxy_vote_count;
        add_to_tallies(db, &voter.vote_candidates, &-weight);
    }
}

/// Applies `delta` to the tally of every listed candidate.
fn add_to_tallies<DB: StateDB>(db: &mut DB, candidates: &[H160], delta: &BigInt) {
    for owner in candidates {
        match state::get_candidate(db, owner) {
            Some(mut candidate) => {
                candidate.vote_count += delta;
                state::set_candidate(db, &candidate);
            }
            // Ballots only ever name stored candidates and records are never
            // erased, so this is unreachable in a consistent store.
            None => log::warn!("election: tally update for unknown witness {:x}", owner),
        }
    }
}
