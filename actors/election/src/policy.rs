// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Consensus parameters of the election contract.

use ethereum_types::H160;

/// Address the election contract is installed at.
pub const ELECTION_CONTRACT_ADDRESS: H160 =
    H160([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x09]);

/// Key prefix of voter records.
pub const VOTER_PREFIX: u8 = 0x01;
/// Key prefix of witness candidate records.
pub const CANDIDATE_PREFIX: u8 = 0x02;
/// Key prefix of stake records.
pub const STAKE_PREFIX: u8 = 0x03;
/// Key prefix of the undistributed bounty pool.
pub const BOUNTY_PREFIX: u8 = 0x04;

/// A ballot may name at most this many witnesses.
pub const VOTE_LIMIT: usize = 30;

/// Seconds a voter must wait between votes or proxy changes, and between
/// staking and unstaking, and between bounty extractions.
pub const OP_COOLDOWN_SECS: u64 = 24 * 3600;

/// Wei per whole coin. Stake counts are kept in whole coins; balances move
/// in wei.
pub const WEI_PER_COIN: u128 = 1_000_000_000_000_000_000;

/// Witness node URLs are 1..=255 bytes of printable ASCII.
pub const MAX_URL_LENGTH: usize = 255;

/// Launch epoch of the stake bonus curve (unix seconds).
pub const BONUS_BASE_TIME: u64 = 1_514_736_000;

/// One era of the bonus curve: 30 days.
pub const BONUS_ERA_SECS: u64 = 30 * 24 * 3600;

/// Fixed-point scale of the bonus curve.
pub const BONUS_SCALE: u64 = 10_000_000;

/// Per-era retention of the remaining bonus gap: each era the gap shrinks
/// to 25/37 of itself, floored at `BONUS_SCALE` precision.
pub const BONUS_GAP_RETAIN_NUM: u64 = 25;
pub const BONUS_GAP_RETAIN_DEN: u64 = 37;

/// Eras after which the curve is treated as saturated. The floored gap
/// reaches zero around era 40 on its own; the clamp bounds the iteration.
pub const BONUS_ERA_LIMIT: u64 = 48;
