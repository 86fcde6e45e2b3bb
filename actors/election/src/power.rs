// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Stake to vote-power conversion.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};

use crate::policy::{
    BONUS_BASE_TIME, BONUS_ERA_LIMIT, BONUS_ERA_SECS, BONUS_GAP_RETAIN_DEN, BONUS_GAP_RETAIN_NUM,
    BONUS_SCALE,
};

/// Converts a stake (whole coins) into ballot weight at block time `now`.
///
/// Power is exactly the stake at the launch epoch and ramps toward 1.5x of
/// it: each 30-day era the remaining distance to the cap shrinks to 25/37
/// of itself in 10^7 fixed point, floored at every step. Every division
/// truncates toward zero, so identical inputs always reproduce the
/// consensus value. The result only changes at era boundaries.
pub fn vote_power(stake: &BigInt, now: &BigInt) -> BigInt {
    let gap = BigInt::from(bonus_gap(era_index(now)));
    let scale = BigInt::from(BONUS_SCALE);
    let bonus = stake * (&scale - gap) / (scale * 2u8);
    stake + bonus
}

/// Index of the bonus era containing `now`. Times before launch count as
/// era zero; eras past the saturation bound are clamped to it.
fn era_index(now: &BigInt) -> u64 {
    let delta = now - BigInt::from(BONUS_BASE_TIME);
    if delta.is_negative() {
        return 0;
    }
    let era = delta / BigInt::from(BONUS_ERA_SECS);
    era.to_u64().unwrap_or(BONUS_ERA_LIMIT).min(BONUS_ERA_LIMIT)
}

/// Remaining bonus gap after `era` eras, in `BONUS_SCALE` fixed point.
fn bonus_gap(era: u64) -> u64 {
    let mut gap = BONUS_SCALE;
    for _ in 0..era {
        gap = gap * BONUS_GAP_RETAIN_NUM / BONUS_GAP_RETAIN_DEN;
        if gap == 0 {
            break;
        }
    }
    gap
}

#[cfg(test)]
mod tests {
    use super::*;

    fn power(stake: u64, now: u64) -> BigInt {
        vote_power(&BigInt::from(stake), &BigInt::from(now))
    }

    #[test]
    fn launch_stake_converts_one_to_one() {
        assert_eq!(power(10_000_000, 1_514_736_000), BigInt::from(10_000_000u64));
    }

    #[test]
    fn era_six_published_bonus() {
        // Both block times fall in era 6, where the published bonus is 45.24%.
        assert_eq!(power(10_000_000, 1_532_080_414), BigInt::from(14_524_228u64));
        assert_eq!(power(10_000_000, 1_532_225_103), BigInt::from(14_524_228u64));
    }

    #[test]
    fn power_is_constant_within_an_era() {
        let start = 1_514_736_000 + 6 * 30 * 24 * 3600;
        assert_eq!(power(10_000_000, start), power(10_000_000, start + 29 * 24 * 3600));
    }

    #[test]
    fn curve_saturates_at_half_bonus() {
        // Far past launch the gap is zero and power is exactly 1.5x.
        assert_eq!(power(10_000_000, 1_514_736_000 + 50 * 30 * 24 * 3600), BigInt::from(15_000_000u64));
    }

    #[test]
    fn pre_launch_times_use_era_zero() {
        assert_eq!(power(123, 1_000_000), BigInt::from(123u64));
    }

    #[test]
    fn small_stakes_truncate_toward_zero() {
        assert_eq!(power(10, 1_532_080_414), BigInt::from(14u64));
        assert_eq!(power(0, 1_532_080_414), BigInt::from(0u64));
    }

    #[test]
    fn gap_sequence_is_locked() {
        // The first eras of the fixed-point decay, floored at every step.
        let expect = [10_000_000u64, 6_756_756, 4_565_375, 3_084_712, 2_084_264, 1_408_286, 951_544];
        for (era, want) in expect.iter().enumerate() {
            assert_eq!(bonus_gap(era as u64), *want, "era {era}");
        }
        assert_eq!(bonus_gap(40), 0);
        assert_eq!(bonus_gap(BONUS_ERA_LIMIT), 0);
    }
}
