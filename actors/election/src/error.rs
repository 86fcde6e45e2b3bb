// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Typed failures of the election contract.
//!
//! The message strings are part of the contract's observable interface:
//! clients parse them, so every kind renders a fixed, case-sensitive text.
//! Any error returned from a call makes the host revert to its pre-call
//! snapshot.

use ethereum_types::H160;
use num_bigint::BigInt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElectionError {
    #[error("method doesn't exist")]
    MethodUnknown,

    #[error("invalid argument encoding")]
    InvalidArgument,

    #[error("your balance is not enough to stake")]
    InsufficientBalance,

    #[error("stake stakeCount less than 0")]
    InvalidStakeAmount,

    #[error("you must stake before vote")]
    StakeMissing,

    #[error("cannot unstake in 24 hours")]
    StakeCooldown,

    #[error("it's less than 24h after your last vote or setProxy, lastTime: {last}, now: {now}")]
    Cooldown24h { last: BigInt, now: BigInt },

    #[error("registerWitness witness already exists")]
    CandidateExists,

    #[error("witness does not exist or is not active")]
    CandidateMissing,

    #[error("invalid witness url")]
    InvalidUrl,

    #[error("none of the voted candidates is valid")]
    NoValid,

    #[error("you voted too many candidates: the limit is {limit}, you voted {voted}")]
    TooMany { limit: usize, voted: usize },

    #[error("cannot proxy to self")]
    ProxySelf,

    #[error("account registered as a proxy is not allowed to use a proxy")]
    SelfIsProxy,

    #[error("{0:x} is not a proxy")]
    TargetNotProxy(H160),

    #[error("startProxy proxy is already started")]
    ProxyAlready,

    #[error("stopProxy proxy does not exist.")]
    ProxyMissing,

    #[error("stopProxy address is not proxy")]
    NotProxy,

    #[error("not set proxy")]
    NotSetProxy,

    #[error("account that uses a proxy is not allowed to become a proxy")]
    CannotBecomeProxy,

    #[error("must cancel proxy first, proxy: {0:x}")]
    CancelProxyFirst(H160),

    #[error("the voter {0:x} doesn't exist")]
    NoVoter(H160),

    #[error("rest bounty is not enough to pay")]
    InsufficientRestBounty,

    #[error("cannot extract bounty in 24 hours")]
    ExtractCooldown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_fixed() {
        let addr = H160::from_low_u64_be(10);
        assert_eq!(
            ElectionError::TooMany { limit: 30, voted: 31 }.to_string(),
            "you voted too many candidates: the limit is 30, you voted 31"
        );
        assert_eq!(
            ElectionError::Cooldown24h { last: BigInt::from(1_531_328_500u64), now: BigInt::from(1_531_328_510u64) }
                .to_string(),
            "it's less than 24h after your last vote or setProxy, lastTime: 1531328500, now: 1531328510"
        );
        assert_eq!(
            ElectionError::TargetNotProxy(addr).to_string(),
            "000000000000000000000000000000000000000a is not a proxy"
        );
        assert_eq!(
            ElectionError::NoVoter(H160::from_low_u64_be(0x6f)).to_string(),
            "the voter 000000000000000000000000000000000000006f doesn't exist"
        );
        assert_eq!(ElectionError::StakeCooldown.to_string(), "cannot unstake in 24 hours");
        assert_eq!(ElectionError::MethodUnknown.to_string(), "method doesn't exist");
    }
}
