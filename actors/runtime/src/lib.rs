// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Interfaces shared by the chain's built-in system actors.
//!
//! A system actor is a deterministic state machine invoked by the VM with a
//! transaction-bound [`ChainContext`]. All of its persistent state lives in
//! the world-state store behind [`StateDB`]; the host snapshots the store
//! before dispatch and reverts it whenever an actor returns an error.

pub mod runtime;
#[cfg(feature = "test_utils")]
pub mod test_utils;
pub mod util;

pub use runtime::{ChainContext, SnapshotId, StateDB};

/// A 20-byte account address.
pub type Address = ethereum_types::H160;

/// A 32-byte storage slot key or value.
pub type Hash = ethereum_types::H256;
