// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use num_bigint::BigInt;

use crate::{Address, Hash};

/// Identifier of a world-state snapshot, handed back to [`StateDB::revert`].
pub type SnapshotId = usize;

/// World-state access granted to a system actor.
///
/// Balances and storage slots are the only shared mutable state. Snapshots
/// are taken by the host around each invocation; an actor never calls
/// `snapshot`/`revert` on its own behalf.
pub trait StateDB {
    /// Balance of `addr` in wei.
    fn get_balance(&self, addr: &Address) -> BigInt;

    fn add_balance(&mut self, addr: &Address, amount: &BigInt);

    /// Debits `amount` from `addr`. Callers check the balance first; the
    /// store does not.
    fn sub_balance(&mut self, addr: &Address, amount: &BigInt);

    /// Reads the 32-byte slot under `contract`. Absent slots read as zero.
    fn get_slot(&self, contract: &Address, key: &Hash) -> Hash;

    /// Writes a slot. Writing the zero value clears the slot.
    fn set_slot(&mut self, contract: &Address, key: Hash, value: Hash);

    /// Visits every non-zero slot of `contract` in ascending key order.
    /// The visitor returns `false` to stop early.
    fn for_each_slot(&self, contract: &Address, visitor: &mut dyn FnMut(&Hash, &Hash) -> bool);

    fn snapshot(&mut self) -> SnapshotId;

    /// Restores the state captured by `snapshot`, discarding later ones.
    fn revert(&mut self, snapshot: SnapshotId);
}

/// Execution context bound to one transaction.
pub trait ChainContext {
    type DB: StateDB;

    /// The transaction sender.
    fn origin(&self) -> Address;

    /// Current block time, unix seconds.
    fn time(&self) -> BigInt;

    fn state(&mut self) -> &mut Self::DB;
}
