// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! In-memory chain context for exercising system actors in tests.

use std::collections::BTreeMap;

use num_bigint::BigInt;

use crate::runtime::SnapshotId;
use crate::{Address, ChainContext, Hash, StateDB};

type Balances = BTreeMap<Address, BigInt>;
type Storage = BTreeMap<Address, BTreeMap<Hash, Hash>>;

/// In-memory world state with clone-based snapshots.
///
/// Slot iteration is in ascending key order, so a given state always walks
/// identically. Equality compares balances and storage only, which lets
/// tests assert that a failed call left no trace.
#[derive(Clone, Debug, Default)]
pub struct MemoryStateDb {
    balances: Balances,
    storage: Storage,
    snapshots: Vec<(Balances, Storage)>,
}

impl PartialEq for MemoryStateDb {
    fn eq(&self, other: &Self) -> bool {
        self.balances == other.balances && self.storage == other.storage
    }
}

impl Eq for MemoryStateDb {}

impl MemoryStateDb {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateDB for MemoryStateDb {
    fn get_balance(&self, addr: &Address) -> BigInt {
        self.balances.get(addr).cloned().unwrap_or_default()
    }

    fn add_balance(&mut self, addr: &Address, amount: &BigInt) {
        *self.balances.entry(*addr).or_default() += amount;
    }

    fn sub_balance(&mut self, addr: &Address, amount: &BigInt) {
        *self.balances.entry(*addr).or_default() -= amount;
    }

    fn get_slot(&self, contract: &Address, key: &Hash) -> Hash {
        self.storage
            .get(contract)
            .and_then(|slots| slots.get(key))
            .cloned()
            .unwrap_or_default()
    }

    fn set_slot(&mut self, contract: &Address, key: Hash, value: Hash) {
        let slots = self.storage.entry(*contract).or_default();
        if value.is_zero() {
            slots.remove(&key);
        } else {
            slots.insert(key, value);
        }
    }

    fn for_each_slot(&self, contract: &Address, visitor: &mut dyn FnMut(&Hash, &Hash) -> bool) {
        if let Some(slots) = self.storage.get(contract) {
            for (key, value) in slots {
                if !visitor(key, value) {
                    break;
                }
            }
        }
    }

    fn snapshot(&mut self) -> SnapshotId {
        self.snapshots.push((self.balances.clone(), self.storage.clone()));
        self.snapshots.len() - 1
    }

    fn revert(&mut self, snapshot: SnapshotId) {
        let (balances, storage) = self.snapshots[snapshot].clone();
        self.balances = balances;
        self.storage = storage;
        self.snapshots.truncate(snapshot);
    }
}

/// A transaction context with a settable origin and block time.
#[derive(Clone, Debug)]
pub struct TestContext {
    pub origin: Address,
    pub time: BigInt,
    pub db: MemoryStateDb,
}

impl TestContext {
    pub fn new(origin: Address, time: impl Into<BigInt>) -> Self {
        Self { origin, time: time.into(), db: MemoryStateDb::new() }
    }

    pub fn set_time(&mut self, time: impl Into<BigInt>) {
        self.time = time.into();
    }

    /// Advances the block time by `secs` seconds.
    pub fn advance_time(&mut self, secs: u64) {
        self.time += BigInt::from(secs);
    }
}

impl ChainContext for TestContext {
    type DB = MemoryStateDb;

    fn origin(&self) -> Address {
        self.origin
    }

    fn time(&self) -> BigInt {
        self.time.clone()
    }

    fn state(&mut self) -> &mut MemoryStateDb {
        &mut self.db
    }
}
