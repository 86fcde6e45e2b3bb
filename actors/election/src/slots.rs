// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Slot-level layout of the contract's records.
//!
//! Every record serializes into 32-byte slots under the election contract
//! address. A slot key is `prefix | owner | zero padding | slot index`;
//! indices run over the record's fields in declaration order, with a
//! variable-length field spending one slot on its length and one per
//! 32-byte chunk or address entry, later fields continuing from there.
//! A record whose owner slot reads zero is absent.

use ethereum_types::{H160, H256};
use num_bigint::{BigInt, Sign};
use runtime::StateDB;

use crate::policy::ELECTION_CONTRACT_ADDRESS;

/// Bytes of the key occupied by the record prefix.
pub const PREFIX_LENGTH: usize = 1;

/// Builds the key of slot `index` for the record of `owner` under `prefix`.
pub fn record_key(prefix: u8, owner: &H160, index: u8) -> H256 {
    let mut key = [0u8; 32];
    key[0] = prefix;
    key[PREFIX_LENGTH..PREFIX_LENGTH + 20].copy_from_slice(owner.as_bytes());
    key[31] = index;
    H256(key)
}

/// Extracts the owner address out of a record key.
pub fn owner_of_key(key: &H256) -> H160 {
    H160::from_slice(&key.as_bytes()[PREFIX_LENGTH..PREFIX_LENGTH + 20])
}

/// Record prefix of a key.
pub fn prefix_of_key(key: &H256) -> u8 {
    key.as_bytes()[0]
}

/// Packs a non-negative integer big-endian into a slot, keeping the low 32
/// bytes of wider values like the host chain's hash conversion does.
pub fn int_to_slot(value: &BigInt) -> H256 {
    let (_, bytes) = value.to_bytes_be();
    let mut out = [0u8; 32];
    if bytes.len() >= 32 {
        out.copy_from_slice(&bytes[bytes.len() - 32..]);
    } else {
        out[32 - bytes.len()..].copy_from_slice(&bytes);
    }
    H256(out)
}

pub fn slot_to_int(slot: &H256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, slot.as_bytes())
}

/// Packs an address into the rightmost 20 bytes of a slot.
pub fn address_to_slot(addr: &H160) -> H256 {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(addr.as_bytes());
    H256(out)
}

pub fn slot_to_address(slot: &H256) -> H160 {
    H160::from_slice(&slot.as_bytes()[12..])
}

pub fn bool_to_slot(value: bool) -> H256 {
    let mut out = [0u8; 32];
    if value {
        out[31] = 1;
    }
    H256(out)
}

pub fn slot_to_bool(slot: &H256) -> bool {
    !slot.is_zero()
}

/// Writes a record's slots in declaration order.
pub struct SlotWriter<'a, DB: StateDB> {
    db: &'a mut DB,
    prefix: u8,
    owner: H160,
    next: u8,
}

impl<'a, DB: StateDB> SlotWriter<'a, DB> {
    pub fn new(db: &'a mut DB, prefix: u8, owner: H160) -> Self {
        Self { db, prefix, owner, next: 0 }
    }

    fn push(&mut self, value: H256) {
        let key = record_key(self.prefix, &self.owner, self.next);
        self.db.set_slot(&ELECTION_CONTRACT_ADDRESS, key, value);
        self.next += 1;
    }

    pub fn write_int(&mut self, value: &BigInt) {
        self.push(int_to_slot(value));
    }

    pub fn write_bool(&mut self, value: bool) {
        self.push(bool_to_slot(value));
    }

    pub fn write_address(&mut self, addr: &H160) {
        self.push(address_to_slot(addr));
    }

    /// Length slot followed by one slot per address.
    pub fn write_addresses(&mut self, list: &[H160]) {
        self.write_int(&BigInt::from(list.len()));
        for addr in list {
            self.write_address(addr);
        }
    }

    /// Length slot followed by 32-byte chunks, the last right-zero-padded.
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.write_int(&BigInt::from(data.len()));
        for chunk in data.chunks(32) {
            let mut slot = [0u8; 32];
            slot[..chunk.len()].copy_from_slice(chunk);
            self.push(H256(slot));
        }
    }
}

/// Reads a record's slots in declaration order.
pub struct SlotReader<'a, DB: StateDB> {
    db: &'a DB,
    prefix: u8,
    owner: H160,
    next: u8,
}

impl<'a, DB: StateDB> SlotReader<'a, DB> {
    pub fn new(db: &'a DB, prefix: u8, owner: H160) -> Self {
        Self { db, prefix, owner, next: 0 }
    }

    fn pull(&mut self) -> H256 {
        let key = record_key(self.prefix, &self.owner, self.next);
        self.next += 1;
        self.db.get_slot(&ELECTION_CONTRACT_ADDRESS, &key)
    }

    fn read_len(&mut self) -> usize {
        // Lengths never exceed the u8 key space; clamping keeps the decoder
        // total on corrupt slots.
        let len = self.pull();
        len.to_low_u64_be().min(u8::MAX as u64) as usize
    }

    pub fn read_int(&mut self) -> BigInt {
        slot_to_int(&self.pull())
    }

    pub fn read_bool(&mut self) -> bool {
        slot_to_bool(&self.pull())
    }

    pub fn read_address(&mut self) -> H160 {
        slot_to_address(&self.pull())
    }

    pub fn read_addresses(&mut self) -> Vec<H160> {
        let len = self.read_len();
        (0..len).map(|_| self.read_address()).collect()
    }

    pub fn read_bytes(&mut self) -> Vec<u8> {
        let len = self.read_len();
        let mut data = Vec::with_capacity(len);
        for _ in 0..len.div_ceil(32) {
            data.extend_from_slice(self.pull().as_bytes());
        }
        data.truncate(len);
        data
    }
}
