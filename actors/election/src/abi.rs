// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Method fingerprints and the word-oriented argument codec.
//!
//! Call input is a 4-byte selector (the leading bytes of the keccak-256 of
//! the canonical signature) followed by arguments packed into 32-byte
//! words. Value types sit in place; dynamic types (byte strings, address
//! arrays) leave a head word holding the byte offset of their length word,
//! with the payload following it.

use ethereum_types::{H160, U256};
use num_bigint::{BigInt, Sign};

use crate::error::ElectionError;

pub const SELECTOR_LENGTH: usize = 4;
const WORD: usize = 32;

/// First four bytes of the keccak-256 of a canonical method signature.
pub fn selector(signature: &str) -> [u8; SELECTOR_LENGTH] {
    let hash = keccak_hash::keccak(signature.as_bytes());
    let mut out = [0u8; SELECTOR_LENGTH];
    out.copy_from_slice(&hash.as_bytes()[..SELECTOR_LENGTH]);
    out
}

fn word(data: &[u8], index: usize) -> Result<&[u8], ElectionError> {
    data.get(index * WORD..(index + 1) * WORD).ok_or(ElectionError::InvalidArgument)
}

fn word_at(data: &[u8], offset: usize) -> Result<&[u8], ElectionError> {
    data.get(offset..offset + WORD).ok_or(ElectionError::InvalidArgument)
}

fn to_usize(word: &[u8]) -> Result<usize, ElectionError> {
    let value = U256::from_big_endian(word);
    if value.bits() > 32 {
        return Err(ElectionError::InvalidArgument);
    }
    Ok(value.low_u64() as usize)
}

/// Decodes the uint256 at argument word `index`.
pub fn decode_uint(data: &[u8], index: usize) -> Result<BigInt, ElectionError> {
    Ok(BigInt::from_bytes_be(Sign::Plus, word(data, index)?))
}

/// Decodes the address at argument word `index` (low 20 bytes of the word).
pub fn decode_address(data: &[u8], index: usize) -> Result<H160, ElectionError> {
    Ok(H160::from_slice(&word(data, index)?[12..]))
}

/// Decodes the dynamic address array whose head sits at word `index`.
pub fn decode_address_array(data: &[u8], index: usize) -> Result<Vec<H160>, ElectionError> {
    let offset = to_usize(word(data, index)?)?;
    let len = to_usize(word_at(data, offset)?)?;
    let mut out = Vec::with_capacity(len.min(64));
    for i in 0..len {
        let element = word_at(data, offset + WORD * (i + 1))?;
        out.push(H160::from_slice(&element[12..]));
    }
    Ok(out)
}

/// Decodes the dynamic byte string whose head sits at word `index`.
pub fn decode_bytes(data: &[u8], index: usize) -> Result<Vec<u8>, ElectionError> {
    let offset = to_usize(word(data, index)?)?;
    let len = to_usize(word_at(data, offset)?)?;
    let payload = data
        .get(offset + WORD..offset + WORD + len)
        .ok_or(ElectionError::InvalidArgument)?;
    Ok(payload.to_vec())
}

/// An encodable argument value.
#[derive(Clone, Debug)]
pub enum Token {
    Uint(BigInt),
    Address(H160),
    Addresses(Vec<H160>),
    Bytes(Vec<u8>),
}

/// Encodes a full call: selector of `signature`, then the argument words.
pub fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut out = selector(signature).to_vec();
    out.extend_from_slice(&encode_args(args));
    out
}

fn encode_args(args: &[Token]) -> Vec<u8> {
    let mut head = Vec::with_capacity(args.len() * WORD);
    let mut tail = Vec::new();
    let head_len = args.len() * WORD;

    for arg in args {
        match arg {
            Token::Uint(value) => head.extend_from_slice(&uint_word(value)),
            Token::Address(addr) => head.extend_from_slice(&address_word(addr)),
            Token::Addresses(list) => {
                head.extend_from_slice(&uint_word(&BigInt::from(head_len + tail.len())));
                tail.extend_from_slice(&uint_word(&BigInt::from(list.len())));
                for addr in list {
                    tail.extend_from_slice(&address_word(addr));
                }
            }
            Token::Bytes(data) => {
                head.extend_from_slice(&uint_word(&BigInt::from(head_len + tail.len())));
                tail.extend_from_slice(&uint_word(&BigInt::from(data.len())));
                for chunk in data.chunks(WORD) {
                    let mut padded = [0u8; WORD];
                    padded[..chunk.len()].copy_from_slice(chunk);
                    tail.extend_from_slice(&padded);
                }
            }
        }
    }
    head.extend_from_slice(&tail);
    head
}

fn uint_word(value: &BigInt) -> [u8; WORD] {
    let (_, bytes) = value.to_bytes_be();
    let mut out = [0u8; WORD];
    if bytes.len() >= WORD {
        out.copy_from_slice(&bytes[bytes.len() - WORD..]);
    } else {
        out[WORD - bytes.len()..].copy_from_slice(&bytes);
    }
    out
}

fn address_word(addr: &H160) -> [u8; WORD] {
    let mut out = [0u8; WORD];
    out[12..].copy_from_slice(addr.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> H160 {
        H160::from_low_u64_be(n as u64)
    }

    #[test]
    fn stake_selector_matches_the_published_fingerprint() {
        // Known keccak-256 fingerprint, pinning the whole selector scheme.
        assert_eq!(selector("stake(uint256)"), [0xa6, 0x94, 0xfc, 0x3a]);
    }

    #[test]
    fn uint_round_trips() {
        let encoded = encode_args(&[Token::Uint(BigInt::from(100))]);
        assert_eq!(encoded.len(), 32);
        assert_eq!(decode_uint(&encoded, 0).unwrap(), BigInt::from(100));
    }

    #[test]
    fn address_array_layout_matches_the_wire_format() {
        let encoded = encode_args(&[Token::Addresses(vec![addr(10)])]);
        // head offset 0x20, then length 1, then the padded address.
        assert_eq!(encoded[31], 0x20);
        assert_eq!(encoded[63], 1);
        assert_eq!(decode_address_array(&encoded, 0).unwrap(), vec![addr(10)]);
    }

    #[test]
    fn bytes_round_trip_with_padding() {
        let url = b"enode://peer@[::]:30303".to_vec();
        let encoded = encode_args(&[Token::Bytes(url.clone())]);
        assert_eq!(encoded.len() % 32, 0);
        assert_eq!(decode_bytes(&encoded, 0).unwrap(), url);
    }

    #[test]
    fn truncated_input_is_rejected() {
        assert_eq!(decode_uint(&[0u8; 16], 0), Err(ElectionError::InvalidArgument));
        let mut encoded = encode_args(&[Token::Addresses(vec![addr(1), addr(2)])]);
        encoded.truncate(encoded.len() - 1);
        assert_eq!(decode_address_array(&encoded, 0), Err(ElectionError::InvalidArgument));
    }

    #[test]
    fn absurd_offsets_are_rejected() {
        let mut encoded = encode_args(&[Token::Bytes(vec![1, 2, 3])]);
        encoded[0..32].copy_from_slice(&[0xff; 32]);
        assert_eq!(decode_bytes(&encoded, 0), Err(ElectionError::InvalidArgument));
    }
}
