// RGB Engine: deterministic validation of client-side-validated asset
// contracts.
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2019-2025 by
//     Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// Copyright (C) 2019-2025 LNP/BP Standards Association. All rights reserved.
// Copyright (C) 2019-2025 Dr Maxim Orlovsky. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use amplify::{ByteArray, Bytes32};
use baid64::{Baid64ParseError, DisplayBaid64, FromBaid64Str};
use sha2::{Digest, Sha256};

/// Incremental tagged hasher producing 32-byte content identifiers.
///
/// Identifies in-memory objects by their content; the byte-exact consensus
/// commitment procedure belongs to the external serialization layer and is
/// not defined here.
pub struct CommitHasher(Sha256);

impl CommitHasher {
    /// Initializes the hasher with a BIP-340-style tag prefix.
    pub fn tagged(tag: &'static str) -> Self {
        let tag_hash = Sha256::digest(tag.as_bytes());
        let mut engine = Sha256::new();
        engine.update(tag_hash);
        engine.update(tag_hash);
        Self(engine)
    }

    pub fn commit_u8(&mut self, val: u8) { self.0.update([val]); }

    pub fn commit_u16(&mut self, val: u16) { self.0.update(val.to_le_bytes()); }

    pub fn commit_u32(&mut self, val: u32) { self.0.update(val.to_le_bytes()); }

    pub fn commit_u64(&mut self, val: u64) { self.0.update(val.to_le_bytes()); }

    /// Length-prefixed byte string.
    pub fn commit_bytes(&mut self, data: &[u8]) {
        self.commit_u64(data.len() as u64);
        self.0.update(data);
    }

    pub fn commit_str(&mut self, s: &str) { self.commit_bytes(s.as_bytes()); }

    pub fn commit_array(&mut self, data: [u8; 32]) { self.0.update(data); }

    pub fn finish(self) -> Bytes32 {
        let hash: [u8; 32] = self.0.finalize().into();
        Bytes32::from_byte_array(hash)
    }
}

/// Unique operation identifier committing to all operation content.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref, BorrowSlice, Hex, Index, RangeOps)]
pub struct OpId(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

impl OpId {
    pub const fn from_array(id: [u8; 32]) -> Self { Self(Bytes32::from_array(id)) }
}

impl From<CommitHasher> for OpId {
    fn from(hasher: CommitHasher) -> Self { hasher.finish().into() }
}

impl DisplayBaid64 for OpId {
    const HRI: &'static str = "rgb:op";
    const CHUNKING: bool = true;
    const PREFIX: bool = false;
    const EMBED_CHECKSUM: bool = false;
    const MNEMONIC: bool = false;
    fn to_baid64_payload(&self) -> [u8; 32] { self.to_byte_array() }
}
impl FromBaid64Str for OpId {}
impl FromStr for OpId {
    type Err = Baid64ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::from_baid64_str(s) }
}
impl Display for OpId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { self.fmt_baid64(f) }
}

impl_serde_baid64!(OpId);

/// Unique contract identifier, derived from the id of the contract genesis
/// operation.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref, BorrowSlice, Hex, Index, RangeOps)]
pub struct ContractId(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

impl ContractId {
    pub const fn from_array(id: [u8; 32]) -> Self { Self(Bytes32::from_array(id)) }
}

impl From<OpId> for ContractId {
    fn from(opid: OpId) -> Self { Self(Bytes32::from_byte_array(opid.to_byte_array())) }
}

impl DisplayBaid64 for ContractId {
    const HRI: &'static str = "rgb";
    const CHUNKING: bool = true;
    const PREFIX: bool = true;
    const EMBED_CHECKSUM: bool = false;
    const MNEMONIC: bool = true;
    fn to_baid64_payload(&self) -> [u8; 32] { self.to_byte_array() }
}
impl FromBaid64Str for ContractId {}
impl FromStr for ContractId {
    type Err = Baid64ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::from_baid64_str(s) }
}
impl Display for ContractId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { self.fmt_baid64(f) }
}

impl_serde_baid64!(ContractId);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tagged_hashing_is_deterministic() {
        let mut h1 = CommitHasher::tagged("test:tag");
        h1.commit_u64(42);
        h1.commit_str("payload");
        let mut h2 = CommitHasher::tagged("test:tag");
        h2.commit_u64(42);
        h2.commit_str("payload");
        assert_eq!(h1.finish(), h2.finish());
    }

    #[test]
    fn tag_separates_domains() {
        let mut h1 = CommitHasher::tagged("domain:a");
        h1.commit_u64(42);
        let mut h2 = CommitHasher::tagged("domain:b");
        h2.commit_u64(42);
        assert_ne!(h1.finish(), h2.finish());
    }

    #[test]
    fn contract_id_roundtrip() {
        let id = ContractId::from_array([0xAD; 32]);
        let s = id.to_string();
        assert_eq!(ContractId::from_str(&s).unwrap(), id);
    }
}
