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

use super::CommitHasher;
use crate::schema::{FieldKind, StateKind};

/// 64-bit atomic amount of fungible owned state.
///
/// Arithmetic is fixed-width and checked: no operation performed by the
/// engine may silently wrap.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default, Display, From)]
#[wrapper(Deref)]
#[display(inner)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(transparent)
)]
pub struct Amount(#[from] u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn with(value: u64) -> Self { Amount(value) }

    pub const fn value(self) -> u64 { self.0 }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }

    /// Checked sum over an amount iterator; `None` on u64 overflow.
    pub fn checked_sum(iter: impl IntoIterator<Item = Amount>) -> Option<Amount> {
        iter.into_iter()
            .try_fold(Amount::ZERO, |acc, val| acc.checked_add(val))
    }
}

/// Index of a non-fungible token within its contract.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default, Display, From)]
#[wrapper(Deref)]
#[display(inner)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(transparent)
)]
pub struct TokenIndex(#[from] u32);

impl TokenIndex {
    pub const fn with(index: u32) -> Self { TokenIndex(index) }
}

/// Integer number of fraction units of a non-fungible token.
///
/// The meaning of a unit is contract-specific: the genesis operation declares
/// the whole (the number of units a complete token consists of, 1 for an
/// indivisible token) and ownership fractions are expressed against it.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default, Display, From)]
#[wrapper(Deref)]
#[display(inner)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(transparent)
)]
pub struct OwnedFraction(#[from] u64);

impl OwnedFraction {
    pub const fn with(units: u64) -> Self { OwnedFraction(units) }

    pub const fn units(self) -> u64 { self.0 }
}

/// Ownership of a number of fraction units of a specific token.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display)]
#[display("{fraction}@{token}")]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Allocation {
    token: TokenIndex,
    fraction: OwnedFraction,
}

impl Allocation {
    pub const fn with(token: TokenIndex, fraction: OwnedFraction) -> Self {
        Allocation { token, fraction }
    }

    pub const fn token_index(self) -> TokenIndex { self.token }

    pub const fn fraction(self) -> OwnedFraction { self.fraction }
}

/// Opaque token authorizing the future spending of a right: an abstraction
/// over single-use-seal definitions, which are resolved by the external
/// anchoring layer.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref, BorrowSlice, Hex, Index, RangeOps)]
pub struct AuthToken(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

impl AuthToken {
    pub const fn from_array(data: [u8; 32]) -> Self { Self(Bytes32::from_array(data)) }
}

impl DisplayBaid64 for AuthToken {
    const HRI: &'static str = "rgb:at";
    const CHUNKING: bool = true;
    const PREFIX: bool = false;
    const EMBED_CHECKSUM: bool = false;
    const MNEMONIC: bool = false;
    fn to_baid64_payload(&self) -> [u8; 32] { self.to_byte_array() }
}
impl FromBaid64Str for AuthToken {}
impl FromStr for AuthToken {
    type Err = Baid64ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::from_baid64_str(s) }
}
impl Display for AuthToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { self.fmt_baid64(f) }
}

impl_serde_baid64!(AuthToken);

/// Value of a single right token (an instance of owned state).
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum OwnedState {
    /// Declarative right carrying no value (inflation right, renomination
    /// right etc).
    #[display("right")]
    Rights,

    /// Fungible balance.
    #[display(inner)]
    Amount(Amount),

    /// Fraction units of a non-fungible token.
    #[display(inner)]
    Allocation(Allocation),
}

impl OwnedState {
    pub fn kind(&self) -> StateKind {
        match self {
            OwnedState::Rights => StateKind::Rights,
            OwnedState::Amount(_) => StateKind::Amount,
            OwnedState::Allocation(_) => StateKind::Allocation,
        }
    }

    /// Numeric magnitude used by sum predicates: the amount for fungible
    /// state, the number of fraction units for allocations, zero for
    /// declarative rights.
    pub fn magnitude(&self) -> u64 {
        match self {
            OwnedState::Rights => 0,
            OwnedState::Amount(amount) => amount.value(),
            OwnedState::Allocation(allocation) => allocation.fraction().units(),
        }
    }

    pub fn allocation(&self) -> Option<Allocation> {
        match self {
            OwnedState::Allocation(allocation) => Some(*allocation),
            _ => None,
        }
    }

    pub(crate) fn commit(&self, hasher: &mut CommitHasher) {
        match self {
            OwnedState::Rights => hasher.commit_u8(0),
            OwnedState::Amount(amount) => {
                hasher.commit_u8(1);
                hasher.commit_u64(amount.value());
            }
            OwnedState::Allocation(allocation) => {
                hasher.commit_u8(2);
                hasher.commit_u32(*allocation.token_index());
                hasher.commit_u64(allocation.fraction().units());
            }
        }
    }
}

impl From<Amount> for OwnedState {
    fn from(amount: Amount) -> Self { OwnedState::Amount(amount) }
}

impl From<Allocation> for OwnedState {
    fn from(allocation: Allocation) -> Self { OwnedState::Allocation(allocation) }
}

/// Value of a global (public) state field.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum FieldValue {
    /// Numeric value (supplies, precisions, fraction wholes).
    Num(u64),

    /// UTF-8 text (ticker, asset name, contract terms).
    Text(String),

    /// Opaque bytes (media digests, attachment references); never
    /// interpreted by the engine beyond equality.
    Bytes(Vec<u8>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Num(_) => FieldKind::Num,
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Bytes(_) => FieldKind::Bytes,
        }
    }

    pub fn num(&self) -> Option<u64> {
        match self {
            FieldValue::Num(val) => Some(*val),
            _ => None,
        }
    }

    pub(crate) fn commit(&self, hasher: &mut CommitHasher) {
        match self {
            FieldValue::Num(val) => {
                hasher.commit_u8(0);
                hasher.commit_u64(*val);
            }
            FieldValue::Text(text) => {
                hasher.commit_u8(1);
                hasher.commit_str(text);
            }
            FieldValue::Bytes(data) => {
                hasher.commit_u8(2);
                hasher.commit_bytes(data);
            }
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Num(val) => Display::fmt(val, f),
            FieldValue::Text(text) => write!(f, "\"{text}\""),
            FieldValue::Bytes(data) => write!(f, "{} bytes", data.len()),
        }
    }
}

impl From<u64> for FieldValue {
    fn from(val: u64) -> Self { FieldValue::Num(val) }
}
impl From<&str> for FieldValue {
    fn from(text: &str) -> Self { FieldValue::Text(text.to_owned()) }
}
impl From<String> for FieldValue {
    fn from(text: String) -> Self { FieldValue::Text(text) }
}
impl From<Vec<u8>> for FieldValue {
    fn from(data: Vec<u8>) -> Self { FieldValue::Bytes(data) }
}
