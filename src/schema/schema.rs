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

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use amplify::{ByteArray, Bytes32};
use baid64::{Baid64ParseError, DisplayBaid64, FromBaid64Str};

use super::{Occurrences, Predicate};
use crate::contract::CommitHasher;

/// Tag used for computing schema ids.
const SCHEMA_ID_TAG: &str = "urn:lnp-bp:rgb:schema#2024-02-03";

/// Human-readable name of a state field or evaluation binding.
#[derive(Wrapper, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, From)]
#[wrapper(Deref)]
#[display(inner)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(transparent)
)]
pub struct FieldName(#[from] String);

impl From<&str> for FieldName {
    fn from(name: &str) -> Self { FieldName(name.to_owned()) }
}

impl FieldName {
    pub fn as_str(&self) -> &str { &self.0 }
}

/// Schema-defined name reported when the predicate of an operation type
/// evaluates to false.
#[derive(Wrapper, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, From)]
#[wrapper(Deref)]
#[display(inner)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(transparent)
)]
pub struct FailureName(#[from] String);

impl From<&str> for FailureName {
    fn from(name: &str) -> Self { FailureName(name.to_owned()) }
}

impl FailureName {
    pub fn as_str(&self) -> &str { &self.0 }
}

macro_rules! state_type {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Wrapper, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, From, Default)]
        #[wrapper(FromStr, LowerHex, UpperHex)]
        #[display(inner)]
        #[cfg_attr(
            feature = "serde",
            derive(Serialize, Deserialize),
            serde(transparent)
        )]
        pub struct $name(#[from] u16);

        impl $name {
            pub const fn with(ty: u16) -> Self { Self(ty) }

            pub const fn to_inner(self) -> u16 { self.0 }
        }
    };
}

state_type!(GlobalStateType, "Numeric identifier of a global state type within a schema.");
state_type!(OwnedStateType, "Numeric identifier of an owned state type within a schema.");
state_type!(TransitionType, "Numeric identifier of a state transition type within a schema.");

/// Value kinds storable in global state fields.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display)]
#[display(lowercase)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum FieldKind {
    Num,
    Text,
    Bytes,
}

/// Value kinds storable in owned state assignments.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display)]
#[display(lowercase)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum StateKind {
    Rights,
    Amount,
    Allocation,
}

/// Declaration of a global state type: its binding name, value kind and
/// whether the contract accumulates multiple values of it over its history.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct GlobalStateSchema {
    pub name: FieldName,
    pub kind: FieldKind,
    /// When false the latest declared value replaces the previous one
    /// (nomination data); when true values accumulate (issue records).
    pub multiple: bool,
}

impl GlobalStateSchema {
    pub fn once(name: impl Into<FieldName>, kind: FieldKind) -> Self {
        GlobalStateSchema {
            name: name.into(),
            kind,
            multiple: false,
        }
    }

    pub fn many(name: impl Into<FieldName>, kind: FieldKind) -> Self {
        GlobalStateSchema {
            name: name.into(),
            kind,
            multiple: true,
        }
    }

    fn commit(&self, hasher: &mut CommitHasher) {
        hasher.commit_str(self.name.as_str());
        hasher.commit_u8(self.kind as u8);
        hasher.commit_u8(self.multiple as u8);
    }
}

/// Declaration of an owned state type.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct OwnedStateSchema {
    pub name: FieldName,
    pub kind: StateKind,
}

impl OwnedStateSchema {
    pub fn with(name: impl Into<FieldName>, kind: StateKind) -> Self {
        OwnedStateSchema {
            name: name.into(),
            kind,
        }
    }

    fn commit(&self, hasher: &mut CommitHasher) {
        hasher.commit_str(self.name.as_str());
        hasher.commit_u8(self.kind as u8);
    }
}

/// Structural and semantic requirements a schema puts on a single operation
/// type (genesis or one of the transition types).
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct OperationSchema {
    pub name: FieldName,
    /// Multiplicity of global state declarations per global type.
    pub globals: BTreeMap<GlobalStateType, Occurrences>,
    /// Multiplicity of inputs per owned type. Inputs close (spend) outputs of
    /// previous operations.
    pub closes: BTreeMap<OwnedStateType, Occurrences>,
    /// Multiplicity of produced assignments per owned type.
    pub assignments: BTreeMap<OwnedStateType, Occurrences>,
    /// Arithmetic condition evaluated after structural checks pass.
    pub predicate: Predicate,
    /// Name reported when the predicate does not hold.
    pub error: FailureName,
}

impl OperationSchema {
    pub fn new(name: impl Into<FieldName>, error: impl Into<FailureName>) -> Self {
        OperationSchema {
            name: name.into(),
            globals: bmap! {},
            closes: bmap! {},
            assignments: bmap! {},
            predicate: Predicate::Any,
            error: error.into(),
        }
    }

    pub fn global(mut self, ty: GlobalStateType, occurrences: Occurrences) -> Self {
        self.globals.insert(ty, occurrences);
        self
    }

    pub fn closes(mut self, ty: OwnedStateType, occurrences: Occurrences) -> Self {
        self.closes.insert(ty, occurrences);
        self
    }

    pub fn assigns(mut self, ty: OwnedStateType, occurrences: Occurrences) -> Self {
        self.assignments.insert(ty, occurrences);
        self
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = predicate;
        self
    }

    fn commit(&self, hasher: &mut CommitHasher) {
        hasher.commit_str(self.name.as_str());
        commit_occurrences(hasher, self.globals.iter().map(|(ty, occ)| (ty.to_inner(), occ)));
        commit_occurrences(hasher, self.closes.iter().map(|(ty, occ)| (ty.to_inner(), occ)));
        commit_occurrences(
            hasher,
            self.assignments.iter().map(|(ty, occ)| (ty.to_inner(), occ)),
        );
        self.predicate.commit(hasher);
        hasher.commit_str(self.error.as_str());
    }
}

fn commit_occurrences<'a>(
    hasher: &mut CommitHasher,
    iter: impl ExactSizeIterator<Item = (u16, &'a Occurrences)>,
) {
    hasher.commit_u64(iter.len() as u64);
    for (ty, occurrences) in iter {
        hasher.commit_u16(ty);
        hasher.commit_u16(occurrences.min_value());
        hasher.commit_u16(occurrences.max_value());
    }
}

/// Derivation rule for a published aggregate of the contract state.
///
/// Aggregates are tri-state: they produce a definite value only when the
/// known part of the contract history is sufficient to prove it.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum Aggregator {
    /// Sum of all known values of a numeric global state type. Always
    /// produces a definite value over the known history.
    SumV(GlobalStateType),

    /// Sum of all known values of a numeric global state type, definite only
    /// when no unspent output of the guard owned type remains: an unspent
    /// right could still append further values.
    Total(GlobalStateType, OwnedStateType),

    /// Saturating difference of two aggregates; definite only when both
    /// operands are.
    Diff(Box<Aggregator>, Box<Aggregator>),
}

impl Aggregator {
    pub fn diff(minuend: Aggregator, subtrahend: Aggregator) -> Self {
        Aggregator::Diff(Box::new(minuend), Box::new(subtrahend))
    }

    fn commit(&self, hasher: &mut CommitHasher) {
        match self {
            Aggregator::SumV(global) => {
                hasher.commit_u8(0);
                hasher.commit_u16(global.to_inner());
            }
            Aggregator::Total(global, guard) => {
                hasher.commit_u8(1);
                hasher.commit_u16(global.to_inner());
                hasher.commit_u16(guard.to_inner());
            }
            Aggregator::Diff(minuend, subtrahend) => {
                hasher.commit_u8(2);
                minuend.commit(hasher);
                subtrahend.commit(hasher);
            }
        }
    }
}

/// Unique schema identifier committing to all schema content.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref, BorrowSlice, Hex, Index, RangeOps)]
pub struct SchemaId(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

impl SchemaId {
    pub const fn from_array(id: [u8; 32]) -> Self { Self(Bytes32::from_array(id)) }
}

impl From<CommitHasher> for SchemaId {
    fn from(hasher: CommitHasher) -> Self { hasher.finish().into() }
}

impl DisplayBaid64 for SchemaId {
    const HRI: &'static str = "rgb:sch";
    const CHUNKING: bool = true;
    const PREFIX: bool = true;
    const EMBED_CHECKSUM: bool = false;
    const MNEMONIC: bool = true;
    fn to_baid64_payload(&self) -> [u8; 32] { self.to_byte_array() }
}
impl FromBaid64Str for SchemaId {}
impl FromStr for SchemaId {
    type Err = Baid64ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::from_baid64_str(s) }
}
impl Display for SchemaId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { self.fmt_baid64(f) }
}

impl_serde_baid64!(SchemaId);

/// Complete contract schema: the codified set of validation rules an asset
/// contract of a given interface shape must satisfy.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Schema {
    pub name: FieldName,
    pub global_types: BTreeMap<GlobalStateType, GlobalStateSchema>,
    pub owned_types: BTreeMap<OwnedStateType, OwnedStateSchema>,
    pub genesis: OperationSchema,
    pub transitions: BTreeMap<TransitionType, OperationSchema>,
    /// Hard cap on issuance exposed to predicates as `schema.maxSupply`.
    pub max_supply: Option<u64>,
    /// Published aggregates by their query name.
    pub aggregators: BTreeMap<FieldName, Aggregator>,
}

impl Schema {
    /// Content-based schema identifier.
    pub fn schema_id(&self) -> SchemaId {
        let mut hasher = CommitHasher::tagged(SCHEMA_ID_TAG);
        hasher.commit_str(self.name.as_str());
        hasher.commit_u64(self.global_types.len() as u64);
        for (ty, schema) in &self.global_types {
            hasher.commit_u16(ty.to_inner());
            schema.commit(&mut hasher);
        }
        hasher.commit_u64(self.owned_types.len() as u64);
        for (ty, schema) in &self.owned_types {
            hasher.commit_u16(ty.to_inner());
            schema.commit(&mut hasher);
        }
        self.genesis.commit(&mut hasher);
        hasher.commit_u64(self.transitions.len() as u64);
        for (ty, schema) in &self.transitions {
            hasher.commit_u16(ty.to_inner());
            schema.commit(&mut hasher);
        }
        match self.max_supply {
            None => hasher.commit_u8(0),
            Some(max) => {
                hasher.commit_u8(1);
                hasher.commit_u64(max);
            }
        }
        hasher.commit_u64(self.aggregators.len() as u64);
        for (name, aggregator) in &self.aggregators {
            hasher.commit_str(name.as_str());
            aggregator.commit(&mut hasher);
        }
        hasher.into()
    }

    pub fn transition(&self, ty: TransitionType) -> Option<&OperationSchema> {
        self.transitions.get(&ty)
    }

    pub fn global_type_named(&self, name: &FieldName) -> Option<GlobalStateType> {
        self.global_types
            .iter()
            .find(|(_, schema)| &schema.name == name)
            .map(|(ty, _)| *ty)
    }

    /// Checks internal consistency of the schema declarations. An empty
    /// report means the schema is well-formed.
    pub fn verify(&self) -> Vec<SchemaInconsistency> {
        let mut report = vec![];

        if !self.genesis.closes.is_empty() {
            report.push(SchemaInconsistency::GenesisClosesState);
        }

        let ops = [(&self.genesis, None)].into_iter().chain(
            self.transitions
                .iter()
                .map(|(ty, schema)| (schema, Some(*ty))),
        );
        for (op, ty) in ops {
            for global in op.globals.keys() {
                if !self.global_types.contains_key(global) {
                    report.push(SchemaInconsistency::UnknownGlobalType(ty, *global));
                }
            }
            for owned in op.closes.keys().chain(op.assignments.keys()) {
                if !self.owned_types.contains_key(owned) {
                    report.push(SchemaInconsistency::UnknownOwnedType(ty, *owned));
                }
            }
        }

        for (name, aggregator) in &self.aggregators {
            self.verify_aggregator(name, aggregator, &mut report);
        }

        report
    }

    fn verify_aggregator(
        &self,
        name: &FieldName,
        aggregator: &Aggregator,
        report: &mut Vec<SchemaInconsistency>,
    ) {
        match aggregator {
            Aggregator::SumV(global) => {
                if !self.global_types.contains_key(global) {
                    report.push(SchemaInconsistency::AggregatorGlobal(name.clone(), *global));
                }
            }
            Aggregator::Total(global, guard) => {
                if !self.global_types.contains_key(global) {
                    report.push(SchemaInconsistency::AggregatorGlobal(name.clone(), *global));
                }
                if !self.owned_types.contains_key(guard) {
                    report.push(SchemaInconsistency::AggregatorGuard(name.clone(), *guard));
                }
            }
            Aggregator::Diff(minuend, subtrahend) => {
                self.verify_aggregator(name, minuend, report);
                self.verify_aggregator(name, subtrahend, report);
            }
        }
    }
}

/// Internal inconsistency of schema declarations detected during schema
/// registration.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum SchemaInconsistency {
    /// genesis operation schema requires closing inputs, which a
    /// contract-creating operation can never have.
    GenesisClosesState,

    /// operation schema for {0:?} references global state type {1} absent
    /// from the schema declarations.
    UnknownGlobalType(Option<TransitionType>, GlobalStateType),

    /// operation schema for {0:?} references owned state type {1} absent from
    /// the schema declarations.
    UnknownOwnedType(Option<TransitionType>, OwnedStateType),

    /// aggregator '{0}' references global state type {1} absent from the
    /// schema declarations.
    AggregatorGlobal(FieldName, GlobalStateType),

    /// aggregator '{0}' references owned state type {1} absent from the
    /// schema declarations.
    AggregatorGuard(FieldName, OwnedStateType),
}
