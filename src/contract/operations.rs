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

use amplify::ByteArray;

use super::{AuthToken, CommitHasher, ContractId, FieldValue, OpId, OwnedState};
use crate::schema::{GlobalStateType, OwnedStateType, SchemaId, TransitionType};

/// Tag used for computing operation ids.
const OPERATION_ID_TAG: &str = "urn:lnp-bp:rgb:operation#2024-02-03";

/// Discriminates genesis operations, which create a contract under a schema,
/// from state transitions, which extend an existing contract.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum OpKind {
    /// Contract-creating operation; its id doubles as the contract id.
    #[display("genesis({schema})")]
    Genesis { schema: SchemaId },

    /// Operation extending the state of an already existing contract.
    #[display("transition({contract}, {ty})")]
    Transition {
        contract: ContractId,
        ty: TransitionType,
    },
}

/// Reference to an output of a previous operation ("operation output").
///
/// Identifies a single assignment produced by the operation `op` at the
/// zero-based position `no` within its assignment list.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display)]
#[display("{op}:{no}")]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Opout {
    pub op: OpId,
    pub no: u16,
}

impl Opout {
    pub const fn new(op: OpId, no: u16) -> Self { Opout { op, no } }
}

/// Single piece of owned state produced by an operation and assigned to a
/// holder identified by an authorization token.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display)]
#[display("{state} -> {auth}")]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Assignment {
    pub ty: OwnedStateType,
    pub state: OwnedState,
    pub auth: AuthToken,
}

impl Assignment {
    pub const fn with(ty: OwnedStateType, state: OwnedState, auth: AuthToken) -> Self {
        Assignment { ty, state, auth }
    }
}

/// A fully decoded contract operation: the unit of validation.
///
/// Operations arrive pre-parsed; deserialization from consensus encoding is
/// performed by the external containers layer. The operation id commits to
/// every field, so two operations with equal content are the same operation.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Operation {
    pub kind: OpKind,
    pub globals: Vec<(GlobalStateType, FieldValue)>,
    pub inputs: Vec<Opout>,
    pub assignments: Vec<Assignment>,
}

impl Operation {
    /// Starts building a genesis operation under the given schema.
    pub fn genesis(schema: SchemaId) -> Self {
        Operation {
            kind: OpKind::Genesis { schema },
            globals: vec![],
            inputs: vec![],
            assignments: vec![],
        }
    }

    /// Starts building a state transition for the given contract.
    pub fn transition(contract: ContractId, ty: TransitionType) -> Self {
        Operation {
            kind: OpKind::Transition { contract, ty },
            globals: vec![],
            inputs: vec![],
            assignments: vec![],
        }
    }

    pub fn add_global(mut self, ty: GlobalStateType, value: impl Into<FieldValue>) -> Self {
        self.globals.push((ty, value.into()));
        self
    }

    pub fn add_input(mut self, prev: Opout) -> Self {
        self.inputs.push(prev);
        self
    }

    pub fn add_assignment(
        mut self,
        ty: OwnedStateType,
        state: impl Into<OwnedState>,
        auth: AuthToken,
    ) -> Self {
        self.assignments.push(Assignment::with(ty, state.into(), auth));
        self
    }

    pub fn is_genesis(&self) -> bool { matches!(self.kind, OpKind::Genesis { .. }) }

    pub fn transition_type(&self) -> Option<TransitionType> {
        match self.kind {
            OpKind::Genesis { .. } => None,
            OpKind::Transition { ty, .. } => Some(ty),
        }
    }

    /// Content-based operation identifier.
    pub fn id(&self) -> OpId {
        let mut hasher = CommitHasher::tagged(OPERATION_ID_TAG);
        match self.kind {
            OpKind::Genesis { schema } => {
                hasher.commit_u8(0);
                hasher.commit_array(schema.to_byte_array());
            }
            OpKind::Transition { contract, ty } => {
                hasher.commit_u8(1);
                hasher.commit_array(contract.to_byte_array());
                hasher.commit_u16(ty.to_inner());
            }
        }
        hasher.commit_u64(self.globals.len() as u64);
        for (ty, value) in &self.globals {
            hasher.commit_u16(ty.to_inner());
            value.commit(&mut hasher);
        }
        hasher.commit_u64(self.inputs.len() as u64);
        for input in &self.inputs {
            hasher.commit_array(input.op.to_byte_array());
            hasher.commit_u16(input.no);
        }
        hasher.commit_u64(self.assignments.len() as u64);
        for assignment in &self.assignments {
            hasher.commit_u16(assignment.ty.to_inner());
            assignment.state.commit(&mut hasher);
            hasher.commit_array(assignment.auth.to_byte_array());
        }
        hasher.into()
    }

    /// Opouts produced by this operation, in assignment order.
    pub fn opouts(&self) -> impl Iterator<Item = Opout> + '_ {
        let opid = self.id();
        (0..self.assignments.len() as u16).map(move |no| Opout::new(opid, no))
    }

    /// Global values of a given type, in declaration order.
    pub fn globals_of(&self, ty: GlobalStateType) -> impl Iterator<Item = &FieldValue> {
        self.globals
            .iter()
            .filter(move |(t, _)| *t == ty)
            .map(|(_, value)| value)
    }

    /// Assignments of a given owned state type, in declaration order.
    pub fn assignments_of(&self, ty: OwnedStateType) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter().filter(move |a| a.ty == ty)
    }
}
