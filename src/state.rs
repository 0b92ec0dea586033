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

//! Evolving state of a single contract, mutated only through validated
//! deltas.

use std::collections::BTreeMap;

use crate::contract::{AuthToken, FieldValue, OpId, Opout, OwnedState};
use crate::schema::{GlobalStateType, OwnedStateType};

/// A single output of some operation together with its spend status.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct OwnedCell {
    pub ty: OwnedStateType,
    pub state: OwnedState,
    pub auth: AuthToken,
    /// Id of the operation which has closed this output, if any. At most one
    /// operation may ever close an output.
    pub spent_by: Option<OpId>,
}

impl OwnedCell {
    pub fn is_spent(&self) -> bool { self.spent_by.is_some() }
}

/// Change to a single global state type carried by a delta.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum GlobalChange {
    /// Accumulating global state: new values extend the history.
    Append(GlobalStateType, Vec<FieldValue>),
    /// Replaceable global state: the new value supersedes all previous ones.
    Replace(GlobalStateType, FieldValue),
}

/// Complete effect of one validated operation on the contract state.
///
/// A delta is built while the operation is checked and applied only after all
/// checks pass; application itself re-verifies spendability so that the state
/// can never record two spenders for one output.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct StateDelta {
    /// Outputs closed by the operation, with the closing operation id.
    pub consumes: Vec<(Opout, OpId)>,
    /// Outputs created by the operation.
    pub produces: Vec<(Opout, OwnedCell)>,
    /// Global state changes, in operation declaration order.
    pub globals: Vec<GlobalChange>,
}

/// Violations detected while applying a state delta.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum StateError {
    /// delta consumes output {0} which is not present in the contract state.
    UnknownCell(Opout),

    /// delta consumes output {0} already spent by operation {1}.
    ConflictingSpend(Opout, OpId),

    /// delta produces output {0} which already exists in the contract state.
    CellCollision(Opout),
}

/// Full known state of a single contract.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ContractState {
    global: BTreeMap<GlobalStateType, Vec<FieldValue>>,
    owned: BTreeMap<Opout, OwnedCell>,
}

impl ContractState {
    pub fn new() -> Self { ContractState::default() }

    /// Applies a delta atomically: the state is mutated only if the whole
    /// delta is applicable, otherwise it is left untouched and the first
    /// violation is returned.
    ///
    /// The spend checks performed here are the point where concurrent spends
    /// of the same output serialize: whichever delta is applied first wins,
    /// any later conflicting delta fails with [`StateError::ConflictingSpend`].
    pub fn apply(&mut self, delta: StateDelta) -> Result<(), StateError> {
        for (opout, _) in &delta.consumes {
            let cell = self
                .owned
                .get(opout)
                .ok_or(StateError::UnknownCell(*opout))?;
            if let Some(spender) = cell.spent_by {
                return Err(StateError::ConflictingSpend(*opout, spender));
            }
        }
        for (opout, _) in &delta.produces {
            if self.owned.contains_key(opout) {
                return Err(StateError::CellCollision(*opout));
            }
        }

        for (opout, spender) in delta.consumes {
            if let Some(cell) = self.owned.get_mut(&opout) {
                cell.spent_by = Some(spender);
            }
        }
        for (opout, cell) in delta.produces {
            self.owned.insert(opout, cell);
        }
        for change in delta.globals {
            match change {
                GlobalChange::Append(ty, mut values) => {
                    self.global.entry(ty).or_default().append(&mut values);
                }
                GlobalChange::Replace(ty, value) => {
                    self.global.insert(ty, vec![value]);
                }
            }
        }
        Ok(())
    }

    /// All known values of a global state type, oldest first.
    pub fn global(&self, ty: GlobalStateType) -> &[FieldValue] {
        self.global.get(&ty).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn owned(&self, opout: Opout) -> Option<&OwnedCell> { self.owned.get(&opout) }

    /// Unspent outputs of the given owned state type.
    pub fn unspent(
        &self,
        ty: OwnedStateType,
    ) -> impl Iterator<Item = (Opout, &OwnedCell)> {
        self.owned
            .iter()
            .filter(move |(_, cell)| cell.ty == ty && !cell.is_spent())
            .map(|(opout, cell)| (*opout, cell))
    }

    /// Whether every known output of the given owned state type has a
    /// recorded spender.
    pub fn is_fully_spent(&self, ty: OwnedStateType) -> bool {
        self.unspent(ty).next().is_none()
    }

    /// Checked sum of all known numeric values of a global state type; `None`
    /// on u64 overflow.
    pub fn global_sum(&self, ty: GlobalStateType) -> Option<u64> {
        self.global(ty)
            .iter()
            .try_fold(0u64, |acc, value| acc.checked_add(value.num().unwrap_or(0)))
    }

    /// Checked sum of the magnitudes of all unspent outputs of an owned state
    /// type; `None` on u64 overflow.
    pub fn unspent_sum(&self, ty: OwnedStateType) -> Option<u64> {
        self.unspent(ty)
            .try_fold(0u64, |acc, (_, cell)| acc.checked_add(cell.state.magnitude()))
    }
}
