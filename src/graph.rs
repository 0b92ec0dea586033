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

//! Directed acyclic graph of validated operations of a single contract.

use std::collections::BTreeMap;

use crate::contract::{OpId, Operation, Opout};

/// Violations of graph integrity.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum GraphError {
    /// operation {0} references output {1} of an operation outside of the
    /// known graph.
    DanglingReference(OpId, Opout),

    /// output {0} is already spent by operation {1}.
    DoubleSpend(Opout, OpId),
}

/// Append-only DAG of all operations accepted for a contract.
///
/// Acyclicity is inherent: an operation id commits to the ids of all inputs,
/// so no operation can reference itself or a successor. The graph records
/// which operation spends which output, giving each contract a single
/// ancestry for every piece of owned state.
#[derive(Clone, Default, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct OpGraph {
    table: BTreeMap<OpId, Operation>,
    /// Accepted operations in commit order.
    order: Vec<OpId>,
    spenders: BTreeMap<Opout, OpId>,
}

impl OpGraph {
    pub fn new() -> Self { OpGraph::default() }

    /// Adds a validated operation to the graph, recording it as the spender
    /// of each of its inputs.
    ///
    /// All inputs must reference operations already in the graph, and none of
    /// them may already have a spender.
    pub fn add(&mut self, operation: Operation) -> Result<OpId, GraphError> {
        let opid = operation.id();
        if self.table.contains_key(&opid) {
            return Ok(opid);
        }
        for input in &operation.inputs {
            if !self.table.contains_key(&input.op) {
                return Err(GraphError::DanglingReference(opid, *input));
            }
            if let Some(spender) = self.spenders.get(input) {
                return Err(GraphError::DoubleSpend(*input, *spender));
            }
        }
        for input in &operation.inputs {
            self.spenders.insert(*input, opid);
        }
        self.table.insert(opid, operation);
        self.order.push(opid);
        Ok(opid)
    }

    pub fn contains(&self, opid: OpId) -> bool { self.table.contains_key(&opid) }

    pub fn get(&self, opid: OpId) -> Option<&Operation> { self.table.get(&opid) }

    /// The operation spending the given output, if it is known.
    pub fn spender_of(&self, opout: Opout) -> Option<OpId> {
        self.spenders.get(&opout).copied()
    }

    /// Number of operations in the graph.
    pub fn len(&self) -> usize { self.table.len() }

    pub fn is_empty(&self) -> bool { self.table.is_empty() }

    /// Operations in the order they were accepted.
    pub fn operations(&self) -> impl Iterator<Item = (OpId, &Operation)> {
        self.order
            .iter()
            .filter_map(|opid| self.table.get(opid).map(|op| (*opid, op)))
    }
}
