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

use super::{Failure, Rejection, Step};
use crate::aggregate::{compute, MaybeKnown};
use crate::contract::{Amount, ContractId, OpId, OpKind, Operation, Opout, TokenIndex};
use crate::graph::OpGraph;
use crate::registry::{RegistryError, SchemaRegistry, UnknownSchema};
use crate::schema::{FieldName, OperationSchema, OwnedStateType, Schema, SchemaId, StateKind};
use crate::state::{ContractState, GlobalChange, OwnedCell, StateDelta, StateError};
use crate::vm::{evaluate, Bindings};

/// Everything the engine keeps per contract: the schema it was created under,
/// its evolving state and the DAG of accepted operations.
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Contract {
    schema: SchemaId,
    state: ContractState,
    graph: OpGraph,
}

impl Contract {
    pub fn schema_id(&self) -> SchemaId { self.schema }

    pub fn state(&self) -> &ContractState { &self.state }

    pub fn graph(&self) -> &OpGraph { &self.graph }
}

/// Successful result of submitting an operation.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum Outcome {
    /// The operation passed all checks and its effect is now part of the
    /// contract state.
    Committed {
        opid: OpId,
        contract_id: ContractId,
        produced: Vec<Opout>,
    },

    /// The operation was already committed earlier; the state is unchanged.
    Duplicate(OpId),
}

impl Outcome {
    pub fn opid(&self) -> OpId {
        match self {
            Outcome::Committed { opid, .. } => *opid,
            Outcome::Duplicate(opid) => *opid,
        }
    }
}

/// Errors answering aggregate queries.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum QueryError {
    /// contract {0} is not known to the engine.
    ContractUnknown(ContractId),

    /// contract schema publishes no aggregate named '{0}'.
    ProjectionUnknown(FieldName),

    /// aggregate computation overflows 64 bits.
    Overflow,
}

/// Deterministic validation engine for asset contracts.
///
/// The engine owns a schema registry and the state of every contract it has
/// accepted a genesis for. Operations are submitted one at a time; each one
/// either commits atomically or leaves all engine state untouched. The
/// exclusive borrow taken by [`Engine::submit`] is what serializes
/// conflicting spends: of two operations closing the same output, whichever
/// is submitted first wins.
#[derive(Clone, Default, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Engine {
    registry: SchemaRegistry,
    contracts: BTreeMap<ContractId, Contract>,
}

impl Engine {
    pub fn new() -> Self { Engine::default() }

    pub fn with_registry(registry: SchemaRegistry) -> Self {
        Engine {
            registry,
            contracts: bmap! {},
        }
    }

    /// Registers a schema, making the engine accept geneses under it.
    pub fn register_schema(&mut self, schema: Schema) -> Result<SchemaId, RegistryError> {
        self.registry.register(schema)
    }

    pub fn registry(&self) -> &SchemaRegistry { &self.registry }

    pub fn contract(&self, contract_id: ContractId) -> Option<&Contract> {
        self.contracts.get(&contract_id)
    }

    pub fn contract_ids(&self) -> impl Iterator<Item = ContractId> + '_ {
        self.contracts.keys().copied()
    }

    /// Validates a single operation and, on success, commits its effect.
    ///
    /// The pipeline advances through [`Step`]s in order: resolution of schema
    /// and input references, structural checks against the operation schema,
    /// predicate evaluation, state commitment. The first violated rule stops
    /// the pipeline and nothing is committed.
    pub fn submit(&mut self, operation: Operation) -> Result<Outcome, Rejection> {
        let opid = operation.id();

        // Step 1: resolve the contract and the schema.
        let (contract_id, schema_id) = match operation.kind {
            OpKind::Genesis { schema } => (ContractId::from(opid), schema),
            OpKind::Transition { contract, .. } => {
                let known = self.contracts.get(&contract).ok_or_else(|| {
                    Rejection::new(opid, Step::Received, Failure::ContractUnknown(opid, contract))
                })?;
                (contract, known.schema)
            }
        };
        if let Some(contract) = self.contracts.get(&contract_id) {
            if contract.graph.contains(opid) {
                return Ok(Outcome::Duplicate(opid));
            }
            if operation.is_genesis() {
                return Err(Rejection::new(
                    opid,
                    Step::Received,
                    Failure::ContractRepeated(opid, contract_id),
                ));
            }
        }
        let schema = self
            .registry
            .lookup(schema_id)
            .map_err(|UnknownSchema(id)| {
                Rejection::new(opid, Step::Received, Failure::SchemaUnknown(opid, id))
            })?;
        let op_schema = match operation.transition_type() {
            None => &schema.genesis,
            Some(ty) => schema.transition(ty).ok_or_else(|| {
                Rejection::new(opid, Step::Received, Failure::TransitionTypeUnknown(opid, ty))
            })?,
        };

        // Step 2: structural checks against the operation schema.
        let inputs = self.bind(opid, &operation, schema, op_schema, contract_id)?;

        // Step 3: predicate evaluation.
        let bindings = self
            .bindings(opid, &operation, schema, contract_id, &inputs)
            .map_err(|failure| Rejection::new(opid, Step::Bound, failure))?;
        match evaluate(&op_schema.predicate, &bindings) {
            Ok(true) => {}
            Ok(false) => {
                return Err(Rejection::new(
                    opid,
                    Step::PredicateChecked,
                    Failure::PredicateFailed(opid, op_schema.error.clone()),
                ))
            }
            Err(err) => {
                return Err(Rejection::new(
                    opid,
                    Step::PredicateChecked,
                    Failure::Evaluation(opid, err),
                ))
            }
        }

        // Step 4: atomic commitment.
        let delta = Self::delta(opid, &operation, schema);
        let produced = delta.produces.iter().map(|(opout, _)| *opout).collect();
        let contract = self.contracts.entry(contract_id).or_insert_with(|| Contract {
            schema: schema_id,
            state: ContractState::new(),
            graph: OpGraph::new(),
        });
        contract.state.apply(delta).map_err(|err| {
            let failure = match err {
                StateError::UnknownCell(opout) => Failure::InputUnknown(opid, opout),
                StateError::ConflictingSpend(opout, spender) => {
                    Failure::DoubleSpend(opid, opout, spender)
                }
                StateError::CellCollision(opout) => Failure::OutputCollision(opid, opout),
            };
            Rejection::new(opid, Step::Committed, failure)
        })?;
        contract
            .graph
            .add(operation)
            .expect("the state checks cover every graph consistency rule");

        Ok(Outcome::Committed {
            opid,
            contract_id,
            produced,
        })
    }

    /// Submits a batch of operations in order, collecting per-operation
    /// verdicts. A rejection does not stop the batch: later operations not
    /// depending on the rejected one may still commit.
    pub fn submit_all(
        &mut self,
        operations: impl IntoIterator<Item = Operation>,
    ) -> Vec<Result<Outcome, Rejection>> {
        operations.into_iter().map(|op| self.submit(op)).collect()
    }

    /// Answers a published aggregate query over a contract.
    pub fn query(
        &self,
        contract_id: ContractId,
        name: impl Into<FieldName>,
    ) -> Result<MaybeKnown<Amount>, QueryError> {
        let name = name.into();
        let contract = self
            .contracts
            .get(&contract_id)
            .ok_or(QueryError::ContractUnknown(contract_id))?;
        let schema = self
            .registry
            .lookup(contract.schema)
            .map_err(|_| QueryError::ContractUnknown(contract_id))?;
        let aggregator = schema
            .aggregators
            .get(&name)
            .ok_or(QueryError::ProjectionUnknown(name))?;
        compute(aggregator, &contract.state).map_err(|_| QueryError::Overflow)
    }

    /// Resolves operation inputs and verifies all structural schema rules.
    fn bind(
        &self,
        opid: OpId,
        operation: &Operation,
        schema: &Schema,
        op_schema: &OperationSchema,
        contract_id: ContractId,
    ) -> Result<Vec<(Opout, OwnedCell)>, Rejection> {
        let reject = |failure| Rejection::new(opid, Step::Bound, failure);

        // Declared global state must be known to the schema and well-kinded.
        let mut global_counts = bmap! {};
        for (ty, value) in &operation.globals {
            let declared = schema
                .global_types
                .get(ty)
                .ok_or_else(|| reject(Failure::GlobalTypeUnknown(opid, *ty)))?;
            if value.kind() != declared.kind {
                return Err(reject(Failure::FieldKindMismatch(opid, *ty)));
            }
            *global_counts.entry(*ty).or_insert(0u16) += 1;
        }
        for (ty, occurrences) in &op_schema.globals {
            let found = global_counts.remove(ty).unwrap_or_default();
            occurrences
                .check(found)
                .map_err(|err| reject(Failure::GlobalOccurrences(opid, *ty, err)))?;
        }
        if let Some((ty, found)) = global_counts.pop_first() {
            return Err(reject(Failure::GlobalOccurrences(
                opid,
                ty,
                crate::schema::OccurrencesMismatch {
                    min: 0,
                    max: 0,
                    found,
                },
            )));
        }

        // Inputs must be distinct, resolvable and unspent.
        let mut inputs = Vec::with_capacity(operation.inputs.len());
        let mut input_counts: BTreeMap<OwnedStateType, u16> = bmap! {};
        for input in &operation.inputs {
            if inputs.iter().any(|(opout, _)| opout == input) {
                return Err(reject(Failure::InputRepeated(opid, *input)));
            }
            let cell = self
                .contracts
                .get(&contract_id)
                .and_then(|contract| contract.state.owned(*input))
                .ok_or_else(|| reject(Failure::InputUnknown(opid, *input)))?;
            if let Some(spender) = cell.spent_by {
                return Err(reject(Failure::DoubleSpend(opid, *input, spender)));
            }
            *input_counts.entry(cell.ty).or_insert(0) += 1;
            inputs.push((*input, cell.clone()));
        }
        for (ty, occurrences) in &op_schema.closes {
            let found = input_counts.remove(ty).unwrap_or_default();
            occurrences
                .check(found)
                .map_err(|err| reject(Failure::InputOccurrences(opid, *ty, err)))?;
        }
        if let Some((ty, found)) = input_counts.pop_first() {
            return Err(reject(Failure::InputOccurrences(
                opid,
                ty,
                crate::schema::OccurrencesMismatch {
                    min: 0,
                    max: 0,
                    found,
                },
            )));
        }

        // Produced assignments must be known to the schema and well-kinded.
        let mut assignment_counts: BTreeMap<OwnedStateType, u16> = bmap! {};
        for assignment in &operation.assignments {
            let declared = schema
                .owned_types
                .get(&assignment.ty)
                .ok_or_else(|| reject(Failure::OwnedTypeUnknown(opid, assignment.ty)))?;
            if assignment.state.kind() != declared.kind {
                return Err(reject(Failure::StateKindMismatch(opid, assignment.ty)));
            }
            *assignment_counts.entry(assignment.ty).or_insert(0) += 1;
        }
        for (ty, occurrences) in &op_schema.assignments {
            let found = assignment_counts.remove(ty).unwrap_or_default();
            occurrences
                .check(found)
                .map_err(|err| reject(Failure::AssignmentOccurrences(opid, *ty, err)))?;
        }
        if let Some((ty, found)) = assignment_counts.pop_first() {
            return Err(reject(Failure::AssignmentOccurrences(
                opid,
                ty,
                crate::schema::OccurrencesMismatch {
                    min: 0,
                    max: 0,
                    found,
                },
            )));
        }

        Ok(inputs)
    }

    /// Prepares the standard bindings predicates may reference.
    ///
    /// For every owned type `t` named `n` in the schema: `in.n.sum`,
    /// `in.n.count` over the closed inputs and `out.n.sum`, `out.n.count`
    /// over the produced assignments; allocation-kind types additionally get
    /// `in.n` and `out.n` per-token unit sums. For every global type named `g`:
    /// `op.g.sum`, `op.g.count` over the values declared by the operation and
    /// `contract.g.sum` over the values accumulated by the contract before
    /// it. `schema.maxSupply` is bound when the schema declares a cap.
    fn bindings(
        &self,
        opid: OpId,
        operation: &Operation,
        schema: &Schema,
        contract_id: ContractId,
        inputs: &[(Opout, OwnedCell)],
    ) -> Result<Bindings, Failure> {
        let mut bindings = Bindings::new();
        let overflow = || Failure::AmountOverflow(opid);

        for (ty, owned) in &schema.owned_types {
            let name = owned.name.as_str();
            let mut in_sum = 0u64;
            let mut in_count = 0u64;
            for (_, cell) in inputs.iter().filter(|(_, cell)| cell.ty == *ty) {
                in_sum = in_sum
                    .checked_add(cell.state.magnitude())
                    .ok_or_else(overflow)?;
                in_count += 1;
            }
            let mut out_sum = 0u64;
            let mut out_count = 0u64;
            for assignment in operation.assignments_of(*ty) {
                out_sum = out_sum
                    .checked_add(assignment.state.magnitude())
                    .ok_or_else(overflow)?;
                out_count += 1;
            }
            bindings.bind(format!("in.{name}.sum"), in_sum);
            bindings.bind(format!("in.{name}.count"), in_count);
            bindings.bind(format!("out.{name}.sum"), out_sum);
            bindings.bind(format!("out.{name}.count"), out_count);

            // Allocation-kind types additionally get per-token unit sums, so
            // that predicates can reason about each token separately.
            if owned.kind == StateKind::Allocation {
                let mut in_tokens: BTreeMap<TokenIndex, u64> = bmap! {};
                for (_, cell) in inputs.iter().filter(|(_, cell)| cell.ty == *ty) {
                    if let Some(allocation) = cell.state.allocation() {
                        let sum = in_tokens.entry(allocation.token_index()).or_insert(0);
                        *sum = sum
                            .checked_add(allocation.fraction().units())
                            .ok_or_else(overflow)?;
                    }
                }
                let mut out_tokens: BTreeMap<TokenIndex, u64> = bmap! {};
                for assignment in operation.assignments_of(*ty) {
                    if let Some(allocation) = assignment.state.allocation() {
                        let sum = out_tokens.entry(allocation.token_index()).or_insert(0);
                        *sum = sum
                            .checked_add(allocation.fraction().units())
                            .ok_or_else(overflow)?;
                    }
                }
                bindings.bind_tokens(format!("in.{name}"), in_tokens);
                bindings.bind_tokens(format!("out.{name}"), out_tokens);
            }
        }

        let state = self.contracts.get(&contract_id).map(Contract::state);
        for (ty, global) in &schema.global_types {
            let name = global.name.as_str();
            let mut op_sum = 0u64;
            let mut op_count = 0u64;
            for value in operation.globals_of(*ty) {
                op_sum = op_sum
                    .checked_add(value.num().unwrap_or(0))
                    .ok_or_else(overflow)?;
                op_count += 1;
            }
            let contract_sum = match state {
                None => 0,
                Some(state) => state.global_sum(*ty).ok_or_else(overflow)?,
            };
            bindings.bind(format!("op.{name}.sum"), op_sum);
            bindings.bind(format!("op.{name}.count"), op_count);
            bindings.bind(format!("contract.{name}.sum"), contract_sum);
        }

        if let Some(max_supply) = schema.max_supply {
            bindings.bind("schema.maxSupply", max_supply);
        }

        Ok(bindings)
    }

    /// Materializes the state effect of a checked operation.
    fn delta(opid: OpId, operation: &Operation, schema: &Schema) -> StateDelta {
        let consumes = operation
            .inputs
            .iter()
            .map(|input| (*input, opid))
            .collect();
        let produces = operation
            .assignments
            .iter()
            .enumerate()
            .map(|(no, assignment)| {
                (Opout::new(opid, no as u16), OwnedCell {
                    ty: assignment.ty,
                    state: assignment.state,
                    auth: assignment.auth,
                    spent_by: None,
                })
            })
            .collect();
        let globals = operation
            .globals
            .iter()
            .map(|(ty, value)| {
                let multiple = schema
                    .global_types
                    .get(ty)
                    .map(|declared| declared.multiple)
                    .unwrap_or(true);
                if multiple {
                    GlobalChange::Append(*ty, vec![value.clone()])
                } else {
                    GlobalChange::Replace(*ty, value.clone())
                }
            })
            .collect();
        StateDelta {
            consumes,
            produces,
            globals,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::contract::AuthToken;
    use crate::ifaces;

    fn auth(seed: u8) -> AuthToken { AuthToken::from_array([seed; 32]) }

    fn engine() -> (Engine, SchemaId) {
        let mut engine = Engine::new();
        let schema_id = engine
            .register_schema(ifaces::rgb20::non_inflatable())
            .unwrap();
        (engine, schema_id)
    }

    fn issue(schema_id: SchemaId, amount: u64) -> Operation {
        Operation::genesis(schema_id)
            .add_global(ifaces::GS_NAME, "Test asset")
            .add_global(ifaces::GS_TICKER, "TEST")
            .add_global(ifaces::GS_PRECISION, 8u64)
            .add_global(ifaces::GS_ISSUED, amount)
            .add_assignment(ifaces::OS_AMOUNT, Amount::with(amount), auth(1))
    }

    #[test]
    fn genesis_commits() {
        let (mut engine, schema_id) = engine();
        let genesis = issue(schema_id, 1000);
        let outcome = engine.submit(genesis.clone()).unwrap();
        let contract_id = ContractId::from(genesis.id());
        assert_eq!(outcome, Outcome::Committed {
            opid: genesis.id(),
            contract_id,
            produced: vec![Opout::new(genesis.id(), 0)],
        });
        assert!(engine.contract(contract_id).is_some());
    }

    #[test]
    fn resubmission_is_idempotent() {
        let (mut engine, schema_id) = engine();
        let genesis = issue(schema_id, 1000);
        engine.submit(genesis.clone()).unwrap();
        let outcome = engine.submit(genesis.clone()).unwrap();
        assert_eq!(outcome, Outcome::Duplicate(genesis.id()));
    }

    #[test]
    fn committed_operations_are_recorded_in_the_graph() {
        let (mut engine, schema_id) = engine();
        let genesis = issue(schema_id, 1000);
        let contract_id = ContractId::from(genesis.id());
        engine.submit(genesis.clone()).unwrap();

        let transfer = Operation::transition(contract_id, ifaces::TS_TRANSFER)
            .add_input(Opout::new(genesis.id(), 0))
            .add_assignment(ifaces::OS_AMOUNT, Amount::with(1000), auth(2));
        engine.submit(transfer.clone()).unwrap();

        let graph = engine.contract(contract_id).unwrap().graph();
        assert!(graph.contains(genesis.id()));
        assert!(graph.contains(transfer.id()));
        assert_eq!(
            graph.spender_of(Opout::new(genesis.id(), 0)),
            Some(transfer.id())
        );
    }

    #[test]
    fn unregistered_schema_rejected() {
        let mut engine = Engine::new();
        let genesis = issue(SchemaId::from_array([0xEE; 32]), 1000);
        let rejection = engine.submit(genesis).unwrap_err();
        assert_eq!(rejection.step, Step::Received);
        assert!(matches!(rejection.failure, Failure::SchemaUnknown(_, _)));
    }

    #[test]
    fn unknown_contract_rejected() {
        let (mut engine, _) = engine();
        let transfer = Operation::transition(
            ContractId::from_array([0xEE; 32]),
            ifaces::TS_TRANSFER,
        )
        .add_input(Opout::new(OpId::from_array([1; 32]), 0))
        .add_assignment(ifaces::OS_AMOUNT, Amount::with(1), auth(2));
        let rejection = engine.submit(transfer).unwrap_err();
        assert!(matches!(rejection.failure, Failure::ContractUnknown(_, _)));
    }

    #[test]
    fn malformed_genesis_rejected_structurally() {
        let (mut engine, schema_id) = engine();
        // Missing the ticker declaration required exactly once.
        let genesis = Operation::genesis(schema_id)
            .add_global(ifaces::GS_NAME, "Test asset")
            .add_global(ifaces::GS_PRECISION, 8u64)
            .add_global(ifaces::GS_ISSUED, 1000u64)
            .add_assignment(ifaces::OS_AMOUNT, Amount::with(1000), auth(1));
        let rejection = engine.submit(genesis).unwrap_err();
        assert_eq!(rejection.step, Step::Bound);
        assert!(matches!(
            rejection.failure,
            Failure::GlobalOccurrences(_, ty, _) if ty == ifaces::GS_TICKER
        ));
    }
}
