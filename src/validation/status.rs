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

use crate::contract::{ContractId, OpId, Opout};
use crate::schema::{
    FailureName, GlobalStateType, OccurrencesMismatch, OwnedStateType, SchemaId, TransitionType,
};
use crate::vm::EvalError;

/// Stage of the validation pipeline an operation has reached.
///
/// Stages are strictly ordered; an operation advances through them one by one
/// and a rejection names the stage at which validation stopped.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display)]
#[display(lowercase)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum Step {
    /// The operation was decoded and its id computed.
    Received,
    /// Schema and input references resolved; structural rules hold.
    Bound,
    /// The schema predicate for the operation type evaluated to true.
    PredicateChecked,
    /// The operation effect is applied to the contract state.
    Committed,
}

/// Terminal reasons for rejecting an operation.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum Failure {
    /// operation {0} references schema {1} which is not registered.
    SchemaUnknown(OpId, SchemaId),

    /// operation {0} extends contract {1} which is not known to the engine.
    ContractUnknown(OpId, ContractId),

    /// genesis operation {0} creates contract {1} which already exists.
    ContractRepeated(OpId, ContractId),

    /// operation {0} uses transition type {1} which its contract schema does
    /// not define.
    TransitionTypeUnknown(OpId, TransitionType),

    /// operation {0} declares global state of type {1} which its contract
    /// schema does not define.
    GlobalTypeUnknown(OpId, GlobalStateType),

    /// operation {0} produces owned state of type {1} which its contract
    /// schema does not define.
    OwnedTypeUnknown(OpId, OwnedStateType),

    /// operation {0} lists input {1} more than once.
    InputRepeated(OpId, Opout),

    /// operation {0} references output {1} of an operation outside of the
    /// known contract history.
    InputUnknown(OpId, Opout),

    /// operation {0} attempts to spend output {1} already spent by operation
    /// {2}.
    DoubleSpend(OpId, Opout, OpId),

    /// operation {0} produces output {1} which already exists in the contract
    /// state.
    OutputCollision(OpId, Opout),

    /// global state of type {1} in operation {0}: {2}
    GlobalOccurrences(OpId, GlobalStateType, OccurrencesMismatch),

    /// inputs of type {1} in operation {0}: {2}
    InputOccurrences(OpId, OwnedStateType, OccurrencesMismatch),

    /// assignments of type {1} in operation {0}: {2}
    AssignmentOccurrences(OpId, OwnedStateType, OccurrencesMismatch),

    /// global state of type {1} in operation {0} has a value kind not
    /// matching the schema declaration.
    FieldKindMismatch(OpId, GlobalStateType),

    /// owned state of type {1} in operation {0} has a state kind not matching
    /// the schema declaration.
    StateKindMismatch(OpId, OwnedStateType),

    /// sum of state amounts in operation {0} overflows 64 bits.
    AmountOverflow(OpId),

    /// operation {0} violates schema requirement '{1}'.
    PredicateFailed(OpId, FailureName),

    /// predicate evaluation for operation {0} aborted: {1}
    Evaluation(OpId, EvalError),
}

/// Rejection verdict: the operation, the pipeline stage reached, and the
/// reason validation stopped there.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display("operation {opid} rejected at step '{step}': {failure}")]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Rejection {
    pub opid: OpId,
    pub step: Step,
    pub failure: Failure,
}

impl Rejection {
    pub fn new(opid: OpId, step: Step, failure: Failure) -> Self {
        Rejection {
            opid,
            step,
            failure,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejection_names_step_and_failure() {
        let opid = OpId::from_array([1; 32]);
        let rejection = Rejection::new(
            opid,
            Step::PredicateChecked,
            Failure::PredicateFailed(opid, FailureName::from("inflation")),
        );
        let msg = rejection.to_string();
        assert!(msg.contains("predicatechecked"));
        assert!(msg.contains("inflation"));
    }
}
