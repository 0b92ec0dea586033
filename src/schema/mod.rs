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

//! Components of the contract schema, defining the validation rules for a
//! class of asset contracts.

mod occurrences;
mod script;
mod schema;

pub use occurrences::{Occurrences, OccurrencesMismatch};
pub use schema::{
    Aggregator, FailureName, FieldKind, FieldName, GlobalStateSchema, GlobalStateType,
    OperationSchema, OwnedStateSchema, OwnedStateType, Schema, SchemaId, SchemaInconsistency,
    StateKind, TransitionType,
};
pub use script::{Expr, Predicate};
