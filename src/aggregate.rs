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

//! Aggregate projections over partially known contract state.
//!
//! A client-side-validated history is in general incomplete: a party only
//! holds the operations reachable from its own state. Aggregates therefore
//! distinguish values the known subset proves from values it cannot.

use std::fmt::{self, Display, Formatter};

use crate::contract::Amount;
use crate::schema::Aggregator;
use crate::state::ContractState;

/// A value which the known part of a contract history may or may not be able
/// to prove.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum MaybeKnown<T> {
    Known(T),
    /// The known history is insufficient: some operation which could change
    /// the value may exist outside of it.
    Unknown,
}

impl<T> MaybeKnown<T> {
    pub fn known(self) -> Option<T> {
        match self {
            MaybeKnown::Known(val) => Some(val),
            MaybeKnown::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool { matches!(self, MaybeKnown::Known(_)) }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MaybeKnown<U> {
        match self {
            MaybeKnown::Known(val) => MaybeKnown::Known(f(val)),
            MaybeKnown::Unknown => MaybeKnown::Unknown,
        }
    }

    /// Combines two values; the result is known only when both are.
    pub fn zip_with<U, R>(
        self,
        other: MaybeKnown<U>,
        f: impl FnOnce(T, U) -> R,
    ) -> MaybeKnown<R> {
        match (self, other) {
            (MaybeKnown::Known(lhs), MaybeKnown::Known(rhs)) => MaybeKnown::Known(f(lhs, rhs)),
            _ => MaybeKnown::Unknown,
        }
    }
}

impl<T: Display> Display for MaybeKnown<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MaybeKnown::Known(val) => Display::fmt(val, f),
            MaybeKnown::Unknown => f.write_str("unknown"),
        }
    }
}

impl<T> From<T> for MaybeKnown<T> {
    fn from(val: T) -> Self { MaybeKnown::Known(val) }
}

/// arithmetic overflow while computing an aggregate over the contract state.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct AggregateOverflow;

/// Computes an aggregate over the known contract state.
///
/// `SumV` sums are always definite over the known history. `Total` is
/// definite only once every output of the guard owned type is spent: while an
/// issuer still holds e.g. an unspent inflation right, further issues may
/// exist which the local history does not include. `Diff` propagates
/// unknownness from either operand and saturates at zero, since the unseen
/// part of a history can only enlarge the minuend.
pub fn compute(
    aggregator: &Aggregator,
    state: &ContractState,
) -> Result<MaybeKnown<Amount>, AggregateOverflow> {
    match aggregator {
        Aggregator::SumV(global) => {
            let sum = state.global_sum(*global).ok_or(AggregateOverflow)?;
            Ok(MaybeKnown::Known(Amount::with(sum)))
        }
        Aggregator::Total(global, guard) => {
            if !state.is_fully_spent(*guard) {
                return Ok(MaybeKnown::Unknown);
            }
            let sum = state.global_sum(*global).ok_or(AggregateOverflow)?;
            Ok(MaybeKnown::Known(Amount::with(sum)))
        }
        Aggregator::Diff(minuend, subtrahend) => {
            let minuend = compute(minuend, state)?;
            let subtrahend = compute(subtrahend, state)?;
            Ok(minuend.zip_with(subtrahend, Amount::saturating_sub))
        }
    }
}
