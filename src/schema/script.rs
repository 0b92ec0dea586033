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

use super::FieldName;
use crate::contract::CommitHasher;

/// Arithmetic expression over unsigned 64-bit values evaluated by the
/// predicate machine.
///
/// Variables refer to the evaluation bindings prepared by the validation
/// engine for the operation under check (input and output sums, global field
/// values, cumulative contract state).
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum Expr {
    Const(u64),
    Var(FieldName),
    Add(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<FieldName>) -> Self { Expr::Var(name.into()) }

    pub fn add(lhs: Expr, rhs: Expr) -> Self { Expr::Add(Box::new(lhs), Box::new(rhs)) }

    pub(crate) fn commit(&self, hasher: &mut CommitHasher) {
        match self {
            Expr::Const(val) => {
                hasher.commit_u8(0);
                hasher.commit_u64(*val);
            }
            Expr::Var(name) => {
                hasher.commit_u8(1);
                hasher.commit_str(name.as_str());
            }
            Expr::Add(lhs, rhs) => {
                hasher.commit_u8(2);
                lhs.commit(hasher);
                rhs.commit(hasher);
            }
        }
    }
}

impl From<u64> for Expr {
    fn from(val: u64) -> Self { Expr::Const(val) }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(val) => Display::fmt(val, f),
            Expr::Var(name) => Display::fmt(name, f),
            Expr::Add(lhs, rhs) => write!(f, "({lhs} + {rhs})"),
        }
    }
}

/// Boolean condition attached by a schema to an operation type.
///
/// Predicates are total: evaluation either produces a boolean or aborts the
/// whole validation with an evaluation error (unbound variable, arithmetic
/// overflow). They carry no loops or recursion, so evaluation always
/// terminates.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum Predicate {
    /// Trivially true; used by operations whose structural checks suffice.
    Any,
    Eq(Expr, Expr),
    LtEq(Expr, Expr),
    /// True when the named binding is present, regardless of its value.
    Defined(FieldName),
    Not(Box<Predicate>),
    All(Vec<Predicate>),
    AnyOf(Vec<Predicate>),
    /// Per-token conservation over the named allocation-kind owned type: for
    /// each token index appearing among the closed inputs or the produced
    /// outputs, the sum of input fraction units must equal the sum of output
    /// units. Tokens cannot be minted, melted or change identity in flight.
    TokensConserved(FieldName),
    /// Per-token completeness over the named allocation-kind owned type: the
    /// fraction units produced for every minted token must sum exactly to the
    /// value of the expression.
    TokensComplete(FieldName, Expr),
}

impl Predicate {
    pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Predicate::Eq(lhs.into(), rhs.into())
    }

    pub fn lt_eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Predicate::LtEq(lhs.into(), rhs.into())
    }

    pub fn defined(name: impl Into<FieldName>) -> Self { Predicate::Defined(name.into()) }

    pub fn not(inner: Predicate) -> Self { Predicate::Not(Box::new(inner)) }

    pub fn all(preds: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::All(preds.into_iter().collect())
    }

    pub fn any_of(preds: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::AnyOf(preds.into_iter().collect())
    }

    pub fn tokens_conserved(name: impl Into<FieldName>) -> Self {
        Predicate::TokensConserved(name.into())
    }

    pub fn tokens_complete(name: impl Into<FieldName>, whole: impl Into<Expr>) -> Self {
        Predicate::TokensComplete(name.into(), whole.into())
    }

    pub(crate) fn commit(&self, hasher: &mut CommitHasher) {
        match self {
            Predicate::Any => hasher.commit_u8(0),
            Predicate::Eq(lhs, rhs) => {
                hasher.commit_u8(1);
                lhs.commit(hasher);
                rhs.commit(hasher);
            }
            Predicate::LtEq(lhs, rhs) => {
                hasher.commit_u8(2);
                lhs.commit(hasher);
                rhs.commit(hasher);
            }
            Predicate::Defined(name) => {
                hasher.commit_u8(3);
                hasher.commit_str(name.as_str());
            }
            Predicate::Not(inner) => {
                hasher.commit_u8(4);
                inner.commit(hasher);
            }
            Predicate::All(preds) => {
                hasher.commit_u8(5);
                hasher.commit_u64(preds.len() as u64);
                for pred in preds {
                    pred.commit(hasher);
                }
            }
            Predicate::AnyOf(preds) => {
                hasher.commit_u8(6);
                hasher.commit_u64(preds.len() as u64);
                for pred in preds {
                    pred.commit(hasher);
                }
            }
            Predicate::TokensConserved(name) => {
                hasher.commit_u8(7);
                hasher.commit_str(name.as_str());
            }
            Predicate::TokensComplete(name, whole) => {
                hasher.commit_u8(8);
                hasher.commit_str(name.as_str());
                whole.commit(hasher);
            }
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Any => f.write_str("any"),
            Predicate::Eq(lhs, rhs) => write!(f, "{lhs} = {rhs}"),
            Predicate::LtEq(lhs, rhs) => write!(f, "{lhs} <= {rhs}"),
            Predicate::Defined(name) => write!(f, "defined({name})"),
            Predicate::Not(inner) => write!(f, "!({inner})"),
            Predicate::All(preds) => {
                f.write_str("all(")?;
                for (pos, pred) in preds.iter().enumerate() {
                    if pos > 0 {
                        f.write_str(", ")?;
                    }
                    Display::fmt(pred, f)?;
                }
                f.write_str(")")
            }
            Predicate::AnyOf(preds) => {
                f.write_str("anyOf(")?;
                for (pos, pred) in preds.iter().enumerate() {
                    if pos > 0 {
                        f.write_str(", ")?;
                    }
                    Display::fmt(pred, f)?;
                }
                f.write_str(")")
            }
            Predicate::TokensConserved(name) => write!(f, "tokensConserved({name})"),
            Predicate::TokensComplete(name, whole) => {
                write!(f, "tokensComplete({name}, {whole})")
            }
        }
    }
}
