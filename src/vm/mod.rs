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

//! Evaluation machine for schema predicates.
//!
//! Deliberately total: no loops, no recursion over data, every expression
//! evaluates in time linear in its size. The full bytecode VM used for custom
//! contract logic is an external substrate; schema-shaped asset contracts
//! need only the arithmetic conditions expressible here.

use std::collections::BTreeMap;

use crate::contract::TokenIndex;
use crate::schema::{Expr, FieldName, Predicate};

/// Named values prepared by the validation engine for a single predicate
/// evaluation: scalar u64 bindings plus per-token fraction unit sums for
/// allocation-kind owned types.
#[derive(Clone, Default, Debug)]
pub struct Bindings {
    values: BTreeMap<FieldName, u64>,
    tokens: BTreeMap<FieldName, BTreeMap<TokenIndex, u64>>,
}

impl Bindings {
    pub fn new() -> Self { Bindings::default() }

    pub fn bind(&mut self, name: impl Into<FieldName>, value: u64) {
        self.values.insert(name.into(), value);
    }

    pub fn bind_tokens(
        &mut self,
        name: impl Into<FieldName>,
        sums: BTreeMap<TokenIndex, u64>,
    ) {
        self.tokens.insert(name.into(), sums);
    }

    pub fn contains(&self, name: &FieldName) -> bool { self.values.contains_key(name) }

    pub fn val(&self, name: &FieldName) -> Result<u64, EvalError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::UnboundVariable(name.clone()))
    }

    /// Fraction unit sums keyed by token index, as bound for `in.<name>` or
    /// `out.<name>` of an allocation-kind owned type.
    pub fn token_sums(&self, name: &FieldName) -> Result<&BTreeMap<TokenIndex, u64>, EvalError> {
        self.tokens
            .get(name)
            .ok_or_else(|| EvalError::UnboundVariable(name.clone()))
    }
}

/// Errors aborting predicate evaluation.
///
/// An evaluation error is not a predicate returning false: it indicates that
/// the condition could not be decided at all and leads to operation rejection
/// with the evaluation failure, not with the schema-defined failure name.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum EvalError {
    /// predicate references variable '{0}' which is not bound for the
    /// operation under validation.
    UnboundVariable(FieldName),

    /// arithmetic overflow during predicate evaluation.
    ArithmeticOverflow,
}

fn eval_expr(expr: &Expr, bindings: &Bindings) -> Result<u64, EvalError> {
    match expr {
        Expr::Const(val) => Ok(*val),
        Expr::Var(name) => bindings.val(name),
        Expr::Add(lhs, rhs) => {
            let lhs = eval_expr(lhs, bindings)?;
            let rhs = eval_expr(rhs, bindings)?;
            lhs.checked_add(rhs).ok_or(EvalError::ArithmeticOverflow)
        }
    }
}

/// Evaluates a schema predicate against the prepared bindings.
pub fn evaluate(predicate: &Predicate, bindings: &Bindings) -> Result<bool, EvalError> {
    match predicate {
        Predicate::Any => Ok(true),
        Predicate::Eq(lhs, rhs) => Ok(eval_expr(lhs, bindings)? == eval_expr(rhs, bindings)?),
        Predicate::LtEq(lhs, rhs) => Ok(eval_expr(lhs, bindings)? <= eval_expr(rhs, bindings)?),
        Predicate::Defined(name) => Ok(bindings.contains(name)),
        Predicate::Not(inner) => Ok(!evaluate(inner, bindings)?),
        Predicate::All(preds) => {
            for pred in preds {
                if !evaluate(pred, bindings)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Predicate::AnyOf(preds) => {
            for pred in preds {
                if evaluate(pred, bindings)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Predicate::TokensConserved(name) => {
            let inputs = bindings.token_sums(&FieldName::from(format!("in.{name}")))?;
            let outputs = bindings.token_sums(&FieldName::from(format!("out.{name}")))?;
            Ok(inputs == outputs)
        }
        Predicate::TokensComplete(name, whole) => {
            let whole = eval_expr(whole, bindings)?;
            let outputs = bindings.token_sums(&FieldName::from(format!("out.{name}")))?;
            Ok(outputs.values().all(|units| *units == whole))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn bindings() -> Bindings {
        let mut bindings = Bindings::new();
        bindings.bind("in.balance.sum", 1000);
        bindings.bind("out.balance.sum", 1000);
        bindings.bind("schema.maxSupply", 21_000_000);
        bindings
    }

    #[test]
    fn conservation_predicate() {
        let pred = Predicate::eq(Expr::var("in.balance.sum"), Expr::var("out.balance.sum"));
        assert_eq!(evaluate(&pred, &bindings()), Ok(true));

        let mut unbalanced = bindings();
        unbalanced.bind("out.balance.sum", 1001);
        assert_eq!(evaluate(&pred, &unbalanced), Ok(false));
    }

    #[test]
    fn unbound_variable_aborts() {
        let pred = Predicate::eq(Expr::var("in.missing.sum"), 0u64);
        assert_eq!(
            evaluate(&pred, &bindings()),
            Err(EvalError::UnboundVariable(FieldName::from("in.missing.sum")))
        );
    }

    #[test]
    fn addition_overflow_aborts() {
        let mut bindings = Bindings::new();
        bindings.bind("a", u64::MAX);
        bindings.bind("b", 1);
        let pred = Predicate::lt_eq(Expr::add(Expr::var("a"), Expr::var("b")), u64::MAX);
        assert_eq!(evaluate(&pred, &bindings), Err(EvalError::ArithmeticOverflow));
    }

    #[test]
    fn short_circuits_preserve_totality() {
        // anyOf succeeds on the first true branch even when a later branch
        // would fail to evaluate.
        let pred = Predicate::any_of([
            Predicate::eq(Expr::var("in.balance.sum"), Expr::var("out.balance.sum")),
            Predicate::eq(Expr::var("in.missing.sum"), 0u64),
        ]);
        assert_eq!(evaluate(&pred, &bindings()), Ok(true));
    }

    #[test]
    fn token_conservation_is_per_token() {
        let pred = Predicate::tokens_conserved("token");
        let mut bindings = Bindings::new();
        bindings.bind_tokens("in.token", bmap! {
            TokenIndex::with(1) => 5u64,
            TokenIndex::with(2) => 3u64,
        });
        bindings.bind_tokens("out.token", bmap! {
            TokenIndex::with(1) => 5u64,
            TokenIndex::with(2) => 3u64,
        });
        assert_eq!(evaluate(&pred, &bindings), Ok(true));

        // The same number of units under a different token index is not
        // conservation: a token changing identity is a mint plus a melt.
        bindings.bind_tokens("out.token", bmap! { TokenIndex::with(3) => 8u64 });
        assert_eq!(evaluate(&pred, &bindings), Ok(false));
    }

    #[test]
    fn token_completeness_checks_every_token() {
        let pred = Predicate::tokens_complete("token", Expr::var("op.fractions.sum"));
        let mut bindings = Bindings::new();
        bindings.bind("op.fractions.sum", 10);
        bindings.bind_tokens("out.token", bmap! {
            TokenIndex::with(1) => 10u64,
            TokenIndex::with(2) => 10u64,
        });
        assert_eq!(evaluate(&pred, &bindings), Ok(true));

        // Two tokens adding up to the whole do not make either complete.
        bindings.bind_tokens("out.token", bmap! {
            TokenIndex::with(1) => 6u64,
            TokenIndex::with(2) => 4u64,
        });
        assert_eq!(evaluate(&pred, &bindings), Ok(false));
    }

    #[test]
    fn defined_and_negation() {
        let pred = Predicate::not(Predicate::defined("op.ticker"));
        assert_eq!(evaluate(&pred, &bindings()), Ok(true));
        let pred = Predicate::defined("schema.maxSupply");
        assert_eq!(evaluate(&pred, &bindings()), Ok(true));
    }
}
