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

//! RGB25 collectible fungible asset schema: a fungible asset named like a
//! collectible, without a ticker.

use super::*;
use crate::schema::{
    Aggregator, Expr, FieldKind, GlobalStateSchema, Occurrences, OperationSchema,
    OwnedStateSchema, Predicate, Schema, StateKind,
};

/// Fixed-supply collectible fungible asset.
pub fn collectible() -> Schema {
    Schema {
        name: "RGB25-CFA".into(),
        global_types: bmap! {
            GS_NAME => GlobalStateSchema::once("name", FieldKind::Text),
            GS_DETAILS => GlobalStateSchema::once("details", FieldKind::Text),
            GS_PRECISION => GlobalStateSchema::once("precision", FieldKind::Num),
            GS_ISSUED => GlobalStateSchema::many("issued", FieldKind::Num),
        },
        owned_types: bmap! {
            OS_AMOUNT => OwnedStateSchema::with("balance", StateKind::Amount),
        },
        genesis: OperationSchema::new("issue", "sumMismatch")
            .global(GS_NAME, Occurrences::Once)
            .global(GS_DETAILS, Occurrences::NoneOrOnce)
            .global(GS_PRECISION, Occurrences::Once)
            .global(GS_ISSUED, Occurrences::Once)
            .assigns(OS_AMOUNT, Occurrences::OnceOrMore)
            .predicate(Predicate::eq(
                Expr::var("op.issued.sum"),
                Expr::var("out.balance.sum"),
            )),
        transitions: bmap! {
            TS_TRANSFER => OperationSchema::new("transfer", "inflation")
                .closes(OS_AMOUNT, Occurrences::OnceOrMore)
                .assigns(OS_AMOUNT, Occurrences::OnceOrMore)
                .predicate(Predicate::eq(
                    Expr::var("in.balance.sum"),
                    Expr::var("out.balance.sum"),
                )),
        },
        max_supply: None,
        aggregators: bmap! {
            "knownIssued".into() => Aggregator::SumV(GS_ISSUED),
            "totalIssued".into() => Aggregator::SumV(GS_ISSUED),
            "circulating".into() => Aggregator::SumV(GS_ISSUED),
        },
    }
}
