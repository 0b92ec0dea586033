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

//! RGB20 fungible asset schemata.

use super::*;
use crate::schema::{
    Aggregator, Expr, FieldKind, GlobalStateSchema, Occurrences, OperationSchema,
    OwnedStateSchema, Predicate, Schema, StateKind,
};

fn nomination() -> [(GlobalStateType, GlobalStateSchema); 3] {
    [
        (GS_NAME, GlobalStateSchema::once("name", FieldKind::Text)),
        (GS_TICKER, GlobalStateSchema::once("ticker", FieldKind::Text)),
        (GS_PRECISION, GlobalStateSchema::once("precision", FieldKind::Num)),
    ]
}

fn transfer() -> OperationSchema {
    OperationSchema::new("transfer", "inflation")
        .closes(OS_AMOUNT, Occurrences::OnceOrMore)
        .assigns(OS_AMOUNT, Occurrences::OnceOrMore)
        .predicate(Predicate::eq(
            Expr::var("in.balance.sum"),
            Expr::var("out.balance.sum"),
        ))
}

/// Fixed-supply fungible asset: the full supply is issued at genesis and can
/// only be transferred afterwards.
pub fn non_inflatable() -> Schema {
    let mut global_types = bmap! {};
    global_types.extend(nomination());
    global_types.insert(GS_ISSUED, GlobalStateSchema::many("issued", FieldKind::Num));

    Schema {
        name: "RGB20-NIA".into(),
        global_types,
        owned_types: bmap! {
            OS_AMOUNT => OwnedStateSchema::with("balance", StateKind::Amount),
        },
        genesis: OperationSchema::new("issue", "sumMismatch")
            .global(GS_NAME, Occurrences::Once)
            .global(GS_TICKER, Occurrences::Once)
            .global(GS_PRECISION, Occurrences::Once)
            .global(GS_ISSUED, Occurrences::Once)
            .assigns(OS_AMOUNT, Occurrences::OnceOrMore)
            .predicate(Predicate::eq(
                Expr::var("op.issued.sum"),
                Expr::var("out.balance.sum"),
            )),
        transitions: bmap! {
            TS_TRANSFER => transfer(),
        },
        max_supply: None,
        aggregators: bmap! {
            "knownIssued".into() => Aggregator::SumV(GS_ISSUED),
            // Without inflation rights the genesis issue is the total issue.
            "totalIssued".into() => Aggregator::SumV(GS_ISSUED),
            "circulating".into() => Aggregator::SumV(GS_ISSUED),
        },
    }
}

/// Inflatable fungible asset with a hard supply cap, burn and renomination.
///
/// Secondary issues close inflation rights; once every inflation right output
/// is spent the total supply is final. Burns may exceed the locally known
/// circulating supply, since the burner may hold state the local history does
/// not cover.
pub fn inflatable(max_supply: u64) -> Schema {
    let mut global_types = bmap! {};
    global_types.extend(nomination());
    global_types.insert(GS_ISSUED, GlobalStateSchema::many("issued", FieldKind::Num));
    global_types.insert(GS_BURNED, GlobalStateSchema::many("burned", FieldKind::Num));

    Schema {
        name: "RGB20-FFA".into(),
        global_types,
        owned_types: bmap! {
            OS_AMOUNT => OwnedStateSchema::with("balance", StateKind::Amount),
            OS_INFLATION => OwnedStateSchema::with("issueRight", StateKind::Rights),
            OS_RENOMINATION => OwnedStateSchema::with("renominationRight", StateKind::Rights),
        },
        genesis: OperationSchema::new("issue", "sumMismatch")
            .global(GS_NAME, Occurrences::Once)
            .global(GS_TICKER, Occurrences::Once)
            .global(GS_PRECISION, Occurrences::Once)
            .global(GS_ISSUED, Occurrences::Once)
            .assigns(OS_AMOUNT, Occurrences::OnceOrMore)
            .assigns(OS_INFLATION, Occurrences::NoneOrMore)
            .assigns(OS_RENOMINATION, Occurrences::NoneOrOnce)
            .predicate(Predicate::all([
                Predicate::eq(Expr::var("op.issued.sum"), Expr::var("out.balance.sum")),
                Predicate::lt_eq(Expr::var("op.issued.sum"), Expr::var("schema.maxSupply")),
            ])),
        transitions: bmap! {
            TS_TRANSFER => transfer(),
            TS_INFLATE => OperationSchema::new("inflate", "maxSupplyExceeded")
                .global(GS_ISSUED, Occurrences::Once)
                .closes(OS_INFLATION, Occurrences::OnceOrMore)
                .assigns(OS_AMOUNT, Occurrences::OnceOrMore)
                .assigns(OS_INFLATION, Occurrences::NoneOrMore)
                .predicate(Predicate::all([
                    Predicate::eq(Expr::var("op.issued.sum"), Expr::var("out.balance.sum")),
                    Predicate::lt_eq(
                        Expr::add(Expr::var("contract.issued.sum"), Expr::var("op.issued.sum")),
                        Expr::var("schema.maxSupply"),
                    ),
                ])),
            TS_BURN => OperationSchema::new("burn", "invalidBurn")
                .global(GS_BURNED, Occurrences::Once)
                .closes(OS_AMOUNT, Occurrences::OnceOrMore)
                .assigns(OS_AMOUNT, Occurrences::NoneOrMore)
                .predicate(Predicate::all([
                    Predicate::lt_eq(1u64, Expr::var("op.burned.sum")),
                    Predicate::eq(
                        Expr::add(Expr::var("op.burned.sum"), Expr::var("out.balance.sum")),
                        Expr::var("in.balance.sum"),
                    ),
                ])),
            TS_RENOMINATE => OperationSchema::new("renominate", "renominationDenied")
                .global(GS_NAME, Occurrences::NoneOrOnce)
                .global(GS_TICKER, Occurrences::NoneOrOnce)
                .global(GS_PRECISION, Occurrences::NoneOrOnce)
                .closes(OS_RENOMINATION, Occurrences::Once)
                .assigns(OS_RENOMINATION, Occurrences::NoneOrOnce),
        },
        max_supply: Some(max_supply),
        aggregators: bmap! {
            "knownIssued".into() => Aggregator::SumV(GS_ISSUED),
            "totalIssued".into() => Aggregator::Total(GS_ISSUED, OS_INFLATION),
            "knownBurned".into() => Aggregator::SumV(GS_BURNED),
            "circulating".into() => Aggregator::diff(
                Aggregator::Total(GS_ISSUED, OS_INFLATION),
                Aggregator::SumV(GS_BURNED),
            ),
        },
    }
}
