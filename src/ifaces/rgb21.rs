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

//! RGB21 non-fungible token schemata.

use super::*;
use crate::schema::{
    Aggregator, Expr, FieldKind, GlobalStateSchema, Occurrences, OperationSchema,
    OwnedStateSchema, Predicate, Schema, StateKind,
};

fn metadata() -> [(GlobalStateType, GlobalStateSchema); 3] {
    [
        (GS_NAME, GlobalStateSchema::once("name", FieldKind::Text)),
        (GS_DETAILS, GlobalStateSchema::once("details", FieldKind::Text)),
        (GS_MEDIA, GlobalStateSchema::once("media", FieldKind::Bytes)),
    ]
}

fn transfer() -> OperationSchema {
    OperationSchema::new("transfer", "inflation")
        .closes(OS_FRACTION, Occurrences::OnceOrMore)
        .assigns(OS_FRACTION, Occurrences::OnceOrMore)
        // Conservation is checked token by token: units may not migrate
        // between token indices, which would mint a token never issued.
        .predicate(Predicate::tokens_conserved("token"))
}

/// Unique digital asset: a single indivisible token.
///
/// Genesis mints exactly one fraction unit, so the token can change hands but
/// never split.
pub fn unique() -> Schema {
    let mut global_types = bmap! {};
    global_types.extend(metadata());

    Schema {
        name: "RGB21-UDA".into(),
        global_types,
        owned_types: bmap! {
            OS_FRACTION => OwnedStateSchema::with("token", StateKind::Allocation),
        },
        genesis: OperationSchema::new("issue", "incompleteFractions")
            .global(GS_NAME, Occurrences::Once)
            .global(GS_DETAILS, Occurrences::NoneOrOnce)
            .global(GS_MEDIA, Occurrences::NoneOrOnce)
            .assigns(OS_FRACTION, Occurrences::Once)
            .predicate(Predicate::tokens_complete("token", 1u64)),
        transitions: bmap! {
            TS_TRANSFER => transfer(),
        },
        max_supply: None,
        aggregators: bmap! {},
    }
}

/// Fractionalizable token collection.
///
/// The genesis declares how many fraction units make up a whole token; absent
/// the declaration a token is indivisible (a whole of one unit). Genesis must
/// mint complete tokens: for each minted token index the units must add up
/// exactly to the declared whole.
pub fn fractional() -> Schema {
    let mut global_types = bmap! {};
    global_types.extend(metadata());
    global_types.insert(
        GS_FRACTIONS,
        GlobalStateSchema::once("fractions", FieldKind::Num),
    );

    Schema {
        name: "RGB21-FAC".into(),
        global_types,
        owned_types: bmap! {
            OS_FRACTION => OwnedStateSchema::with("token", StateKind::Allocation),
        },
        genesis: OperationSchema::new("issue", "incompleteFractions")
            .global(GS_NAME, Occurrences::Once)
            .global(GS_DETAILS, Occurrences::NoneOrOnce)
            .global(GS_MEDIA, Occurrences::NoneOrOnce)
            .global(GS_FRACTIONS, Occurrences::NoneOrOnce)
            .assigns(OS_FRACTION, Occurrences::OnceOrMore)
            .predicate(Predicate::any_of([
                Predicate::all([
                    Predicate::eq(Expr::var("op.fractions.count"), 0u64),
                    Predicate::tokens_complete("token", 1u64),
                ]),
                Predicate::all([
                    Predicate::eq(Expr::var("op.fractions.count"), 1u64),
                    Predicate::tokens_complete("token", Expr::var("op.fractions.sum")),
                ]),
            ])),
        transitions: bmap! {
            TS_TRANSFER => transfer(),
        },
        max_supply: None,
        aggregators: bmap! {
            "issuedFractions".into() => Aggregator::SumV(GS_FRACTIONS),
        },
    }
}
