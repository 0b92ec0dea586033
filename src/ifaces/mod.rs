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

//! Standard interface schemata for asset contracts: RGB20 fungible assets,
//! RGB21 non-fungible tokens and RGB25 collectible fungible assets.
//!
//! All interfaces share a single numbering of state and transition types, so
//! that wallets can interpret state of any contract built from this module
//! without consulting the schema.

pub mod rgb20;
pub mod rgb21;
pub mod rgb25;

use crate::schema::{GlobalStateType, OwnedStateType, TransitionType};

/// Asset name.
pub const GS_NAME: GlobalStateType = GlobalStateType::with(0x00);
/// Asset ticker.
pub const GS_TICKER: GlobalStateType = GlobalStateType::with(0x01);
/// Decimal precision of asset amounts.
pub const GS_PRECISION: GlobalStateType = GlobalStateType::with(0x02);
/// Amount issued by a single genesis or inflation operation.
pub const GS_ISSUED: GlobalStateType = GlobalStateType::with(0x03);
/// Amount destroyed by a single burn operation.
pub const GS_BURNED: GlobalStateType = GlobalStateType::with(0x04);
/// Free-form asset details.
pub const GS_DETAILS: GlobalStateType = GlobalStateType::with(0x05);
/// Number of fraction units a complete token consists of.
pub const GS_FRACTIONS: GlobalStateType = GlobalStateType::with(0x06);
/// Token media digest.
pub const GS_MEDIA: GlobalStateType = GlobalStateType::with(0x07);

/// Fungible balance.
pub const OS_AMOUNT: OwnedStateType = OwnedStateType::with(0x00);
/// Right to renominate the asset.
pub const OS_RENOMINATION: OwnedStateType = OwnedStateType::with(0x01);
/// Right to issue additional amounts.
pub const OS_INFLATION: OwnedStateType = OwnedStateType::with(0xA0);
/// Fraction units of a non-fungible token.
pub const OS_FRACTION: OwnedStateType = OwnedStateType::with(0xA1);

/// Value-conserving transfer.
pub const TS_TRANSFER: TransitionType = TransitionType::with(0x00);
/// Change of asset nomination.
pub const TS_RENOMINATE: TransitionType = TransitionType::with(0x1010);
/// Secondary issue.
pub const TS_INFLATE: TransitionType = TransitionType::with(0x10A0);
/// Irreversible destruction of asset amount.
pub const TS_BURN: TransitionType = TransitionType::with(0x10A2);
