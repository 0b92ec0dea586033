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

//! Validation engine for client-side-validated asset contracts.
//!
//! The engine takes pre-parsed contract schemata (interface shapes like RGB20
//! fungible or RGB21 non-fungible assets) and a feed of decoded operations,
//! verifies each operation against the schema structural rules and arithmetic
//! predicates, tracks owned right tokens through the operation graph under a
//! single-spend invariant, and answers aggregate queries (total issued, total
//! burned, circulating) which are tri-state: a definite value, or `Unknown`
//! whenever the known subset of the contract history cannot prove the total.
//!
//! Schema source parsing, commitment anchoring, wire encodings and the
//! low-level VM bytecode substrate are external collaborators and are not part
//! of this crate.

#![allow(unused_braces)] // Rust compiler can't properly parse derivation macros
#![deny(
    non_upper_case_globals,
    non_camel_case_types,
    non_snake_case,
    unused_mut,
    unused_imports,
    dead_code
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

#[macro_use]
extern crate amplify;

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;

#[macro_export]
macro_rules! impl_serde_baid64 {
    ($ty:ty) => {
        #[cfg(feature = "serde")]
        const _: () = {
            use std::str::FromStr;

            use amplify::ByteArray;
            use serde::de::Error;
            use serde::{Deserialize, Deserializer, Serialize, Serializer};

            impl Serialize for $ty {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where S: Serializer {
                    if serializer.is_human_readable() {
                        self.to_string().serialize(serializer)
                    } else {
                        self.to_byte_array().serialize(serializer)
                    }
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where D: Deserializer<'de> {
                    if deserializer.is_human_readable() {
                        let s = String::deserialize(deserializer)?;
                        Self::from_str(&s).map_err(D::Error::custom)
                    } else {
                        let bytes = <[u8; 32]>::deserialize(deserializer)?;
                        Ok(Self::from_byte_array(bytes))
                    }
                }
            }
        };
    };
}

mod contract;
pub mod schema;
pub mod validation;
pub mod vm;
mod registry;
mod state;
mod graph;
mod aggregate;
pub mod ifaces;

pub mod prelude {
    pub use aggregate::*;
    pub use contract::*;
    pub use graph::*;
    pub use registry::*;
    pub use schema::*;
    pub use state::*;

    use super::*;
    pub use super::{ifaces, schema, validation, vm};
}

pub use prelude::*;
