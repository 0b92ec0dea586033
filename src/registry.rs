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

//! In-memory registry of known contract schemata.

use std::collections::BTreeMap;

use crate::schema::{Schema, SchemaId, SchemaInconsistency};

/// Errors of schema registration.
#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
#[display(doc_comments)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum RegistryError {
    /// schema {0} is internally inconsistent: {1:?}.
    Inconsistent(SchemaId, Vec<SchemaInconsistency>),
}

/// schema {0} is not known to the registry.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct UnknownSchema(pub SchemaId);

/// Registry keeping all schemata a validation engine may validate contracts
/// against.
///
/// Schemata are content-addressed: the id commits to every declaration, so a
/// re-registration of equal content is a no-op and two different schemata can
/// never share an id.
#[derive(Clone, Default, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct SchemaRegistry {
    schemata: BTreeMap<SchemaId, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self { SchemaRegistry::default() }

    /// Verifies the schema and adds it to the registry, returning its id.
    /// Registering an already known schema is idempotent.
    pub fn register(&mut self, schema: Schema) -> Result<SchemaId, RegistryError> {
        let schema_id = schema.schema_id();
        if self.schemata.contains_key(&schema_id) {
            return Ok(schema_id);
        }
        let report = schema.verify();
        if !report.is_empty() {
            return Err(RegistryError::Inconsistent(schema_id, report));
        }
        self.schemata.insert(schema_id, schema);
        Ok(schema_id)
    }

    pub fn lookup(&self, schema_id: SchemaId) -> Result<&Schema, UnknownSchema> {
        self.schemata.get(&schema_id).ok_or(UnknownSchema(schema_id))
    }

    pub fn is_known(&self, schema_id: SchemaId) -> bool {
        self.schemata.contains_key(&schema_id)
    }

    pub fn schema_ids(&self) -> impl Iterator<Item = SchemaId> + '_ {
        self.schemata.keys().copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ifaces;

    #[test]
    fn registration_is_idempotent() {
        let mut registry = SchemaRegistry::new();
        let schema = ifaces::rgb20::non_inflatable();
        let id1 = registry.register(schema.clone()).unwrap();
        let id2 = registry.register(schema).unwrap();
        assert_eq!(id1, id2);
        assert_eq!(registry.schema_ids().count(), 1);
    }

    #[test]
    fn inconsistent_schema_rejected() {
        use crate::schema::{GlobalStateType, Occurrences};

        let mut schema = ifaces::rgb20::non_inflatable();
        schema.genesis = schema
            .genesis
            .global(GlobalStateType::with(0xFF), Occurrences::Once);
        let mut registry = SchemaRegistry::new();
        assert!(matches!(
            registry.register(schema),
            Err(RegistryError::Inconsistent(_, _))
        ));
    }
}
