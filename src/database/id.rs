/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use crate::error::ApplicationError;
use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use surrealdb::opt::{IntoResource, Resource};
use surrealdb::sql::Thing;

/// A record pointer in `table:key` form.
#[derive(Debug, Clone, PartialEq)]
pub struct Id {
    pub table: String,
    pub key: String,
}

impl From<Thing> for Id {
    fn from(thing: Thing) -> Self {
        Self {
            table: thing.tb,
            key: thing.id.to_string(),
        }
    }
}

impl TryFrom<(&str, &str)> for Id {
    type Error = ApplicationError;

    fn try_from((force, id): (&str, &str)) -> Result<Self, Self::Error> {
        let mut split = id.split(':');
        let table = split
            .next()
            .ok_or(ApplicationError::BadRequest("invalid id".to_owned()))?;
        // ids taken from a path must stay within the table the route serves
        if !table.eq(force) {
            return Err(ApplicationError::BadRequest("invalid id".to_owned()));
        }

        let key = split
            .next()
            .ok_or(ApplicationError::BadRequest("invalid id".to_owned()))?;

        Ok(Self {
            table: table.to_string(),
            key: key.to_string(),
        })
    }
}

impl Id {
    pub fn new((table, key): (&str, &str)) -> Self {
        Self {
            table: table.to_string(),
            key: key.to_string(),
        }
    }

    pub fn to_thing(&self) -> Thing {
        Thing::from((self.table.as_str(), self.key.as_str()))
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw_value = serde_json::value::Value::deserialize(deserializer)?;

        if let Some(string) = raw_value.as_str() {
            let mut split = string.split(':');
            let table = split
                .next()
                .ok_or(serde::de::Error::custom("Invalid id format"))?
                .to_string();
            let key = split
                .next()
                .ok_or(serde::de::Error::custom("Invalid id format"))?
                .to_string();

            return Ok(Self { table, key });
        }

        if raw_value.is_object() {
            let thing = serde_json::from_value::<Thing>(raw_value)
                .map_err(|_| serde::de::Error::custom("Invalid record id"))?;
            return Ok(Self {
                table: thing.tb,
                key: thing.id.to_string(),
            });
        }

        Err(serde::de::Error::custom("Invalid datatype"))
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", &self.table, &self.key)
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

impl JsonSchema for Id {
    fn schema_name() -> String {
        "Id".to_owned()
    }

    fn json_schema(_: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            format: Some("string".to_string()),
            ..Default::default()
        }
        .into()
    }
}

impl<R> IntoResource<Option<R>> for &Id {
    fn into_resource(self) -> surrealdb::Result<Resource> {
        Ok(Resource::RecordId(self.to_thing()))
    }
}

#[cfg(test)]
mod tests {
    use super::Id;

    #[test]
    fn test_path_id_requires_matching_table() {
        assert!(Id::try_from(("task", "task:abc")).is_ok());
        assert!(Id::try_from(("task", "actor:abc")).is_err());
        assert!(Id::try_from(("task", "abc")).is_err());
    }

    #[test]
    fn test_string_form() {
        let id = Id::new(("activity", "xyz"));
        assert_eq!("activity:xyz", id.to_string());

        let parsed: Id = serde_json::from_str("\"activity:xyz\"").unwrap();
        assert_eq!(id, parsed);
    }
}
