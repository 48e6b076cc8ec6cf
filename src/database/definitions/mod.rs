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

use crate::prelude::*;

pub mod activity;
pub mod actor;
pub mod assignment;
pub mod customer;
pub mod group;
pub mod message;
pub mod report;
pub mod task;

/// A link to another record. Plain queries return the bare id, queries
/// resolving the link return the full record.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum Relation<T> {
    ForeignKey(Id),
    Fetched(Box<T>),
}

impl<T> Relation<T> {
    pub fn foreign_key(&self) -> Option<&Id> {
        match self {
            Relation::ForeignKey(id) => Some(id),
            Relation::Fetched(_) => None,
        }
    }

    pub fn fetched(&self) -> Option<&T> {
        match self {
            Relation::ForeignKey(_) => None,
            Relation::Fetched(inner) => Some(inner),
        }
    }
}
