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
use chrono::{DateTime, Utc};
use std::future::{Future, IntoFuture};
use std::pin::Pin;

// stored in the `actor_group` table, `group` is reserved in surrealql
pub const GROUP_TABLE: &str = "actor_group";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema, Getters)]
#[get = "pub"]
pub struct Group {
    id: Id,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    updated_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Getters, Setters)]
pub struct WriteGroup<'a> {
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    #[serde(skip)]
    connection: &'a DatabaseConnection,
    #[serde(skip)]
    #[set = "pub"]
    target: Option<&'a Group>,
}

impl<'a> From<&'a DatabaseConnection> for WriteGroup<'a> {
    fn from(connection: &'a DatabaseConnection) -> Self {
        Self {
            name: None,
            description: None,
            status: None,
            connection,
            target: None,
        }
    }
}

impl<'a> IntoFuture for WriteGroup<'a> {
    type Output = Result<Group>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    #[instrument(skip_all)]
    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let group: Group = if let Some(target) = self.target {
                sql_span!(self
                    .connection
                    .update(target.id().to_thing())
                    .merge(&self)
                    .await?)
                .ok_or(ApplicationError::NotFound("group"))?
            } else {
                let mut created: Vec<Group> =
                    sql_span!(self.connection.create(GROUP_TABLE).content(&self).await?);
                created.pop().ok_or(ApplicationError::InternalServerError)?
            };

            Ok(group)
        })
    }
}
