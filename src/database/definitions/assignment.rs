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

use crate::database::definitions::activity::Activity;
use crate::database::definitions::actor::Actor;
use crate::database::definitions::customer::Customer;
use crate::prelude::*;
use chrono::{DateTime, Utc};
use std::future::{Future, IntoFuture};
use std::pin::Pin;

/// Links an activity to the actor working it and the customer it is worked
/// for. Nothing constrains how often the same triple may appear.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema, Getters)]
#[get = "pub"]
pub struct ActivityAssignment {
    id: Id,
    activity: Relation<Activity>,
    actor: Relation<Actor>,
    customer: Relation<Customer>,
    assigned_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Getters, Setters)]
pub struct WriteAssignment<'a> {
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    activity: Option<Relation<Activity>>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    actor: Option<Relation<Actor>>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    customer: Option<Relation<Customer>>,
    #[serde(skip)]
    connection: &'a DatabaseConnection,
}

impl<'a> From<&'a DatabaseConnection> for WriteAssignment<'a> {
    fn from(connection: &'a DatabaseConnection) -> Self {
        Self {
            activity: None,
            actor: None,
            customer: None,
            connection,
        }
    }
}

impl<'a> IntoFuture for WriteAssignment<'a> {
    type Output = Result<ActivityAssignment>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    #[instrument(skip_all)]
    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let mut created: Vec<ActivityAssignment> =
                sql_span!(self.connection.create("assignment").content(&self).await?);

            created.pop().ok_or(ApplicationError::InternalServerError)
        })
    }
}
