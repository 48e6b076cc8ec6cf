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

use crate::database::definitions::actor::ActorRole;
use crate::prelude::*;
use chrono::{DateTime, NaiveDate, Utc};
use std::future::{Future, IntoFuture};
use std::pin::Pin;

/// A recurring task template. `standard_time` (fractional hours) is the
/// baseline every completed task under the activity is timed against.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema, Getters)]
#[get = "pub"]
pub struct Activity {
    id: Id,
    name: String,
    standard_time: f64,
    #[serde(default)]
    criticality: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    role: Option<ActorRole>,
    #[serde(default)]
    frequency: Option<String>,
    #[serde(default)]
    due_by: Option<NaiveDate>,
    #[serde(default)]
    activity_type: Option<String>,
    updated_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Getters, Setters)]
pub struct WriteActivity<'a> {
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    standard_time: Option<f64>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    criticality: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<ActorRole>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    due_by: Option<NaiveDate>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    activity_type: Option<&'a str>,
    #[serde(skip)]
    connection: &'a DatabaseConnection,
    #[serde(skip)]
    #[set = "pub"]
    target: Option<&'a Activity>,
}

impl<'a> From<&'a DatabaseConnection> for WriteActivity<'a> {
    fn from(connection: &'a DatabaseConnection) -> Self {
        Self {
            name: None,
            standard_time: None,
            criticality: None,
            duration: None,
            role: None,
            frequency: None,
            due_by: None,
            activity_type: None,
            connection,
            target: None,
        }
    }
}

impl<'a> IntoFuture for WriteActivity<'a> {
    type Output = Result<Activity>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    #[instrument(skip_all)]
    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let activity: Activity = if let Some(target) = self.target {
                sql_span!(self
                    .connection
                    .update(target.id().to_thing())
                    .merge(&self)
                    .await?)
                .ok_or(ApplicationError::NotFound("activity"))?
            } else {
                let mut created: Vec<Activity> =
                    sql_span!(self.connection.create("activity").content(&self).await?);
                created.pop().ok_or(ApplicationError::InternalServerError)?
            };

            Ok(activity)
        })
    }
}
