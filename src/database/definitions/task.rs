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
use crate::prelude::*;
use chrono::{DateTime, NaiveDate, Utc};
use std::future::{Future, IntoFuture};
use std::pin::Pin;

/// Tasks with this status enter the report pipeline.
pub const STATUS_COMPLETED: &str = "completed";

/// One concrete occurrence of an [`Activity`], optionally completed with an
/// actual duration (`time_taken`, fractional hours).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema, Getters)]
#[get = "pub"]
pub struct Task {
    id: Id,
    title: String,
    #[serde(default)]
    description: Option<String>,
    status: String,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    assignee: Option<String>,
    #[serde(default)]
    actor: Option<Relation<Actor>>,
    #[serde(default)]
    activity: Option<Relation<Activity>>,
    #[serde(default)]
    time_taken: Option<f64>,
    #[serde(default)]
    actual_date: Option<NaiveDate>,
    #[serde(default)]
    due_date: Option<NaiveDate>,
    updated_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Getters, Setters)]
pub struct WriteTask<'a> {
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    actor: Option<Relation<Actor>>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    activity: Option<Relation<Activity>>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    time_taken: Option<f64>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    actual_date: Option<NaiveDate>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<NaiveDate>,
    #[serde(skip)]
    connection: &'a DatabaseConnection,
}

impl<'a> From<&'a DatabaseConnection> for WriteTask<'a> {
    fn from(connection: &'a DatabaseConnection) -> Self {
        Self {
            title: None,
            description: None,
            status: None,
            priority: None,
            assignee: None,
            actor: None,
            activity: None,
            time_taken: None,
            actual_date: None,
            due_date: None,
            connection,
        }
    }
}

impl<'a> IntoFuture for WriteTask<'a> {
    type Output = Result<Task>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    #[instrument(skip_all)]
    fn into_future(mut self) -> Self::IntoFuture {
        Box::pin(async move {
            if self.status.is_none() {
                self.status = Some("pending");
            }

            let mut created: Vec<Task> =
                sql_span!(self.connection.create("task").content(&self).await?);

            created.pop().ok_or(ApplicationError::InternalServerError)
        })
    }
}

/// Partial update limited to the fields below. The activity and actor links
/// are deliberately not editable, a task never moves to another activity.
#[derive(Clone, Debug, Serialize, Getters, Setters)]
pub struct EditTask<'a> {
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    time_taken: Option<f64>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    actual_date: Option<NaiveDate>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<NaiveDate>,
    #[serde(skip)]
    connection: &'a DatabaseConnection,
    #[serde(skip)]
    target: &'a Task,
}

impl<'a> EditTask<'a> {
    pub fn new(target: &'a Task, connection: &'a DatabaseConnection) -> Self {
        Self {
            title: None,
            description: None,
            status: None,
            priority: None,
            assignee: None,
            time_taken: None,
            actual_date: None,
            due_date: None,
            connection,
            target,
        }
    }
}

impl<'a> IntoFuture for EditTask<'a> {
    type Output = Result<Task>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    #[instrument(skip_all)]
    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            sql_span!(self
                .connection
                .update(self.target.id().to_thing())
                .merge(&self)
                .await?)
            .ok_or(ApplicationError::NotFound("task"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{EditTask, WriteTask};
    use crate::database::definitions::activity::WriteActivity;
    use crate::prelude::Relation;
    use axum::BoxError;

    #[tokio::test]
    async fn test_write_and_edit() -> Result<(), BoxError> {
        let connection = crate::database::connect(None).await?.connection;

        let activity = WriteActivity::from(&connection)
            .set_name(Some("monthly reconciliation"))
            .set_standard_time(Some(10.0))
            .to_owned()
            .await?;

        let task = WriteTask::from(&connection)
            .set_title(Some("march run"))
            .set_activity(Some(Relation::ForeignKey(activity.id().clone())))
            .to_owned()
            .await?;
        assert_eq!("pending", task.status());

        let edited = EditTask::new(&task, &connection)
            .set_status(Some("completed"))
            .set_time_taken(Some(8.0))
            .to_owned()
            .await?;
        assert_eq!("completed", edited.status());
        assert_eq!(Some(8.0), *edited.time_taken());
        // the link survives a partial update untouched
        assert_eq!(task.activity(), edited.activity());

        Ok(())
    }
}
