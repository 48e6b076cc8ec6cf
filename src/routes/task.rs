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

use crate::database::definitions::task::{EditTask, Task, WriteTask};
use crate::prelude::*;
use aide::axum::routing::{delete_with, get_with, patch_with, post_with};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/", post_with(create_task, create_task_docs))
        .api_route("/", get_with(get_task_page, get_task_page_docs))
        .api_route("/:id", get_with(get_task, get_task_docs))
        .api_route("/:id", patch_with(update_task, update_task_docs))
        .api_route("/:id", delete_with(delete_task, delete_task_docs))
        .with_state(state)
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
pub struct CreateTaskRequest {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    assignee: Option<String>,
    /// record id of the actor working the task
    #[serde(default)]
    actor: Option<String>,
    /// record id of the activity the task belongs to
    #[serde(default)]
    activity: Option<String>,
    #[serde(default)]
    time_taken: Option<f64>,
    #[serde(default)]
    actual_date: Option<NaiveDate>,
    #[serde(default)]
    due_date: Option<NaiveDate>,
}

/// The activity and actor links are absent on purpose, a task stays where it
/// was created.
#[derive(Deserialize, JsonSchema, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    assignee: Option<String>,
    #[serde(default)]
    time_taken: Option<f64>,
    #[serde(default)]
    actual_date: Option<NaiveDate>,
    #[serde(default)]
    due_date: Option<NaiveDate>,
}

async fn create_task(
    State(state): State<ApplicationState>,
    Json(data): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>)> {
    let actor = data
        .actor
        .as_deref()
        .map(|id| Id::try_from(("actor", id)))
        .transpose()?
        .map(Relation::ForeignKey);
    let activity = data
        .activity
        .as_deref()
        .map(|id| Id::try_from(("activity", id)))
        .transpose()?
        .map(Relation::ForeignKey);

    let task = WriteTask::from(state.connection())
        .set_title(Some(data.title.as_str()))
        .set_description(data.description.as_deref())
        .set_status(data.status.as_deref())
        .set_priority(data.priority.as_deref())
        .set_assignee(data.assignee.as_deref())
        .set_actor(actor)
        .set_activity(activity)
        .set_time_taken(data.time_taken)
        .set_actual_date(data.actual_date)
        .set_due_date(data.due_date)
        .to_owned()
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

fn create_task_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Create a new task. Without a status it starts as pending.")
        .summary("Create a new task")
        .response::<201, Json<Task>>()
}

async fn get_task_page(
    State(state): State<ApplicationState>,
    Query(data): Query<PagingOptions>,
) -> Result<Json<Page<Task>>> {
    let page = data
        .execute::<(&str, &str), Task>("SELECT * FROM task %%%", &[], state.connection())
        .await?;

    Ok(Json(page))
}

fn get_task_page_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Obtain a page of tasks")
        .summary("Obtain a page of tasks")
        .response::<200, Json<Page<Task>>>()
}

async fn get_task(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
) -> Result<Json<Task>> {
    let id = Id::try_from(("task", id.as_str()))?;
    let task: Option<Task> = sql_span!(state.connection().select(&id).await?);

    task.map(Json).ok_or(ApplicationError::NotFound("task"))
}

fn get_task_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Obtain a single task by its id")
        .summary("Obtain a task")
        .response::<200, Json<Task>>()
}

async fn update_task(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
    Json(data): Json<UpdateTaskRequest>,
) -> Result<Json<Task>> {
    let id = Id::try_from(("task", id.as_str()))?;
    let target: Option<Task> = sql_span!(state.connection().select(&id).await?);
    let target = target.ok_or(ApplicationError::NotFound("task"))?;

    let task = EditTask::new(&target, state.connection())
        .set_title(data.title.as_deref())
        .set_description(data.description.as_deref())
        .set_status(data.status.as_deref())
        .set_priority(data.priority.as_deref())
        .set_assignee(data.assignee.as_deref())
        .set_time_taken(data.time_taken)
        .set_actual_date(data.actual_date)
        .set_due_date(data.due_date)
        .to_owned()
        .await?;

    Ok(Json(task))
}

fn update_task_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description(
            "Partially update a task. The activity and actor links cannot be changed here.",
        )
        .summary("Update a task")
        .response::<200, Json<Task>>()
}

async fn delete_task(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = Id::try_from(("task", id.as_str()))?;
    let deleted: Option<Task> = sql_span!(state.connection().delete(&id).await?);

    deleted
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ApplicationError::NotFound("task"))
}

fn delete_task_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Delete a task by its id")
        .summary("Delete a task")
        .response::<204, ()>()
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::task::Task;
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_create_defaults_to_pending() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/tasks")
            .json(&json!({"title": "march run"}))
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());
        let task = response.json::<Task>().await;
        assert_eq!("pending", task.status());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_rejects_link_changes() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/tasks")
            .json(&json!({"title": "march run"}))
            .send()
            .await;
        let task = response.json::<Task>().await;

        let response = suite
            .client()
            .patch(format!("/tasks/{}", task.id()).as_str())
            .json(&json!({"activity": "activity:other"}))
            .send()
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        let response = suite
            .client()
            .patch(format!("/tasks/{}", task.id()).as_str())
            .json(&json!({"status": "completed", "time_taken": 4.5}))
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        let updated = response.json::<Task>().await;
        assert_eq!("completed", updated.status());
        assert_eq!(Some(4.5), *updated.time_taken());

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_task_is_not_found() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .patch("/tasks/task:missing")
            .json(&json!({"status": "completed"}))
            .send()
            .await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());

        let response = suite.client().delete("/tasks/task:missing").send().await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());

        Ok(())
    }
}
