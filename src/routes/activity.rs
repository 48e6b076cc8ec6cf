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

use crate::database::definitions::activity::{Activity, WriteActivity};
use crate::database::definitions::actor::ActorRole;
use crate::prelude::*;
use aide::axum::routing::{delete_with, get_with, post_with, put_with};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/", post_with(create_activity, create_activity_docs))
        .api_route("/", get_with(get_activity_page, get_activity_page_docs))
        .api_route("/:id", get_with(get_activity, get_activity_docs))
        .api_route("/:id", put_with(update_activity, update_activity_docs))
        .api_route("/:id", delete_with(delete_activity, delete_activity_docs))
        .with_state(state)
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
pub struct CreateActivityRequest {
    name: String,
    /// baseline in fractional hours, compared against `time_taken` of
    /// completed tasks
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
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct UpdateActivityRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    standard_time: Option<f64>,
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
}

async fn create_activity(
    State(state): State<ApplicationState>,
    Json(data): Json<CreateActivityRequest>,
) -> Result<(StatusCode, Json<Activity>)> {
    let activity = WriteActivity::from(state.connection())
        .set_name(Some(data.name.as_str()))
        .set_standard_time(Some(data.standard_time))
        .set_criticality(data.criticality.as_deref())
        .set_duration(data.duration)
        .set_role(data.role)
        .set_frequency(data.frequency.as_deref())
        .set_due_by(data.due_by)
        .set_activity_type(data.activity_type.as_deref())
        .to_owned()
        .await?;

    Ok((StatusCode::CREATED, Json(activity)))
}

fn create_activity_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Create a new activity. Name and standard time are required.")
        .summary("Create a new activity")
        .response::<201, Json<Activity>>()
}

async fn get_activity_page(
    State(state): State<ApplicationState>,
    Query(data): Query<PagingOptions>,
) -> Result<Json<Page<Activity>>> {
    let page = data
        .execute::<(&str, &str), Activity>("SELECT * FROM activity %%%", &[], state.connection())
        .await?;

    Ok(Json(page))
}

fn get_activity_page_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Obtain a page of activities")
        .summary("Obtain a page of activities")
        .response::<200, Json<Page<Activity>>>()
}

async fn get_activity(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
) -> Result<Json<Activity>> {
    let id = Id::try_from(("activity", id.as_str()))?;
    let activity: Option<Activity> = sql_span!(state.connection().select(&id).await?);

    activity
        .map(Json)
        .ok_or(ApplicationError::NotFound("activity"))
}

fn get_activity_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Obtain a single activity by its id")
        .summary("Obtain an activity")
        .response::<200, Json<Activity>>()
}

async fn update_activity(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
    Json(data): Json<UpdateActivityRequest>,
) -> Result<Json<Activity>> {
    let id = Id::try_from(("activity", id.as_str()))?;
    let target: Option<Activity> = sql_span!(state.connection().select(&id).await?);
    let target = target.ok_or(ApplicationError::NotFound("activity"))?;

    let activity = WriteActivity::from(state.connection())
        .set_target(Some(&target))
        .set_name(data.name.as_deref())
        .set_standard_time(data.standard_time)
        .set_criticality(data.criticality.as_deref())
        .set_duration(data.duration)
        .set_role(data.role)
        .set_frequency(data.frequency.as_deref())
        .set_due_by(data.due_by)
        .set_activity_type(data.activity_type.as_deref())
        .to_owned()
        .await?;

    Ok(Json(activity))
}

fn update_activity_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Update an activity. Only the documented fields are applied.")
        .summary("Update an activity")
        .response::<200, Json<Activity>>()
}

async fn delete_activity(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = Id::try_from(("activity", id.as_str()))?;
    let deleted: Option<Activity> = sql_span!(state.connection().delete(&id).await?);

    deleted
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ApplicationError::NotFound("activity"))
}

fn delete_activity_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Delete an activity by its id")
        .summary("Delete an activity")
        .response::<204, ()>()
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::activity::Activity;
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_create_requires_standard_time() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/activities")
            .json(&json!({"name": "monthly reconciliation"}))
            .send()
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        let response = suite
            .client()
            .post("/activities")
            .json(&json!({"name": "monthly reconciliation", "standard_time": 10.0}))
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_keeps_unmentioned_fields() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/activities")
            .json(&json!({
                "name": "monthly reconciliation",
                "standard_time": 10.0,
                "criticality": "high"
            }))
            .send()
            .await;
        let activity = response.json::<Activity>().await;

        let response = suite
            .client()
            .put(format!("/activities/{}", activity.id()).as_str())
            .json(&json!({"standard_time": 12.5}))
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        let updated = response.json::<Activity>().await;
        assert_eq!(12.5, *updated.standard_time());
        assert_eq!(Some("high"), updated.criticality().as_deref());

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_activity_is_not_found() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .delete("/activities/activity:missing")
            .send()
            .await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());

        Ok(())
    }
}
