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

use crate::database::definitions::group::{Group, WriteGroup, GROUP_TABLE};
use crate::prelude::*;
use aide::axum::routing::{delete_with, get_with, post_with, put_with};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/", post_with(create_group, create_group_docs))
        .api_route("/", get_with(get_group_page, get_group_page_docs))
        .api_route("/:id", get_with(get_group, get_group_docs))
        .api_route("/:id", put_with(update_group, update_group_docs))
        .api_route("/:id", delete_with(delete_group, delete_group_docs))
        .with_state(state)
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
pub struct CreateGroupRequest {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct UpdateGroupRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

async fn create_group(
    State(state): State<ApplicationState>,
    Json(data): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>)> {
    let group = WriteGroup::from(state.connection())
        .set_name(Some(data.name.as_str()))
        .set_description(data.description.as_deref())
        .set_status(data.status.as_deref())
        .to_owned()
        .await?;

    Ok((StatusCode::CREATED, Json(group)))
}

fn create_group_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Create a new group. Name is required.")
        .summary("Create a new group")
        .response::<201, Json<Group>>()
}

async fn get_group_page(
    State(state): State<ApplicationState>,
    Query(data): Query<PagingOptions>,
) -> Result<Json<Page<Group>>> {
    let page = data
        .execute::<(&str, &str), Group>(
            "SELECT * FROM type::table($table) %%%",
            &[("table", GROUP_TABLE)],
            state.connection(),
        )
        .await?;

    Ok(Json(page))
}

fn get_group_page_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Obtain a page of groups")
        .summary("Obtain a page of groups")
        .response::<200, Json<Page<Group>>>()
}

async fn get_group(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
) -> Result<Json<Group>> {
    let id = Id::try_from((GROUP_TABLE, id.as_str()))?;
    let group: Option<Group> = sql_span!(state.connection().select(&id).await?);

    group.map(Json).ok_or(ApplicationError::NotFound("group"))
}

fn get_group_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Obtain a single group by its id")
        .summary("Obtain a group")
        .response::<200, Json<Group>>()
}

async fn update_group(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
    Json(data): Json<UpdateGroupRequest>,
) -> Result<Json<Group>> {
    let id = Id::try_from((GROUP_TABLE, id.as_str()))?;
    let target: Option<Group> = sql_span!(state.connection().select(&id).await?);
    let target = target.ok_or(ApplicationError::NotFound("group"))?;

    let group = WriteGroup::from(state.connection())
        .set_target(Some(&target))
        .set_name(data.name.as_deref())
        .set_description(data.description.as_deref())
        .set_status(data.status.as_deref())
        .to_owned()
        .await?;

    Ok(Json(group))
}

fn update_group_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Update a group. Only the documented fields are applied.")
        .summary("Update a group")
        .response::<200, Json<Group>>()
}

async fn delete_group(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = Id::try_from((GROUP_TABLE, id.as_str()))?;
    let deleted: Option<Group> = sql_span!(state.connection().delete(&id).await?);

    deleted
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ApplicationError::NotFound("group"))
}

fn delete_group_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Delete a group by its id")
        .summary("Delete a group")
        .response::<204, ()>()
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::group::Group;
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_crud_roundtrip() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/groups")
            .json(&json!({"name": "field ops"}))
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());
        let group = response.json::<Group>().await;

        let response = suite
            .client()
            .put(format!("/groups/{}", group.id()).as_str())
            .json(&json!({"description": "on-site staff"}))
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        let updated = response.json::<Group>().await;
        assert_eq!(Some("on-site staff"), updated.description().as_deref());

        let response = suite
            .client()
            .delete(format!("/groups/{}", group.id()).as_str())
            .send()
            .await;
        assert_eq!(StatusCode::NO_CONTENT, response.status());

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_group_is_not_found() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .get("/groups/actor_group:missing")
            .send()
            .await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());

        Ok(())
    }
}
