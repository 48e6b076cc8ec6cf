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

use crate::auth::middleware::require_session;
use crate::database::definitions::actor::{Actor, ActorRole, WriteActor};
use crate::database::definitions::group::GROUP_TABLE;
use crate::prelude::*;
use aide::axum::routing::{delete_with, get_with, post_with, put_with};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::Extension;
use chrono::NaiveDate;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/", post_with(create_actor, create_actor_docs))
        .api_route("/", get_with(get_actor_page, get_actor_page_docs))
        .api_route(
            "/profile",
            get_with(profile, profile_docs)
                .layer(from_fn_with_state(state.clone(), require_session)),
        )
        .api_route("/:id", get_with(get_actor, get_actor_docs))
        .api_route("/:id", put_with(update_actor, update_actor_docs))
        .api_route("/:id", delete_with(delete_actor, delete_actor_docs))
        .with_state(state)
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
pub struct CreateActorRequest {
    name: String,
    /// the login identity, unique
    mail: String,
    password: String,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    mobile: Option<String>,
    #[serde(default)]
    alt_mobile: Option<String>,
    #[serde(default)]
    role: Option<ActorRole>,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct UpdateActorRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    mobile: Option<String>,
    #[serde(default)]
    alt_mobile: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    role: Option<ActorRole>,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

async fn create_actor(
    State(state): State<ApplicationState>,
    Json(data): Json<CreateActorRequest>,
) -> Result<(StatusCode, Json<Actor>)> {
    let group = data
        .group
        .as_deref()
        .map(|id| Id::try_from((GROUP_TABLE, id)))
        .transpose()?
        .map(Relation::ForeignKey);

    let actor = WriteActor::from(state.connection())
        .set_name(Some(data.name.as_str()))
        .set_mail(Some(data.mail.as_str()))
        .set_password(Some(data.password.clone()))
        .set_gender(data.gender.as_deref())
        .set_date_of_birth(data.date_of_birth)
        .set_mobile(data.mobile.as_deref())
        .set_alt_mobile(data.alt_mobile.as_deref())
        .set_role(data.role)
        .set_group(group)
        .set_status(data.status.as_deref())
        .to_owned()
        .await
        .map_err(|error| match error {
            // the unique mail index answers with a database error
            ApplicationError::DatabaseError(inner)
                if inner.to_string().contains("actor_mail") =>
            {
                ApplicationError::Conflict("mail is already registered".to_owned())
            }
            other => other,
        })?;

    Ok((StatusCode::CREATED, Json(actor)))
}

fn create_actor_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Create a new actor. Name, mail and password are required.")
        .summary("Create a new actor")
        .response::<201, Json<Actor>>()
}

async fn get_actor_page(
    State(state): State<ApplicationState>,
    Query(data): Query<PagingOptions>,
) -> Result<Json<Page<Actor>>> {
    let page = data
        .execute::<(&str, &str), Actor>("SELECT * FROM actor %%%", &[], state.connection())
        .await?;

    Ok(Json(page))
}

fn get_actor_page_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Obtain a page of actors")
        .summary("Obtain a page of actors")
        .response::<200, Json<Page<Actor>>>()
}

async fn profile(Extension(actor): Extension<Actor>) -> Result<Json<Actor>> {
    Ok(Json(actor))
}

fn profile_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The actor behind the presented bearer token")
        .summary("Own profile")
        .response::<200, Json<Actor>>()
        .security_requirement("SessionToken")
}

async fn get_actor(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
) -> Result<Json<Actor>> {
    let id = Id::try_from(("actor", id.as_str()))?;
    let actor: Option<Actor> = sql_span!(state.connection().select(&id).await?);

    actor.map(Json).ok_or(ApplicationError::NotFound("actor"))
}

fn get_actor_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Obtain a single actor by its id")
        .summary("Obtain an actor")
        .response::<200, Json<Actor>>()
}

async fn update_actor(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
    Json(data): Json<UpdateActorRequest>,
) -> Result<Json<Actor>> {
    let id = Id::try_from(("actor", id.as_str()))?;
    let target: Option<Actor> = sql_span!(state.connection().select(&id).await?);
    let target = target.ok_or(ApplicationError::NotFound("actor"))?;

    let group = data
        .group
        .as_deref()
        .map(|id| Id::try_from((GROUP_TABLE, id)))
        .transpose()?
        .map(Relation::ForeignKey);

    let actor = WriteActor::from(state.connection())
        .set_target(Some(&target))
        .set_name(data.name.as_deref())
        .set_gender(data.gender.as_deref())
        .set_date_of_birth(data.date_of_birth)
        .set_mobile(data.mobile.as_deref())
        .set_alt_mobile(data.alt_mobile.as_deref())
        .set_password(data.password.clone())
        .set_role(data.role)
        .set_group(group)
        .set_status(data.status.as_deref())
        .to_owned()
        .await?;

    Ok(Json(actor))
}

fn update_actor_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Update an actor. Only the documented fields are applied.")
        .summary("Update an actor")
        .response::<200, Json<Actor>>()
}

async fn delete_actor(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = Id::try_from(("actor", id.as_str()))?;
    let deleted: Option<Actor> = sql_span!(state.connection().delete(&id).await?);

    deleted
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ApplicationError::NotFound("actor"))
}

fn delete_actor_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Delete an actor by its id")
        .summary("Delete an actor")
        .response::<204, ()>()
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::actor::Actor;
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_create() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/actors")
            .json(&json!({
                "name": "first last",
                "mail": "created@test.de",
                "password": "password",
                "mobile": "0123456789"
            }))
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());

        let actor = response.json::<Actor>().await;
        let fetched: Option<Actor> = suite.connection().select(actor.id()).await?;
        let fetched = fetched.expect("created actor is persisted");
        assert_eq!(actor.id(), fetched.id());
        assert_eq!("created@test.de", fetched.mail());
        // the stored hash is never the plain password
        assert_ne!("password", fetched.password());

        Ok(())
    }

    #[tokio::test]
    async fn test_responses_omit_password_hash() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let login = suite.authorize_default().await;

        let response = suite.client().get("/actors").send().await;
        assert_eq!(StatusCode::OK, response.status());
        let page = response.json::<serde_json::Value>().await;
        for actor in page["data"].as_array().expect("page data is an array") {
            assert!(actor.get("password").is_none());
        }

        let response = suite
            .client()
            .get(format!("/actors/{}", suite.actor().id()).as_str())
            .send()
            .await;
        let body = response.json::<serde_json::Value>().await;
        assert!(body.get("password").is_none());

        let response = suite
            .client()
            .get("/actors/profile")
            .header("Authorization", format!("Bearer {}", login.token))
            .send()
            .await;
        let body = response.json::<serde_json::Value>().await;
        assert!(body.get("password").is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_requires_fields() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        // no password
        let response = suite
            .client()
            .post("/actors")
            .json(&json!({
                "name": "first last",
                "mail": "partial@test.de"
            }))
            .send()
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_mail_conflicts() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/actors")
            .json(&json!({
                "name": "someone else",
                "mail": TestSuite::DEFAULT_MAIL,
                "password": "password"
            }))
            .send()
            .await;
        assert_eq!(StatusCode::CONFLICT, response.status());

        Ok(())
    }

    #[tokio::test]
    async fn test_profile() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let login = suite.authorize_default().await;

        let response = suite
            .client()
            .get("/actors/profile")
            .header("Authorization", format!("Bearer {}", login.token))
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        let actor = response.json::<Actor>().await;
        assert_eq!(suite.actor().id(), actor.id());

        let response = suite.client().get("/actors/profile").send().await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status());

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_actor_is_not_found() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite.client().get("/actors/actor:missing").send().await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());

        let response = suite
            .client()
            .put("/actors/actor:missing")
            .json(&json!({"name": "renamed"}))
            .send()
            .await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());

        let response = suite.client().delete("/actors/actor:missing").send().await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());

        Ok(())
    }
}
