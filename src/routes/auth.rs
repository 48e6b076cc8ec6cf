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
use crate::auth::Authenticate;
use crate::database::definitions::actor::Actor;
use crate::error::ApplicationErrorResponse;
use crate::prelude::*;
use aide::axum::routing::post_with;
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::Extension;
use chrono::{DateTime, Utc};

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/login", post_with(login, login_docs))
        .api_route(
            "/logout",
            post_with(logout, logout_docs).layer(from_fn_with_state(state.clone(), require_session)),
        )
        .with_state(state)
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
pub struct LoginRequest {
    /// the login identity
    mail: String,
    password: String,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// bearer token for the `Authorization` header
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

async fn login(
    State(state): State<ApplicationState>,
    Json(data): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    match crate::auth::actor_by_mail(data.mail.as_str(), state.connection()).await? {
        Some(actor) => {
            actor.login(data.password.as_str())?;

            let session = actor.start_session(state.connection()).await?;

            Ok(Json(LoginResponse {
                token: session.token().to_owned(),
                expires_at: *session.exp(),
            }))
        }
        None => Err(ApplicationError::Unauthorized),
    }
}

async fn logout(
    State(state): State<ApplicationState>,
    Extension(actor): Extension<Actor>,
) -> Result<StatusCode> {
    actor.logout(state.connection()).await?;

    Ok(StatusCode::NO_CONTENT)
}

fn logout_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("End every session of the authenticated actor")
        .summary("End the current session")
        .response::<204, ()>()
        .security_requirement("SessionToken")
}

fn login_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Verify the credentials and answer a bearer token for further requests")
        .summary("Start a new session")
        .response_with::<200, Json<LoginResponse>, _>(|transform| {
            transform.description("Login succeeded")
        })
        .response_with::<401, Json<ApplicationErrorResponse>, _>(|transform| {
            transform.description("Invalid credentials")
        })
}

#[cfg(test)]
mod tests {
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_login() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/auth/login")
            .json(&json!({
                "mail": TestSuite::DEFAULT_MAIL,
                "password": TestSuite::DEFAULT_PASSWORD,
            }))
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());

        let response = suite
            .client()
            .post("/auth/login")
            .json(&json!({
                "mail": TestSuite::DEFAULT_MAIL,
                "password": "wrong",
            }))
            .send()
            .await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status());

        Ok(())
    }

    #[tokio::test]
    async fn test_logout_ends_session() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let login = suite.authorize_default().await;

        let response = suite
            .client()
            .post("/auth/logout")
            .header("Authorization", format!("Bearer {}", login.token))
            .send()
            .await;
        assert_eq!(StatusCode::NO_CONTENT, response.status());

        // the token is gone afterwards
        let response = suite
            .client()
            .get("/actors/profile")
            .header("Authorization", format!("Bearer {}", login.token))
            .send()
            .await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status());

        Ok(())
    }
}
