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

use crate::auth::session::Session;
use crate::database::definitions::actor::Actor;
use crate::prelude::*;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Guard for routes that require an identity. Validates the bearer token and
/// stores the session plus the resolved actor as request extensions.
pub async fn require_session<B>(
    State(state): State<ApplicationState>,
    mut request: Request<B>,
    next: Next<B>,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) => {
            let connection = state.connection();

            if let Ok(session) = Session::validate_token(token, connection).await {
                // resolve the actor behind the session
                let actor: Option<Actor> = match connection.select(session.target()).await {
                    Ok(actor) => actor,
                    Err(_) => None,
                };

                if let Some(actor) = actor {
                    let extensions = request.extensions_mut();
                    extensions.insert(actor);
                    extensions.insert(session);

                    return next.run(request).await;
                }
            }

            ApplicationError::Unauthorized.into_response()
        }
        None => ApplicationError::Unauthorized.into_response(),
    }
}
