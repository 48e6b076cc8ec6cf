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
use aide::axum::ApiRouter;
use aide::openapi::OpenApi;
use axum::Extension;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;

pub mod activity;
pub mod actor;
pub mod analytics;
pub mod assignment;
pub mod auth;
pub mod customer;
pub mod extractor;
pub mod group;
pub mod message;
pub mod openapi;
pub mod report;
pub mod task;

pub fn router(state: ApplicationState) -> axum::Router {
    let mut api = OpenApi::default();

    ApiRouter::new()
        .nest_api_service("/auth", auth::router(state.clone()))
        .nest_api_service("/actors", actor::router(state.clone()))
        .nest_api_service("/customers", customer::router(state.clone()))
        .nest_api_service("/groups", group::router(state.clone()))
        .nest_api_service("/activities", activity::router(state.clone()))
        .nest_api_service("/tasks", task::router(state.clone()))
        .nest_api_service("/messages", message::router(state.clone()))
        .nest_api_service("/assignments", assignment::router(state.clone()))
        .nest_api_service("/reports", report::router(state.clone()))
        .nest_api_service("/analytics", analytics::router(state.clone()))
        .nest_api_service("/docs", openapi::router(state))
        .finish_api_with(&mut api, openapi::transform_api)
        .layer(Extension(Arc::new(api)))
        .layer(CompressionLayer::new().gzip(true))
}
