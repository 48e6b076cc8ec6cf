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

use crate::database::definitions::message::{Message, WriteMessage};
use crate::prelude::*;
use aide::axum::routing::{get_with, post_with};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{Query, State};
use axum::http::StatusCode;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/", post_with(create_message, create_message_docs))
        .api_route("/", get_with(get_message_page, get_message_page_docs))
        .with_state(state)
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
pub struct CreateMessageRequest {
    body: String,
    #[serde(default)]
    subject: Option<String>,
    /// record id of the sending actor
    #[serde(default)]
    sender: Option<String>,
}

async fn create_message(
    State(state): State<ApplicationState>,
    Json(data): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    let sender = data
        .sender
        .as_deref()
        .map(|id| Id::try_from(("actor", id)))
        .transpose()?
        .map(Relation::ForeignKey);

    let message = WriteMessage::from(state.connection())
        .set_body(Some(data.body.as_str()))
        .set_subject(data.subject.as_deref())
        .set_sender(sender)
        .to_owned()
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

fn create_message_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Record a broadcast message. The body is required.")
        .summary("Record a message")
        .response::<201, Json<Message>>()
}

async fn get_message_page(
    State(state): State<ApplicationState>,
    Query(data): Query<PagingOptions>,
) -> Result<Json<Page<Message>>> {
    let page = data
        .execute::<(&str, &str), Message>(
            "SELECT * FROM message ORDER BY sent_at DESC %%%",
            &[],
            state.connection(),
        )
        .await?;

    Ok(Json(page))
}

fn get_message_page_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Obtain a page of messages, newest first")
        .summary("Obtain a page of messages")
        .response::<200, Json<Page<Message>>>()
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::message::Message;
    use crate::database::page::Page;
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_create_and_list() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/messages")
            .json(&json!({
                "subject": "maintenance window",
                "body": "the system goes down friday evening"
            }))
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());

        let response = suite.client().get("/messages").send().await;
        assert_eq!(StatusCode::OK, response.status());
        let page = response.json::<Page<Message>>().await;
        assert_eq!(1, page.total);
        assert_eq!(
            Some("maintenance window"),
            page.data[0].subject().as_deref()
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_body_is_required() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/messages")
            .json(&json!({"subject": "empty"}))
            .send()
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        Ok(())
    }
}
