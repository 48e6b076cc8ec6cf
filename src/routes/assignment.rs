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

use crate::database::definitions::assignment::{ActivityAssignment, WriteAssignment};
use crate::prelude::*;
use aide::axum::routing::{get_with, post_with};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{Query, State};
use axum::http::StatusCode;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/", post_with(create_assignment, create_assignment_docs))
        .api_route("/", get_with(get_assignment_page, get_assignment_page_docs))
        .with_state(state)
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
pub struct CreateAssignmentRequest {
    /// record id of the activity
    activity: String,
    /// record id of the actor working it
    actor: String,
    /// record id of the customer it is worked for
    customer: String,
}

async fn create_assignment(
    State(state): State<ApplicationState>,
    Json(data): Json<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<ActivityAssignment>)> {
    let activity = Id::try_from(("activity", data.activity.as_str()))?;
    let actor = Id::try_from(("actor", data.actor.as_str()))?;
    let customer = Id::try_from(("customer", data.customer.as_str()))?;

    let assignment = WriteAssignment::from(state.connection())
        .set_activity(Some(Relation::ForeignKey(activity)))
        .set_actor(Some(Relation::ForeignKey(actor)))
        .set_customer(Some(Relation::ForeignKey(customer)))
        .to_owned()
        .await?;

    Ok((StatusCode::CREATED, Json(assignment)))
}

fn create_assignment_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Link an activity to an actor and a customer. All three ids are required.")
        .summary("Create an assignment")
        .response::<201, Json<ActivityAssignment>>()
}

async fn get_assignment_page(
    State(state): State<ApplicationState>,
    Query(data): Query<PagingOptions>,
) -> Result<Json<Page<ActivityAssignment>>> {
    let page = data
        .execute::<(&str, &str), ActivityAssignment>(
            "SELECT * FROM assignment %%%",
            &[],
            state.connection(),
        )
        .await?;

    Ok(Json(page))
}

fn get_assignment_page_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Obtain a page of assignments")
        .summary("Obtain a page of assignments")
        .response::<200, Json<Page<ActivityAssignment>>>()
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::assignment::ActivityAssignment;
    use crate::database::page::Page;
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_create_and_list() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let activity = suite.seed_activity("monthly reconciliation", 10.0).await?;

        let response = suite
            .client()
            .post("/assignments")
            .json(&json!({
                "activity": activity.id().to_string(),
                "actor": suite.actor().id().to_string(),
                "customer": "customer:acme",
            }))
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());

        let response = suite.client().get("/assignments").send().await;
        assert_eq!(StatusCode::OK, response.status());
        let page = response.json::<Page<ActivityAssignment>>().await;
        assert_eq!(1, page.total);

        Ok(())
    }

    #[tokio::test]
    async fn test_all_links_required() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/assignments")
            .json(&json!({"activity": "activity:some", "actor": "actor:some"}))
            .send()
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        Ok(())
    }
}
