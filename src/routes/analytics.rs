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

use crate::database::definitions::task::STATUS_COMPLETED;
use crate::prelude::*;
use aide::axum::routing::get_with;
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/", get_with(get_overview, get_overview_docs))
        .with_state(state)
}

/// Live counts, computed on request. Nothing here is cached.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub actors: u64,
    pub customers: u64,
    pub activities: u64,
    pub tasks: u64,
    pub completed_tasks: u64,
    /// everything not yet completed
    pub pending_tasks: u64,
    pub assignments: u64,
    pub messages: u64,
}

async fn get_overview(State(state): State<ApplicationState>) -> Result<Json<AnalyticsOverview>> {
    let mut response = sql_span!(state
        .connection()
        .query("SELECT * FROM count((SELECT * FROM actor))")
        .query("SELECT * FROM count((SELECT * FROM customer))")
        .query("SELECT * FROM count((SELECT * FROM activity))")
        .query("SELECT * FROM count((SELECT * FROM task))")
        .query("SELECT * FROM count((SELECT * FROM task WHERE status = $status))")
        .query("SELECT * FROM count((SELECT * FROM task WHERE status != $status))")
        .query("SELECT * FROM count((SELECT * FROM assignment))")
        .query("SELECT * FROM count((SELECT * FROM message))")
        .bind(("status", STATUS_COMPLETED))
        .await?
        .check()?);

    Ok(Json(AnalyticsOverview {
        actors: response.take::<Option<u64>>(0)?.unwrap_or(0),
        customers: response.take::<Option<u64>>(1)?.unwrap_or(0),
        activities: response.take::<Option<u64>>(2)?.unwrap_or(0),
        tasks: response.take::<Option<u64>>(3)?.unwrap_or(0),
        completed_tasks: response.take::<Option<u64>>(4)?.unwrap_or(0),
        pending_tasks: response.take::<Option<u64>>(5)?.unwrap_or(0),
        assignments: response.take::<Option<u64>>(6)?.unwrap_or(0),
        messages: response.take::<Option<u64>>(7)?.unwrap_or(0),
    }))
}

fn get_overview_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Live record counts across the system")
        .summary("Analytics overview")
        .response::<200, Json<AnalyticsOverview>>()
}

#[cfg(test)]
mod tests {
    use super::AnalyticsOverview;
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_overview_counts() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let activity = suite.seed_activity("monthly reconciliation", 10.0).await?;
        suite
            .seed_completed_task("march run", &activity, Some(8.0))
            .await?;

        let response = suite.client().get("/analytics").send().await;
        assert_eq!(StatusCode::OK, response.status());

        let overview = response.json::<AnalyticsOverview>().await;
        // the suite seeds one actor
        assert_eq!(1, overview.actors);
        assert_eq!(1, overview.activities);
        assert_eq!(1, overview.tasks);
        assert_eq!(1, overview.completed_tasks);
        assert_eq!(0, overview.pending_tasks);
        assert_eq!(0, overview.customers);

        Ok(())
    }
}
