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

use crate::database::definitions::activity::Activity;
use crate::database::definitions::actor::{Actor, ActorRole};
use crate::database::definitions::report::{Report, ReportKind, WriteReport};
use crate::database::definitions::task::{Task, STATUS_COMPLETED};
use crate::prelude::*;
use crate::report::{activity_sheets, employee_sheets, workbook, ReportSheet, XLSX_MIME};
use aide::axum::routing::get_with;
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use std::collections::HashMap;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/", get_with(get_report_page, get_report_page_docs))
        .api_route("/activities", get_with(activity_report, activity_report_docs))
        .api_route("/employees", get_with(employee_report, employee_report_docs))
        .with_state(state)
}

async fn get_report_page(
    State(state): State<ApplicationState>,
    Query(data): Query<PagingOptions>,
) -> Result<Json<Page<Report>>> {
    let page = data
        .execute::<(&str, &str), Report>(
            "SELECT * FROM report ORDER BY generated_at DESC %%%",
            &[],
            state.connection(),
        )
        .await?;

    Ok(Json(page))
}

fn get_report_page_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Obtain a page of generated report metadata, newest first")
        .summary("Obtain a page of reports")
        .response::<200, Json<Page<Report>>>()
}

/// Completed tasks of one subject, oldest first so the sheet reads
/// chronologically.
async fn completed_tasks(
    field: &str,
    subject: &Id,
    connection: &DatabaseConnection,
) -> Result<Vec<Task>> {
    let query = format!(
        "SELECT * FROM task WHERE {field} = $subject AND status = $status ORDER BY created_at ASC"
    );
    let mut response = sql_span!(connection
        .query(query)
        .bind(("subject", subject.to_string()))
        .bind(("status", STATUS_COMPLETED))
        .await?
        .check()?);

    Ok(response.take::<Vec<Task>>(0)?)
}

async fn finish(
    kind: ReportKind,
    sheets: &[ReportSheet],
    connection: &DatabaseConnection,
) -> Result<Response> {
    let bytes = workbook::render(sheets)?;

    let prefix = match kind {
        ReportKind::Activity => "activity",
        ReportKind::Employee => "employee",
    };
    let file_name = format!("{prefix}-report-{}.xlsx", Utc::now().format("%Y-%m-%d"));

    WriteReport::from(connection)
        .set_kind(Some(kind))
        .set_file_name(Some(file_name.as_str()))
        .set_sheets(Some(sheets.len() as u64))
        .to_owned()
        .await?;
    info!("generated {kind} report {file_name} with {} sheets", sheets.len());

    Ok((
        [
            (CONTENT_TYPE, XLSX_MIME.to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

async fn activity_report(State(state): State<ApplicationState>) -> Result<Response> {
    let activities: Vec<Activity> = sql_span!(state.connection().select("activity").await?);

    let mut groups = Vec::with_capacity(activities.len());
    for activity in activities {
        let tasks = completed_tasks("activity", activity.id(), state.connection()).await?;
        groups.push((activity, tasks));
    }

    finish(
        ReportKind::Activity,
        &activity_sheets(&groups),
        state.connection(),
    )
    .await
}

fn activity_report_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description(
            "Generate and download the activity report, one sheet per activity with the \
             completed tasks timed against its standard time",
        )
        .summary("Download the activity report")
}

async fn employee_report(State(state): State<ApplicationState>) -> Result<Response> {
    // managers and admins do not get a sheet
    let actors: Vec<Actor> = sql_span!(state
        .connection()
        .query("SELECT * FROM actor WHERE role = $role")
        .bind(("role", ActorRole::Employee))
        .await?
        .take(0)?);
    let activities: Vec<Activity> = sql_span!(state.connection().select("activity").await?);
    let activities: HashMap<String, Activity> = activities
        .into_iter()
        .map(|activity| (activity.id().to_string(), activity))
        .collect();

    let mut groups = Vec::with_capacity(actors.len());
    for actor in actors {
        let tasks = completed_tasks("actor", actor.id(), state.connection()).await?;
        groups.push((actor, tasks));
    }

    finish(
        ReportKind::Employee,
        &employee_sheets(&groups, &activities),
        state.connection(),
    )
    .await
}

fn employee_report_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description(
            "Generate and download the employee report, one sheet per actor with the \
             completed tasks timed against their activities",
        )
        .summary("Download the employee report")
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::report::Report;
    use crate::database::page::Page;
    use crate::report::XLSX_MIME;
    use crate::tests::TestSuite;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_activity_report_download() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let activity = suite.seed_activity("monthly reconciliation", 10.0).await?;
        suite
            .seed_completed_task("march run", &activity, Some(8.0))
            .await?;

        let response = suite.client().get("/reports/activities").send().await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(
            Some(XLSX_MIME),
            response
                .headers()
                .get("content-type")
                .and_then(|value| value.to_str().ok())
        );

        let bytes = response.bytes().await;
        assert_eq!(&bytes[0..2], b"PK");

        // every download leaves a metadata row behind
        let response = suite.client().get("/reports").send().await;
        let page = response.json::<Page<Report>>().await;
        assert_eq!(1, page.total);
        assert_eq!(1, *page.data[0].sheets());

        Ok(())
    }

    #[tokio::test]
    async fn test_employee_report_download() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite.client().get("/reports/employees").send().await;
        assert_eq!(StatusCode::OK, response.status());

        let disposition = response
            .headers()
            .get("content-disposition")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        assert!(disposition.starts_with("attachment; filename=\"employee-report-"));

        Ok(())
    }
}
