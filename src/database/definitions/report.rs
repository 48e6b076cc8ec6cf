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
use chrono::{DateTime, Utc};
use std::future::{Future, IntoFuture};
use std::pin::Pin;

#[derive(
    Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema, strum::Display,
)]
pub enum ReportKind {
    Activity,
    Employee,
}

/// Metadata row recorded for every workbook that leaves the system, so the
/// report listing reflects what was actually generated.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema, Getters)]
#[get = "pub"]
pub struct Report {
    id: Id,
    kind: ReportKind,
    file_name: String,
    sheets: u64,
    generated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Getters, Setters)]
pub struct WriteReport<'a> {
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ReportKind>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    sheets: Option<u64>,
    #[serde(skip)]
    connection: &'a DatabaseConnection,
}

impl<'a> From<&'a DatabaseConnection> for WriteReport<'a> {
    fn from(connection: &'a DatabaseConnection) -> Self {
        Self {
            kind: None,
            file_name: None,
            sheets: None,
            connection,
        }
    }
}

impl<'a> IntoFuture for WriteReport<'a> {
    type Output = Result<Report>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    #[instrument(skip_all)]
    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let mut created: Vec<Report> =
                sql_span!(self.connection.create("report").content(&self).await?);

            created.pop().ok_or(ApplicationError::InternalServerError)
        })
    }
}
