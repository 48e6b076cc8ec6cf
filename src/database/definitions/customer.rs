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

use crate::database::definitions::group::Group;
use crate::prelude::*;
use chrono::{DateTime, NaiveDate, Utc};
use std::future::{Future, IntoFuture};
use std::pin::Pin;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema, Getters)]
#[get = "pub"]
pub struct Customer {
    id: Id,
    name: String,
    #[serde(default)]
    customer_type: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    date_of_birth: Option<NaiveDate>,
    mobile: String,
    #[serde(default)]
    mail: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    group: Option<Relation<Group>>,
    #[serde(default)]
    status: Option<String>,
    updated_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Getters, Setters)]
pub struct WriteCustomer<'a> {
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_type: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    gender: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    date_of_birth: Option<NaiveDate>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    mobile: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    mail: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<Relation<Group>>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    #[serde(skip)]
    connection: &'a DatabaseConnection,
    #[serde(skip)]
    #[set = "pub"]
    target: Option<&'a Customer>,
}

impl<'a> From<&'a DatabaseConnection> for WriteCustomer<'a> {
    fn from(connection: &'a DatabaseConnection) -> Self {
        Self {
            name: None,
            customer_type: None,
            gender: None,
            date_of_birth: None,
            mobile: None,
            mail: None,
            address: None,
            city: None,
            group: None,
            status: None,
            connection,
            target: None,
        }
    }
}

impl<'a> IntoFuture for WriteCustomer<'a> {
    type Output = Result<Customer>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    #[instrument(skip_all)]
    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let customer: Customer = if let Some(target) = self.target {
                sql_span!(self
                    .connection
                    .update(target.id().to_thing())
                    .merge(&self)
                    .await?)
                .ok_or(ApplicationError::NotFound("customer"))?
            } else {
                let mut created: Vec<Customer> =
                    sql_span!(self.connection.create("customer").content(&self).await?);
                created.pop().ok_or(ApplicationError::InternalServerError)?
            };

            Ok(customer)
        })
    }
}
