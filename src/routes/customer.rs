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

use crate::database::definitions::customer::{Customer, WriteCustomer};
use crate::database::definitions::group::GROUP_TABLE;
use crate::prelude::*;
use aide::axum::routing::{delete_with, get_with, post_with, put_with};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/", post_with(create_customer, create_customer_docs))
        .api_route("/", get_with(get_customer_page, get_customer_page_docs))
        .api_route("/:id", get_with(get_customer, get_customer_docs))
        .api_route("/:id", put_with(update_customer, update_customer_docs))
        .api_route("/:id", delete_with(delete_customer, delete_customer_docs))
        .with_state(state)
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
pub struct CreateCustomerRequest {
    name: String,
    mobile: String,
    #[serde(default)]
    customer_type: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    mail: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize, JsonSchema, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct UpdateCustomerRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    mobile: Option<String>,
    #[serde(default)]
    customer_type: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    mail: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

async fn create_customer(
    State(state): State<ApplicationState>,
    Json(data): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>)> {
    let group = data
        .group
        .as_deref()
        .map(|id| Id::try_from((GROUP_TABLE, id)))
        .transpose()?
        .map(Relation::ForeignKey);

    let customer = WriteCustomer::from(state.connection())
        .set_name(Some(data.name.as_str()))
        .set_mobile(Some(data.mobile.as_str()))
        .set_customer_type(data.customer_type.as_deref())
        .set_gender(data.gender.as_deref())
        .set_date_of_birth(data.date_of_birth)
        .set_mail(data.mail.as_deref())
        .set_address(data.address.as_deref())
        .set_city(data.city.as_deref())
        .set_group(group)
        .set_status(data.status.as_deref())
        .to_owned()
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

fn create_customer_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Create a new customer. Name and mobile are required.")
        .summary("Create a new customer")
        .response::<201, Json<Customer>>()
}

async fn get_customer_page(
    State(state): State<ApplicationState>,
    Query(data): Query<PagingOptions>,
) -> Result<Json<Page<Customer>>> {
    let page = data
        .execute::<(&str, &str), Customer>("SELECT * FROM customer %%%", &[], state.connection())
        .await?;

    Ok(Json(page))
}

fn get_customer_page_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Obtain a page of customers")
        .summary("Obtain a page of customers")
        .response::<200, Json<Page<Customer>>>()
}

async fn get_customer(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
) -> Result<Json<Customer>> {
    let id = Id::try_from(("customer", id.as_str()))?;
    let customer: Option<Customer> = sql_span!(state.connection().select(&id).await?);

    customer
        .map(Json)
        .ok_or(ApplicationError::NotFound("customer"))
}

fn get_customer_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Obtain a single customer by its id")
        .summary("Obtain a customer")
        .response::<200, Json<Customer>>()
}

async fn update_customer(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
    Json(data): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>> {
    let id = Id::try_from(("customer", id.as_str()))?;
    let target: Option<Customer> = sql_span!(state.connection().select(&id).await?);
    let target = target.ok_or(ApplicationError::NotFound("customer"))?;

    let group = data
        .group
        .as_deref()
        .map(|id| Id::try_from((GROUP_TABLE, id)))
        .transpose()?
        .map(Relation::ForeignKey);

    let customer = WriteCustomer::from(state.connection())
        .set_target(Some(&target))
        .set_name(data.name.as_deref())
        .set_mobile(data.mobile.as_deref())
        .set_customer_type(data.customer_type.as_deref())
        .set_gender(data.gender.as_deref())
        .set_date_of_birth(data.date_of_birth)
        .set_mail(data.mail.as_deref())
        .set_address(data.address.as_deref())
        .set_city(data.city.as_deref())
        .set_group(group)
        .set_status(data.status.as_deref())
        .to_owned()
        .await?;

    Ok(Json(customer))
}

fn update_customer_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Update a customer. Only the documented fields are applied.")
        .summary("Update a customer")
        .response::<200, Json<Customer>>()
}

async fn delete_customer(
    State(state): State<ApplicationState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = Id::try_from(("customer", id.as_str()))?;
    let deleted: Option<Customer> = sql_span!(state.connection().delete(&id).await?);

    deleted
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ApplicationError::NotFound("customer"))
}

fn delete_customer_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Delete a customer by its id")
        .summary("Delete a customer")
        .response::<204, ()>()
}
