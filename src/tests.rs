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

use crate::database::definitions::activity::{Activity, WriteActivity};
use crate::database::definitions::actor::{Actor, WriteActor};
use crate::database::definitions::task::{Task, WriteTask, STATUS_COMPLETED};
use crate::prelude::*;
use crate::routes::auth::LoginResponse;
use axum::BoxError;
use axum_test_helper::TestClient;

/// Shared scaffolding for the route tests. Every instance runs against its
/// own throwaway database with one seeded actor.
#[derive(Getters)]
#[get = "pub"]
pub struct TestSuite {
    client: TestClient,
    connection: DatabaseConnection,
    actor: Actor,
}

impl TestSuite {
    pub const DEFAULT_MAIL: &'static str = "default@test.de";
    pub const DEFAULT_PASSWORD: &'static str = "password";

    pub async fn init() -> std::result::Result<Self, BoxError> {
        let info = crate::database::connect(None).await?;
        let connection = info.connection.clone();
        let client = TestClient::new(crate::routes::router(ApplicationState::from(info)));

        let actor = WriteActor::from(&connection)
            .set_name(Some("first last"))
            .set_mail(Some(Self::DEFAULT_MAIL))
            .set_password(Some(Self::DEFAULT_PASSWORD.to_owned()))
            .to_owned()
            .await?;

        Ok(Self {
            client,
            connection,
            actor,
        })
    }

    pub async fn authorize_default(&self) -> LoginResponse {
        let response = self
            .client
            .post("/auth/login")
            .json(&json!({
                "mail": Self::DEFAULT_MAIL,
                "password": Self::DEFAULT_PASSWORD,
            }))
            .send()
            .await;

        response.json::<LoginResponse>().await
    }

    pub async fn seed_activity(
        &self,
        name: &str,
        standard_time: f64,
    ) -> std::result::Result<Activity, BoxError> {
        Ok(WriteActivity::from(&self.connection)
            .set_name(Some(name))
            .set_standard_time(Some(standard_time))
            .to_owned()
            .await?)
    }

    pub async fn seed_completed_task(
        &self,
        title: &str,
        activity: &Activity,
        time_taken: Option<f64>,
    ) -> std::result::Result<Task, BoxError> {
        Ok(WriteTask::from(&self.connection)
            .set_title(Some(title))
            .set_status(Some(STATUS_COMPLETED))
            .set_activity(Some(Relation::ForeignKey(activity.id().clone())))
            .set_actor(Some(Relation::ForeignKey(self.actor.id().clone())))
            .set_assignee(Some(self.actor.name().as_str()))
            .set_time_taken(time_taken)
            .to_owned()
            .await?)
    }
}
