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
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, NaiveDate, Utc};
use std::future::{Future, IntoFuture};
use std::pin::Pin;

/// Explicit role, replacing the magic numeric role column the data model
/// grew out of. Employee reports select on `Employee`.
#[derive(
    Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema, strum::Display,
)]
pub enum ActorRole {
    Employee,
    Manager,
    Admin,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema, Getters)]
#[get = "pub"]
pub struct Actor {
    id: Id,
    name: String,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    mobile: Option<String>,
    #[serde(default)]
    alt_mobile: Option<String>,
    /// the login identity
    mail: String,
    /// argon2 hash, never the plain password. Skipped on the way out so the
    /// hash never reaches a response body.
    #[serde(skip_serializing, default)]
    password: String,
    role: ActorRole,
    #[serde(default)]
    group: Option<Relation<Group>>,
    #[serde(default)]
    status: Option<String>,
    updated_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

/// The only path that writes the `actor` table. Every settable field is
/// spelled out here, unknown input never reaches the record.
#[derive(Clone, Debug, Serialize, Getters, Setters)]
pub struct WriteActor<'a> {
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
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
    alt_mobile: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    mail: Option<&'a str>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[get = "pub"]
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<ActorRole>,
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
    target: Option<&'a Actor>,
}

impl<'a> From<&'a DatabaseConnection> for WriteActor<'a> {
    fn from(connection: &'a DatabaseConnection) -> Self {
        Self {
            name: None,
            gender: None,
            date_of_birth: None,
            mobile: None,
            alt_mobile: None,
            mail: None,
            password: None,
            role: None,
            group: None,
            status: None,
            connection,
            target: None,
        }
    }
}

impl<'a> IntoFuture for WriteActor<'a> {
    type Output = Result<Actor>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    #[instrument(skip_all)]
    fn into_future(mut self) -> Self::IntoFuture {
        Box::pin(async move {
            // passwords are only ever stored hashed
            if let Some(password) = self.password.take() {
                let hash = Argon2::default()
                    .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))?
                    .to_string();
                self.password = Some(hash);
            }

            // new actors without an explicit role are employees
            if self.target.is_none() && self.role.is_none() {
                self.role = Some(ActorRole::Employee);
            }

            let actor: Actor = if let Some(target) = self.target {
                sql_span!(self
                    .connection
                    .update(target.id().to_thing())
                    .merge(&self)
                    .await?)
                .ok_or(ApplicationError::NotFound("actor"))?
            } else {
                let mut created: Vec<Actor> =
                    sql_span!(self.connection.create("actor").content(&self).await?);
                created.pop().ok_or(ApplicationError::InternalServerError)?
            };

            Ok(actor)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ActorRole, WriteActor};
    use axum::BoxError;

    #[tokio::test]
    async fn test_write() -> Result<(), BoxError> {
        let connection = crate::database::connect(None).await?.connection;

        let actor = WriteActor::from(&connection)
            .set_name(Some("first last"))
            .set_mail(Some("actor@test.de"))
            .set_password(Some("password".to_owned()))
            .to_owned()
            .await?;

        assert_eq!("first last", actor.name());
        assert_eq!("actor@test.de", actor.mail());
        assert_eq!(&ActorRole::Employee, actor.role());
        // stored as a hash
        assert_ne!("password", actor.password());

        let updated = WriteActor::from(&connection)
            .set_target(Some(&actor))
            .set_status(Some("inactive"))
            .set_role(Some(ActorRole::Manager))
            .to_owned()
            .await?;
        assert_eq!(Some("inactive".to_owned()), *updated.status());
        assert_eq!(&ActorRole::Manager, updated.role());
        assert_eq!(actor.mail(), updated.mail());

        Ok(())
    }
}
