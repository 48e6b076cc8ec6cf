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

use crate::auth::session::{EndSession, Session, WriteSession};
use crate::database::definitions::actor::Actor;
use crate::prelude::*;
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::async_trait;

pub mod middleware;
pub mod session;

/// Look up an actor by its login identity.
#[instrument(skip(connection))]
pub async fn actor_by_mail(mail: &str, connection: &DatabaseConnection) -> Result<Option<Actor>> {
    let actor: Option<Actor> = sql_span!(connection
        .query("SELECT * FROM actor WHERE mail = $mail")
        .bind(("mail", mail))
        .await?
        .take(0)?);

    Ok(actor)
}

#[async_trait]
pub trait Authenticate {
    fn login(&self, password: &str) -> Result<()>;
    async fn logout(&self, connection: &DatabaseConnection) -> Result<()>;
    async fn start_session(&self, connection: &DatabaseConnection) -> Result<Session>;
}

#[async_trait]
impl Authenticate for Actor {
    #[instrument(skip_all)]
    fn login(&self, password: &str) -> Result<()> {
        let hash = PasswordHash::new(self.password().as_str())?;

        // a mismatch is a 401, not an internal fault
        Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .map_err(|_| ApplicationError::Unauthorized)
    }

    async fn logout(&self, connection: &DatabaseConnection) -> Result<()> {
        EndSession::new(self.id(), connection).await
    }

    async fn start_session(&self, connection: &DatabaseConnection) -> Result<Session> {
        WriteSession::new(self.id(), connection).await
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::Authenticate;
    use crate::database::definitions::actor::WriteActor;
    use axum::BoxError;

    #[tokio::test]
    async fn test_login() -> Result<(), BoxError> {
        let connection = crate::database::connect(None).await?.connection;
        let actor = WriteActor::from(&connection)
            .set_name(Some("first last"))
            .set_mail(Some("login@test.de"))
            .set_password(Some("password".to_owned()))
            .to_owned()
            .await?;

        assert!(actor.login("password").is_ok());
        assert!(actor.login("password1").is_err());

        let actor = WriteActor::from(&connection)
            .set_target(Some(&actor))
            .set_password(Some("different".to_owned()))
            .to_owned()
            .await?;
        assert!(actor.login("different").is_ok());
        assert!(actor.login("password").is_err());

        Ok(())
    }
}
