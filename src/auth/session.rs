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
use chrono::{DateTime, Duration, Utc};
use std::future::{Future, IntoFuture};
use std::pin::Pin;

const ALPHABET: [char; 62] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
    'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
    'V', 'W', 'X', 'Y', 'Z',
];

// 8h
const SESSION_LENGTH: i64 = 28800;

/// A bearer session. The record key doubles as the token handed to the
/// client.
#[derive(Clone, Debug, Getters, Deserialize, Serialize, JsonSchema)]
pub struct Session {
    pub id: Id,
    #[get = "pub"]
    target: Id,
    #[get = "pub"]
    iat: DateTime<Utc>,
    #[get = "pub"]
    exp: DateTime<Utc>,
}

impl Session {
    pub fn token(&self) -> &str {
        self.id.key.as_str()
    }

    /// Resolve a bearer token to a live session.
    #[instrument(skip(connection))]
    pub async fn validate_token(token: &str, connection: &DatabaseConnection) -> Result<Session> {
        let session: Option<Session> =
            sql_span!(connection.select(&Id::new(("session", token))).await?);

        match session {
            Some(session) => {
                if session.is_valid(connection).await.is_ok() {
                    Ok(session)
                } else {
                    Err(ApplicationError::Unauthorized)
                }
            }
            None => Err(ApplicationError::Unauthorized),
        }
    }

    #[instrument(skip_all)]
    pub async fn is_valid(&self, connection: &DatabaseConnection) -> Result<()> {
        if Utc::now() >= self.exp {
            // expired, remove the record as well
            self.end(connection).await?;

            Err(ApplicationError::Unauthorized)
        } else {
            Ok(())
        }
    }

    /// Ends the given session
    #[instrument(skip_all)]
    pub async fn end(&self, connection: &DatabaseConnection) -> Result<()> {
        let _: Option<Session> = sql_span!(connection.delete(&self.id).await?);

        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct EndSession<'a> {
    target: &'a Id,
    connection: &'a DatabaseConnection,
}

impl<'a> EndSession<'a> {
    pub fn new(target: &'a Id, connection: &'a DatabaseConnection) -> Self {
        Self { target, connection }
    }
}

impl<'a> IntoFuture for EndSession<'a> {
    type Output = Result<()>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            sql_span!(self
                .connection
                .query("DELETE FROM session WHERE target = $target")
                .bind(("target", self.target.to_string()))
                .await?
                .check()?);

            Ok(())
        })
    }
}

#[derive(Clone, Debug)]
pub struct WriteSession<'a> {
    target: &'a Id,
    connection: &'a DatabaseConnection,
}

impl<'a> WriteSession<'a> {
    pub fn new(target: &'a Id, connection: &'a DatabaseConnection) -> Self {
        Self { target, connection }
    }
}

impl<'a> IntoFuture for WriteSession<'a> {
    type Output = Result<Session>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    #[instrument(skip_all)]
    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let iat = Utc::now();
            let exp = iat + Duration::seconds(SESSION_LENGTH);
            // generate the token
            let token = nanoid::nanoid!(64, &ALPHABET);
            let id = Id::new(("session", token.as_str()));

            // a fresh login ends currently active sessions for the target
            EndSession::new(self.target, self.connection).await?;

            let session: Option<Session> = sql_span!(self
                .connection
                .create(id.to_thing())
                .content(&json!({
                    "target": self.target,
                    "iat": iat,
                    "exp": exp,
                }))
                .await?);

            session.ok_or(ApplicationError::InternalServerError)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::session::{Session, WriteSession};
    use crate::database::definitions::actor::WriteActor;
    use axum::BoxError;

    #[tokio::test]
    async fn test_session_roundtrip() -> Result<(), BoxError> {
        let connection = crate::database::connect(None).await?.connection;
        let actor = WriteActor::from(&connection)
            .set_name(Some("first last"))
            .set_mail(Some("session@test.de"))
            .set_password(Some("password".to_owned()))
            .to_owned()
            .await?;

        let session = WriteSession::new(actor.id(), &connection).await?;
        assert!(session.is_valid(&connection).await.is_ok());
        assert_eq!(actor.id(), session.target());

        let validated = Session::validate_token(session.token(), &connection).await?;
        assert_eq!(session.id, validated.id);

        // a second login invalidates the first token
        let next = WriteSession::new(actor.id(), &connection).await?;
        assert!(Session::validate_token(session.token(), &connection)
            .await
            .is_err());
        assert!(Session::validate_token(next.token(), &connection)
            .await
            .is_ok());

        Ok(())
    }
}
