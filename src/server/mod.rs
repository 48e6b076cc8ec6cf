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
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub mod state;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub surrealdb_endpoint: String,
    pub surrealdb_username: String,
    pub surrealdb_password: String,
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,
}

fn default_bind_port() -> u16 {
    8000
}

lazy_static! {
    pub static ref CONFIGURATION: Config = envy::from_env::<Config>().unwrap();
}

pub fn init() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    lazy_static::initialize(&CONFIGURATION);

    tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(async move {
            tracing_subscriber::registry()
                .with(tracing_subscriber::EnvFilter::from_default_env())
                .with(tracing_subscriber::fmt::layer())
                .init();

            let (axum_sender, axum_receiver) = kanal::unbounded_async::<()>();

            let info = crate::database::connect(None).await?;

            tokio::spawn(async move {
                let state = ApplicationState::from(info);
                let router = crate::routes::router(state);
                let addr = std::net::SocketAddr::from(([0, 0, 0, 0], CONFIGURATION.bind_port));
                info!("Listening on {addr}");

                axum::Server::bind(&addr)
                    .serve(router.into_make_service())
                    .with_graceful_shutdown(async {
                        axum_receiver.recv().await.ok();
                    })
                    .await
                    .unwrap();

                Ok::<(), ApplicationError>(())
            });

            match tokio::signal::ctrl_c().await {
                Ok(()) => {}
                Err(error) => {
                    error!("Unable to listen for shutdown signal: {}", error);
                    axum_sender.send(()).await?;
                }
            }

            info!("Received shutdown signal... Shutting down...");
            // shutdown
            axum_sender.send(()).await?;
            Ok(())
        })
}
