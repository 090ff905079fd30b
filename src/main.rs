//! picklefuif keeps the players and teams of a pickleball league
//! and pushes every change to the connected clients.
#![warn(missing_debug_implementations, rust_2018_idioms)]

#[macro_use]
extern crate diesel;

#[macro_use]
extern crate diesel_migrations;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate log;

#[macro_use]
extern crate serde_derive;

use tracing_subscriber::prelude::*;

use anyhow::Error;
use dotenv::dotenv;

#[macro_use]
mod macros;

mod config;
mod db;
mod errors;
mod players;
mod ranking;
mod schema;
mod server;
mod stats;
mod teams;
mod validator;
mod websocket;

use crate::config::Config;

#[actix_web::main]
async fn main() -> anyhow::Result<(), Error> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()?;

    Config::init();

    let _sentry = Config::sentry_dsn().map(|dsn| {
        info!("reporting errors to sentry");
        sentry::init(dsn)
    });

    debug!("running database migrations");
    db::migrate(Config::database_url())?;

    let pool = db::build_connection_pool(Config::database_url(), Config::database_pool_size())?;

    debug!("launching the actix webserver");
    server::launch(pool).await?;

    Ok(())
}
