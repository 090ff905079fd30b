use actix::{Actor, Addr};
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{get, middleware, web, App, HttpRequest, HttpResponse, HttpServer};

use crate::config::Config;
use crate::db;
use crate::errors::ServiceError;
use crate::players;
use crate::stats;
use crate::teams;
use crate::websocket;
use crate::websocket::NotificationServer;

pub type Response = Result<HttpResponse, ServiceError>;

#[get("/health")]
async fn health(_: HttpRequest) -> &'static str {
    "ok"
}

/// the web ui runs on its own origin, only that origin is allowed when it's configured
fn cors() -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    match Config::allowed_origin() {
        Some(origin) => cors.allowed_origin(origin),
        None => cors.allow_any_origin(),
    }
}

pub async fn launch(db_pool: db::Pool) -> std::io::Result<()> {
    let notifier: Addr<NotificationServer> = NotificationServer::new(db_pool.clone()).start();
    let stats = web::Data::new(stats::Stats::default());

    debug!(
        "listening on {}:{}",
        Config::api_host(),
        Config::api_port()
    );

    HttpServer::new(move || {
        App::new()
            .data(db_pool.clone())
            .data(notifier.clone())
            .app_data(stats.clone())
            .wrap(cors())
            .wrap(middleware::DefaultHeaders::new().header("X-Version", env!("CARGO_PKG_VERSION")))
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .wrap(sentry_actix::Sentry::new())
            .wrap(stats::Middleware::new(stats.clone()))
            // limit the maximum amount of data that server will accept
            .app_data(web::JsonConfig::default().limit(4096))
            .service(
                web::scope("/api")
                    .configure(players::routes::register)
                    .configure(teams::routes::register)
                    .configure(websocket::routes::register)
                    .service(stats::route)
                    .service(health),
            )
    })
    .bind(format!("{}:{}", Config::api_host(), Config::api_port()))?
    .run()
    .await
}
