use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::task::{Context, Poll};

use actix::Addr;
use actix_service::{Service, Transform};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::web::Data;
use actix_web::Error;
use actix_web::{get, web};
use futures::future::{ok, Ready};
use futures::Future;

use crate::db;
use crate::errors::ServiceError;
use crate::players::Player;
use crate::server::Response;
use crate::teams::Team;
use crate::websocket::server::{ActiveSessionCount, NotificationServer};

#[derive(Default)]
pub struct Stats {
    pub requests: AtomicU32,
    pub errors: AtomicU32,
}

impl Stats {
    fn record(&self, is_server_error: bool) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if is_server_error {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub requests: u32,
    pub errors: u32,
    pub active_ws_sessions: usize,
    pub players: i64,
    pub teams: i64,
    pub active_db_connections: u32,
    pub idle_db_connections: u32,
}

#[get("/stats")]
pub async fn route(
    stats: Data<Stats>,
    notifier: Data<Addr<NotificationServer>>,
    pool: Data<db::Pool>,
) -> Response {
    let state = pool.state();

    let (players, teams) = web::block(move || {
        let conn = pool.get()?;
        Ok::<_, ServiceError>((Player::count(&conn)?, Team::count(&conn)?))
    })
    .await?;

    http_ok_json!(StatsResponse {
        requests: stats.requests.load(Ordering::Relaxed),
        errors: stats.errors.load(Ordering::Relaxed),
        active_ws_sessions: notifier.send(ActiveSessionCount).await?,
        players,
        teams,
        active_db_connections: state.connections,
        idle_db_connections: state.idle_connections,
    });
}

/// Counts every request and every response with a 5xx status
pub struct Middleware {
    stats: Data<Stats>,
}

impl Middleware {
    pub fn new(stats: Data<Stats>) -> Middleware {
        Middleware { stats }
    }
}

impl<S, B> Transform<S> for Middleware
where
    S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
{
    type Request = ServiceRequest;
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestCountMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequestCountMiddleware {
            service,
            stats: self.stats.clone(),
        })
    }
}

pub struct RequestCountMiddleware<S> {
    service: S,
    stats: Data<Stats>,
}

impl<S, B> Service for RequestCountMiddleware<S>
where
    S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
{
    type Request = ServiceRequest;
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: ServiceRequest) -> Self::Future {
        let stats = self.stats.clone();
        let fut = self.service.call(request);

        Box::pin(async move {
            let res = fut.await;

            match &res {
                Ok(response) => stats.record(response.response().status().is_server_error()),
                Err(_) => stats.record(true),
            }

            res
        })
    }
}
