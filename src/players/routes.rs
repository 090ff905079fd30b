use actix::Addr;
use actix_web::http::StatusCode;
use actix_web::web::{Data, HttpResponse, Json, Path};
use actix_web::{delete, get, post, put, web};

use crate::db;
use crate::players::{CreatePlayer, Player, TeamAssignment, UpdatePlayer};
use crate::ranking::MoveMessage;
use crate::server::Response;
use crate::validator::Validator;
use crate::websocket::{self, NotificationServer, Topic};

#[get("/players")]
async fn find_all(pool: Data<db::Pool>) -> Response {
    let players = web::block(move || {
        let conn = pool.get()?;
        Player::find_all(&conn)
    })
    .await?;

    http_ok_json!(players);
}

#[get("/players/{id}")]
async fn find(player_id: Path<i64>, pool: Data<db::Pool>) -> Response {
    let player = web::block(move || {
        let conn = pool.get()?;
        Player::find_by_id(*player_id, &conn)
    })
    .await?;

    http_ok_json!(player);
}

#[post("/players")]
async fn create(
    player: Json<Validator<CreatePlayer>>,
    pool: Data<db::Pool>,
    notifier: Data<Addr<NotificationServer>>,
) -> Response {
    let player = player.into_inner().validate()?;

    let player = web::block(move || {
        let conn = pool.get()?;
        Player::create(player, &conn)
    })
    .await?;

    websocket::publish(&notifier, &[Topic::Players]);

    http_created_json!(player);
}

#[put("/players/{id}")]
async fn update(
    player_id: Path<i64>,
    changes: Json<Validator<UpdatePlayer>>,
    pool: Data<db::Pool>,
    notifier: Data<Addr<NotificationServer>>,
) -> Response {
    let changes = changes.into_inner().validate()?;

    let player = web::block(move || {
        let conn = pool.get()?;
        Player::update(*player_id, changes, &conn)
    })
    .await?;

    websocket::publish(&notifier, &[Topic::Players]);

    http_ok_json!(player);
}

#[delete("/players/{id}")]
async fn delete(
    player_id: Path<i64>,
    pool: Data<db::Pool>,
    notifier: Data<Addr<NotificationServer>>,
) -> Response {
    web::block(move || {
        let conn = pool.get()?;
        Player::delete(*player_id, &conn)
    })
    .await?;

    websocket::publish(&notifier, &[Topic::Players, Topic::Teams]);

    Ok(HttpResponse::new(StatusCode::OK))
}

#[post("/players/{id}/move")]
async fn move_rank(
    player_id: Path<i64>,
    message: Json<MoveMessage>,
    pool: Data<db::Pool>,
    notifier: Data<Addr<NotificationServer>>,
) -> Response {
    let direction = message.into_inner().direction;

    let players = web::block(move || {
        let conn = pool.get()?;
        Player::move_rank(*player_id, direction, &conn)
    })
    .await?;

    websocket::publish(&notifier, &[Topic::Players]);

    http_ok_json!(players);
}

#[put("/players/{id}/team")]
async fn assign(
    player_id: Path<i64>,
    assignment: Json<TeamAssignment>,
    pool: Data<db::Pool>,
    notifier: Data<Addr<NotificationServer>>,
) -> Response {
    let team_id = assignment.into_inner().team_id;

    let player = web::block(move || {
        let conn = pool.get()?;
        Player::assign(*player_id, team_id, &conn)
    })
    .await?;

    websocket::publish(&notifier, &[Topic::Players, Topic::Teams]);

    http_ok_json!(player);
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(find_all);
    cfg.service(find);
    cfg.service(create);
    cfg.service(update);
    cfg.service(delete);
    cfg.service(move_rank);
    cfg.service(assign);
}
