use actix::Addr;
use actix_web::http::StatusCode;
use actix_web::web::{Data, HttpResponse, Json, Path};
use actix_web::{delete, get, post, put, web};

use crate::db;
use crate::ranking::MoveMessage;
use crate::server::Response;
use crate::teams::{CreateTeam, Team, TeamResponse, UpdateTeam};
use crate::validator::Validator;
use crate::websocket::{self, NotificationServer, Topic};

fn responses(teams: Vec<Team>) -> Vec<TeamResponse> {
    teams.into_iter().map(TeamResponse::from).collect()
}

#[get("/teams")]
async fn find_all(pool: Data<db::Pool>) -> Response {
    let teams = web::block(move || {
        let conn = pool.get()?;
        Team::find_all(&conn)
    })
    .await?;

    http_ok_json!(responses(teams));
}

#[get("/teams/name-suggestion")]
async fn suggest_name(pool: Data<db::Pool>) -> Response {
    let suggestion = web::block(move || {
        let conn = pool.get()?;
        Team::suggest_name(&conn)
    })
    .await?;

    http_ok_json!(suggestion);
}

#[get("/teams/{id}")]
async fn find(team_id: Path<i64>, pool: Data<db::Pool>) -> Response {
    let team = web::block(move || {
        let conn = pool.get()?;
        Team::find_by_id(*team_id, &conn)
    })
    .await?;

    http_ok_json!(TeamResponse::from(team));
}

#[post("/teams")]
async fn create(
    team: Json<Validator<CreateTeam>>,
    pool: Data<db::Pool>,
    notifier: Data<Addr<NotificationServer>>,
) -> Response {
    let team = team.into_inner().validate()?;

    let team = web::block(move || {
        let conn = pool.get()?;
        Team::create(team, &conn)
    })
    .await?;

    websocket::publish(&notifier, &[Topic::Teams]);

    http_created_json!(TeamResponse::from(team));
}

#[post("/teams/randomize")]
async fn randomize(pool: Data<db::Pool>, notifier: Data<Addr<NotificationServer>>) -> Response {
    let teams = web::block(move || {
        let conn = pool.get()?;
        Team::randomize(&conn)
    })
    .await?;

    websocket::publish(&notifier, &[Topic::Teams]);

    http_ok_json!(responses(teams));
}

#[put("/teams/{id}")]
async fn update(
    team_id: Path<i64>,
    changes: Json<Validator<UpdateTeam>>,
    pool: Data<db::Pool>,
    notifier: Data<Addr<NotificationServer>>,
) -> Response {
    let changes = changes.into_inner().validate()?;

    let team = web::block(move || {
        let conn = pool.get()?;
        Team::update(*team_id, changes, &conn)
    })
    .await?;

    websocket::publish(&notifier, &[Topic::Teams]);

    http_ok_json!(TeamResponse::from(team));
}

#[delete("/teams/{id}")]
async fn delete(
    team_id: Path<i64>,
    pool: Data<db::Pool>,
    notifier: Data<Addr<NotificationServer>>,
) -> Response {
    web::block(move || {
        let conn = pool.get()?;
        Team::delete(*team_id, &conn)
    })
    .await?;

    websocket::publish(&notifier, &[Topic::Players, Topic::Teams]);

    Ok(HttpResponse::new(StatusCode::OK))
}

#[post("/teams/{id}/move")]
async fn move_rank(
    team_id: Path<i64>,
    message: Json<MoveMessage>,
    pool: Data<db::Pool>,
    notifier: Data<Addr<NotificationServer>>,
) -> Response {
    let direction = message.into_inner().direction;

    let teams = web::block(move || {
        let conn = pool.get()?;
        Team::move_rank(*team_id, direction, &conn)
    })
    .await?;

    websocket::publish(&notifier, &[Topic::Teams]);

    http_ok_json!(responses(teams));
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(find_all);
    // must come before `find`
    cfg.service(suggest_name);
    cfg.service(find);
    cfg.service(create);
    cfg.service(randomize);
    cfg.service(update);
    cfg.service(delete);
    cfg.service(move_rank);
}
