use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::db;
use crate::errors::ServiceError;
use crate::ranking::{self, Direction, RankUpdate, Ranked};
use crate::schema::{players, teams};
use crate::teams::members;
use crate::validator::validate_name;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub skill_level: i16,
    pub gender: String,
    pub family: String,
    pub rank: i32,
    pub team_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub const MIN_SKILL_LEVEL: i16 = 1;
pub const MAX_SKILL_LEVEL: i16 = 5;

///
/// **POST /api/players**
///
/// New players are added at the bottom of the ranking and don't belong to a team.
///
/// ``` shell
/// curl --location --request POST 'localhost:8080/api/players' \
///     --header 'Content-Type: application/json' \
///     --data-raw '{
///         "name": "Ricky",
///         "skillLevel": 3,
///         "gender": "Male",
///         "family": "Miller"
///     }'
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayer {
    pub name: String,
    pub skill_level: i16,
    pub gender: Gender,
    pub family: String,
}

#[derive(Debug, Insertable)]
#[table_name = "players"]
struct NewPlayer {
    name: String,
    skill_level: i16,
    gender: String,
    family: String,
    rank: i32,
}

/// **PUT /api/players/{id}**
///
/// Only the fields that are sent are changed.
/// Ranks and teams are changed through their own routes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlayer {
    pub name: Option<String>,
    pub skill_level: Option<i16>,
    pub gender: Option<Gender>,
    pub family: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[table_name = "players"]
struct PlayerChanges {
    name: Option<String>,
    skill_level: Option<i16>,
    gender: Option<String>,
    family: Option<String>,
}

/// **PUT /api/players/{id}/team**
///
/// Send `null` to remove the player from its team.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAssignment {
    pub team_id: Option<i64>,
}

impl Ranked for Player {
    fn id(&self) -> i64 {
        self.id
    }

    fn rank(&self) -> i32 {
        self.rank
    }
}

impl Player {
    pub fn find_all(conn: &db::Conn) -> Result<Vec<Player>, ServiceError> {
        let players = players::table
            .order((players::rank, players::id))
            .load::<Player>(conn)?;

        Ok(players)
    }

    pub fn find_by_id(player_id: i64, conn: &db::Conn) -> Result<Player, ServiceError> {
        let player = players::table.find(player_id).first::<Player>(conn)?;

        Ok(player)
    }

    pub fn count(conn: &db::Conn) -> Result<i64, ServiceError> {
        let count = players::table.count().get_result::<i64>(conn)?;

        Ok(count)
    }

    /// Saves a new player at the bottom of the ranking
    pub fn create(new_player: CreatePlayer, conn: &db::Conn) -> Result<Player, ServiceError> {
        conn.transaction::<Player, ServiceError, _>(|| {
            db::lock_table("players", conn)?;

            let count = Player::count(conn)?;

            let player = diesel::insert_into(players::table)
                .values(&NewPlayer {
                    name: new_player.name.trim().to_string(),
                    skill_level: new_player.skill_level,
                    gender: new_player.gender.to_string(),
                    family: new_player.family.trim().to_string(),
                    rank: count as i32 + 1,
                })
                .get_result::<Player>(conn)?;

            Ok(player)
        })
    }

    pub fn update(
        player_id: i64,
        changes: UpdatePlayer,
        conn: &db::Conn,
    ) -> Result<Player, ServiceError> {
        if changes.is_empty() {
            return Player::find_by_id(player_id, conn);
        }

        let player = diesel::update(players::table.find(player_id))
            .set(&PlayerChanges::from(changes))
            .get_result::<Player>(conn)?;

        Ok(player)
    }

    /// Deletes a player, removes it from its team and closes the gap it leaves in the ranking
    #[tracing::instrument(name = "Player::delete", skip(conn))]
    pub fn delete(player_id: i64, conn: &db::Conn) -> Result<(), ServiceError> {
        conn.transaction::<(), ServiceError, _>(|| {
            db::lock_table("teams", conn)?;
            db::lock_table("players", conn)?;

            Player::find_by_id(player_id, conn)?;

            Player::leave_teams(player_id, None, conn)?;

            diesel::delete(players::table.find(player_id)).execute(conn)?;

            let remaining = Player::find_all(conn)?;
            Player::apply_ranks(&ranking::compact(&remaining), conn)?;

            Ok(())
        })
    }

    /// Swaps a player with its neighbour in the ranking.
    ///
    /// Moving the first player up or the last player down changes nothing.
    #[tracing::instrument(name = "Player::move_rank", skip(conn))]
    pub fn move_rank(
        player_id: i64,
        direction: Direction,
        conn: &db::Conn,
    ) -> Result<Vec<Player>, ServiceError> {
        conn.transaction::<Vec<Player>, ServiceError, _>(|| {
            db::lock_table("players", conn)?;

            let players = Player::find_all(conn)?;
            if !players.iter().any(|player| player.id == player_id) {
                return Err(ServiceError::NotFound);
            }

            match ranking::plan_move(&players, player_id, direction) {
                Some(updates) => {
                    Player::apply_ranks(&updates, conn)?;
                    Player::find_all(conn)
                }
                None => Ok(players),
            }
        })
    }

    /// Moves a player into a team, or out of every team when `team_id` is `None`.
    ///
    /// The player is removed from its previous team in the same transaction,
    /// so the team's member list and the player's team always agree.
    #[tracing::instrument(name = "Player::assign", skip(conn))]
    pub fn assign(
        player_id: i64,
        team_id: Option<i64>,
        conn: &db::Conn,
    ) -> Result<Player, ServiceError> {
        conn.transaction::<Player, ServiceError, _>(|| {
            db::lock_table("teams", conn)?;
            db::lock_table("players", conn)?;

            Player::find_by_id(player_id, conn)?;

            if let Some(team_id) = team_id {
                let player_ids = teams::table
                    .find(team_id)
                    .select(teams::player_ids)
                    .first::<Vec<i64>>(conn)?;

                let joined = members::with(&player_ids, player_id)?;
                if joined != player_ids {
                    diesel::update(teams::table.find(team_id))
                        .set(teams::player_ids.eq(joined))
                        .execute(conn)?;
                }
            }

            Player::leave_teams(player_id, team_id, conn)?;

            let player = diesel::update(players::table.find(player_id))
                .set(players::team_id.eq(team_id))
                .get_result::<Player>(conn)?;

            Ok(player)
        })
    }

    /// removes the player from every team listing it, except `keep`
    fn leave_teams(player_id: i64, keep: Option<i64>, conn: &db::Conn) -> Result<(), ServiceError> {
        let memberships = teams::table
            .filter(teams::player_ids.contains(vec![player_id]))
            .select((teams::id, teams::player_ids))
            .load::<(i64, Vec<i64>)>(conn)?;

        for (team_id, player_ids) in memberships {
            if Some(team_id) == keep {
                continue;
            }

            debug!("removing player {} from team {}", player_id, team_id);
            diesel::update(teams::table.find(team_id))
                .set(teams::player_ids.eq(members::without(&player_ids, player_id)))
                .execute(conn)?;
        }

        Ok(())
    }

    fn apply_ranks(updates: &[RankUpdate], conn: &db::Conn) -> Result<(), ServiceError> {
        for update in updates {
            diesel::update(players::table.find(update.id))
                .set(players::rank.eq(update.rank))
                .execute(conn)?;
        }

        Ok(())
    }
}

impl UpdatePlayer {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.skill_level.is_none()
            && self.gender.is_none()
            && self.family.is_none()
    }
}

impl From<UpdatePlayer> for PlayerChanges {
    fn from(changes: UpdatePlayer) -> Self {
        PlayerChanges {
            name: changes.name.map(|name| name.trim().to_string()),
            skill_level: changes.skill_level,
            gender: changes.gender.map(|gender| gender.to_string()),
            family: changes.family.map(|family| family.trim().to_string()),
        }
    }
}

fn validate_skill_level(skill_level: i16) -> Result<(), ServiceError> {
    if !(MIN_SKILL_LEVEL..=MAX_SKILL_LEVEL).contains(&skill_level) {
        bad_request!(format!(
            "the skill level should be within [{}-{}]",
            MIN_SKILL_LEVEL, MAX_SKILL_LEVEL
        ));
    }
    Ok(())
}

impl crate::validator::Validate<CreatePlayer> for CreatePlayer {
    fn validate(&self) -> Result<(), ServiceError> {
        validate_name("name", &self.name)?;
        validate_name("family", &self.family)?;
        validate_skill_level(self.skill_level)
    }
}

impl crate::validator::Validate<UpdatePlayer> for UpdatePlayer {
    fn validate(&self) -> Result<(), ServiceError> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }

        if let Some(family) = &self.family {
            validate_name("family", family)?;
        }

        if let Some(skill_level) = self.skill_level {
            validate_skill_level(skill_level)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teams::{CreateTeam, Team};
    use crate::validator::Validator;

    fn ricky() -> CreatePlayer {
        CreatePlayer {
            name: String::from("Ricky"),
            skill_level: 3,
            gender: Gender::Male,
            family: String::from("Miller"),
        }
    }

    #[test]
    fn valid_player() {
        assert!(Validator::new(ricky()).validate().is_ok());
    }

    #[test]
    fn skill_level_bounds() {
        let mut player = ricky();

        player.skill_level = 0;
        assert!(Validator::new(player.clone()).validate().is_err());

        player.skill_level = 6;
        assert!(Validator::new(player.clone()).validate().is_err());

        player.skill_level = 5;
        assert!(Validator::new(player.clone()).validate().is_ok());

        player.skill_level = 1;
        assert!(Validator::new(player).validate().is_ok());
    }

    #[test]
    fn blank_names_and_families_are_rejected() {
        let mut player = ricky();
        player.name = String::from("  ");
        assert!(Validator::new(player).validate().is_err());

        let mut player = ricky();
        player.family = String::new();
        assert!(Validator::new(player).validate().is_err());
    }

    #[test]
    fn partial_updates_only_validate_sent_fields() {
        let update = UpdatePlayer {
            skill_level: Some(4),
            ..Default::default()
        };
        assert!(Validator::new(update).validate().is_ok());

        let update = UpdatePlayer {
            skill_level: Some(9),
            ..Default::default()
        };
        assert!(Validator::new(update).validate().is_err());

        let update = UpdatePlayer {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(Validator::new(update).validate().is_err());
    }

    #[test]
    fn empty_updates_are_detected() {
        assert!(UpdatePlayer::default().is_empty());
        assert!(!UpdatePlayer {
            gender: Some(Gender::Female),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn changes_are_trimmed() {
        let changes = PlayerChanges::from(UpdatePlayer {
            name: Some(String::from("  Ricky Bobby ")),
            gender: Some(Gender::Female),
            ..Default::default()
        });

        assert_eq!(changes.name.as_deref(), Some("Ricky Bobby"));
        assert_eq!(changes.gender.as_deref(), Some("Female"));
        assert!(changes.family.is_none());
    }

    #[test]
    fn players_use_camel_case_on_the_wire() {
        let player = Player {
            id: 1,
            name: String::from("Ricky"),
            skill_level: 3,
            gender: Gender::Male.to_string(),
            family: String::from("Miller"),
            rank: 1,
            team_id: None,
            created_at: Utc::now(),
            updated_at: None,
        };

        let json = serde_json::to_value(&player).unwrap();

        assert_eq!(json["skillLevel"], 3);
        assert_eq!(json["gender"], "Male");
        assert!(json["teamId"].is_null());
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn assignments_accept_null() {
        let assignment: TeamAssignment = serde_json::from_str(r#"{ "teamId": null }"#).unwrap();
        assert!(assignment.team_id.is_none());

        let assignment: TeamAssignment = serde_json::from_str(r#"{ "teamId": 4 }"#).unwrap();
        assert_eq!(assignment.team_id, Some(4));
    }

    fn sign(name: &str, conn: &db::Conn) -> Player {
        let player = CreatePlayer {
            name: name.to_string(),
            ..ricky()
        };

        Player::create(player, conn).unwrap()
    }

    fn found(name: &str, conn: &db::Conn) -> Team {
        let team = CreateTeam {
            name: name.to_string(),
        };

        Team::create(team, conn).unwrap()
    }

    fn assert_contiguous(conn: &db::Conn) {
        let ranks: Vec<i32> = Player::find_all(conn)
            .unwrap()
            .iter()
            .map(|player| player.rank)
            .collect();

        assert_eq!(ranks, (1..=ranks.len() as i32).collect::<Vec<i32>>());
    }

    #[test]
    fn new_players_are_ranked_last() {
        let conn = match db::testing::connection() {
            Some(conn) => conn,
            None => return,
        };

        let count = Player::count(&conn).unwrap();
        let player = sign("Ricky", &conn);

        assert_eq!(player.rank as i64, count + 1);
        assert!(player.team_id.is_none());
    }

    #[test]
    fn full_teams_reject_players_and_nothing_changes() {
        let conn = match db::testing::connection() {
            Some(conn) => conn,
            None => return,
        };

        let team = found("Net Ninjas", &conn);
        let ricky = sign("Ricky", &conn);
        let cal = sign("Cal", &conn);
        let susan = sign("Susan", &conn);

        Player::assign(ricky.id, Some(team.id), &conn).unwrap();
        Player::assign(cal.id, Some(team.id), &conn).unwrap();

        let error = Player::assign(susan.id, Some(team.id), &conn).unwrap_err();

        assert!(matches!(error, ServiceError::Conflict(_)));
        assert_eq!(
            Team::find_by_id(team.id, &conn).unwrap().player_ids,
            vec![ricky.id, cal.id]
        );
        assert!(Player::find_by_id(susan.id, &conn).unwrap().team_id.is_none());
    }

    #[test]
    fn assigning_the_current_team_changes_nothing() {
        let conn = match db::testing::connection() {
            Some(conn) => conn,
            None => return,
        };

        let team = found("Net Ninjas", &conn);
        let ricky = sign("Ricky", &conn);

        Player::assign(ricky.id, Some(team.id), &conn).unwrap();
        let player = Player::assign(ricky.id, Some(team.id), &conn).unwrap();

        assert_eq!(player.team_id, Some(team.id));
        assert_eq!(Team::find_by_id(team.id, &conn).unwrap().player_ids, vec![ricky.id]);
    }

    #[test]
    fn switching_teams_updates_both_member_lists() {
        let conn = match db::testing::connection() {
            Some(conn) => conn,
            None => return,
        };

        let first = found("Net Ninjas", &conn);
        let second = found("Rally Rebels", &conn);
        let ricky = sign("Ricky", &conn);

        Player::assign(ricky.id, Some(first.id), &conn).unwrap();
        let player = Player::assign(ricky.id, Some(second.id), &conn).unwrap();

        assert_eq!(player.team_id, Some(second.id));
        assert!(Team::find_by_id(first.id, &conn).unwrap().player_ids.is_empty());
        assert_eq!(Team::find_by_id(second.id, &conn).unwrap().player_ids, vec![ricky.id]);

        let player = Player::assign(ricky.id, None, &conn).unwrap();

        assert!(player.team_id.is_none());
        assert!(Team::find_by_id(second.id, &conn).unwrap().player_ids.is_empty());
    }

    #[test]
    fn deleted_players_leave_their_team_and_the_ranking() {
        let conn = match db::testing::connection() {
            Some(conn) => conn,
            None => return,
        };

        let team = found("Net Ninjas", &conn);
        let ricky = sign("Ricky", &conn);
        let cal = sign("Cal", &conn);
        sign("Susan", &conn);

        Player::assign(ricky.id, Some(team.id), &conn).unwrap();
        Player::assign(cal.id, Some(team.id), &conn).unwrap();

        Player::delete(cal.id, &conn).unwrap();

        assert_eq!(Team::find_by_id(team.id, &conn).unwrap().player_ids, vec![ricky.id]);
        assert_eq!(
            Player::find_by_id(cal.id, &conn).unwrap_err(),
            ServiceError::NotFound
        );
        assert_contiguous(&conn);
    }

    #[test]
    fn moving_swaps_neighbours() {
        let conn = match db::testing::connection() {
            Some(conn) => conn,
            None => return,
        };

        let ricky = sign("Ricky", &conn);
        let cal = sign("Cal", &conn);

        let players = Player::move_rank(cal.id, Direction::Up, &conn).unwrap();
        let ids: Vec<i64> = players.iter().map(|player| player.id).collect();

        assert_eq!(ids[ids.len() - 2..], [cal.id, ricky.id]);
        assert_contiguous(&conn);

        // the last player can't move further down
        let unchanged = Player::move_rank(ricky.id, Direction::Down, &conn).unwrap();
        assert_eq!(unchanged.last().map(|player| player.id), Some(ricky.id));
    }
}
