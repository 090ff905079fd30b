use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::db;
use crate::errors::ServiceError;
use crate::ranking::{self, Direction, RankUpdate, Ranked};
use crate::schema::{players, teams};
use crate::teams::{members, palette};
use crate::validator::validate_name;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub icon_name: String,
    /// members in the order they joined
    pub player_ids: Vec<i64>,
    pub rank: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A team together with its occupation
///
/// ``` json
/// { "id": 3, "name": "Net Ninjas", "playerIds": [4], "capacity": "1/2", "isFull": false, ... }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamResponse {
    #[serde(flatten)]
    pub team: Team,
    pub capacity: String,
    pub is_full: bool,
}

impl From<Team> for TeamResponse {
    fn from(team: Team) -> Self {
        TeamResponse {
            capacity: members::capacity_text(&team.player_ids),
            is_full: members::is_full(&team.player_ids),
            team,
        }
    }
}

///
/// **POST /api/teams**
///
/// The color and icon are picked by the server, preferring ones no other team uses.
///
/// ``` shell
/// curl --location --request POST 'localhost:8080/api/teams' \
///     --header 'Content-Type: application/json' \
///     --data-raw '{ "name": "Net Ninjas" }'
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeam {
    pub name: String,
}

#[derive(Debug, Insertable)]
#[table_name = "teams"]
struct NewTeam {
    name: String,
    color: String,
    icon_name: String,
    player_ids: Vec<i64>,
    rank: i32,
}

/// **PUT /api/teams/{id}**
///
/// Only the fields that are sent are changed.
/// Colors and icons have to come from the fixed palette.
#[derive(Debug, Clone, Default, Deserialize, AsChangeset)]
#[serde(rename_all = "camelCase")]
#[table_name = "teams"]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NameSuggestion {
    pub name: &'static str,
}

impl Ranked for Team {
    fn id(&self) -> i64 {
        self.id
    }

    fn rank(&self) -> i32 {
        self.rank
    }
}

impl Team {
    pub fn find_all(conn: &db::Conn) -> Result<Vec<Team>, ServiceError> {
        let teams = teams::table
            .order((teams::rank, teams::id))
            .load::<Team>(conn)?;

        Ok(teams)
    }

    pub fn find_by_id(team_id: i64, conn: &db::Conn) -> Result<Team, ServiceError> {
        let team = teams::table.find(team_id).first::<Team>(conn)?;

        Ok(team)
    }

    pub fn count(conn: &db::Conn) -> Result<i64, ServiceError> {
        let count = teams::table.count().get_result::<i64>(conn)?;

        Ok(count)
    }

    /// Creates an empty team at the bottom of the ranking with an unused color and icon
    pub fn create(new_team: CreateTeam, conn: &db::Conn) -> Result<Team, ServiceError> {
        conn.transaction::<Team, ServiceError, _>(|| {
            db::lock_table("teams", conn)?;

            let identities = teams::table
                .select((teams::color, teams::icon_name))
                .load::<(String, String)>(conn)?;
            let used_colors: Vec<&str> = identities.iter().map(|(color, _)| color.as_str()).collect();
            let used_icons: Vec<&str> = identities.iter().map(|(_, icon)| icon.as_str()).collect();

            let max_rank = teams::table
                .select(diesel::dsl::max(teams::rank))
                .first::<Option<i32>>(conn)?;

            let mut rng = rand::thread_rng();

            let team = diesel::insert_into(teams::table)
                .values(&NewTeam {
                    name: new_team.name.trim().to_string(),
                    color: palette::pick_color(&used_colors, &mut rng).to_string(),
                    icon_name: palette::pick_icon(&used_icons, &mut rng).to_string(),
                    player_ids: Vec::new(),
                    rank: max_rank.unwrap_or(0) + 1,
                })
                .get_result::<Team>(conn)?;

            Ok(team)
        })
    }

    pub fn update(team_id: i64, changes: UpdateTeam, conn: &db::Conn) -> Result<Team, ServiceError> {
        let changes = changes.normalized();
        if changes.is_empty() {
            return Team::find_by_id(team_id, conn);
        }

        let team = diesel::update(teams::table.find(team_id))
            .set(&changes)
            .get_result::<Team>(conn)?;

        Ok(team)
    }

    /// Deletes a team after unassigning all of its players, the remaining teams are re-ranked
    #[tracing::instrument(name = "Team::delete", skip(conn))]
    pub fn delete(team_id: i64, conn: &db::Conn) -> Result<(), ServiceError> {
        conn.transaction::<(), ServiceError, _>(|| {
            db::lock_table("teams", conn)?;
            db::lock_table("players", conn)?;

            let team = Team::find_by_id(team_id, conn)?;

            let unassigned = diesel::update(
                players::table.filter(
                    players::team_id
                        .eq(team.id)
                        .or(players::id.eq_any(team.player_ids.clone())),
                ),
            )
            .set(players::team_id.eq(None::<i64>))
            .execute(conn)?;
            debug!("unassigned {} players from team {}", unassigned, team.id);

            diesel::delete(teams::table.find(team.id)).execute(conn)?;

            let remaining = Team::find_all(conn)?;
            Team::apply_ranks(&ranking::compact(&remaining), conn)?;

            Ok(())
        })
    }

    /// Swaps a team with its neighbour in the ranking.
    ///
    /// Moving the first team up or the last team down changes nothing.
    #[tracing::instrument(name = "Team::move_rank", skip(conn))]
    pub fn move_rank(
        team_id: i64,
        direction: Direction,
        conn: &db::Conn,
    ) -> Result<Vec<Team>, ServiceError> {
        conn.transaction::<Vec<Team>, ServiceError, _>(|| {
            db::lock_table("teams", conn)?;

            let teams = Team::find_all(conn)?;
            if !teams.iter().any(|team| team.id == team_id) {
                return Err(ServiceError::NotFound);
            }

            match ranking::plan_move(&teams, team_id, direction) {
                Some(updates) => {
                    Team::apply_ranks(&updates, conn)?;
                    Team::find_all(conn)
                }
                None => Ok(teams),
            }
        })
    }

    /// Deals every team a new color and icon from freshly shuffled pools
    #[tracing::instrument(name = "Team::randomize", skip(conn))]
    pub fn randomize(conn: &db::Conn) -> Result<Vec<Team>, ServiceError> {
        conn.transaction::<Vec<Team>, ServiceError, _>(|| {
            db::lock_table("teams", conn)?;

            let teams = Team::find_all(conn)?;
            let identities = palette::deal(teams.len(), &mut rand::thread_rng());

            for (team, identity) in teams.iter().zip(identities) {
                diesel::update(teams::table.find(team.id))
                    .set((
                        teams::color.eq(identity.color),
                        teams::icon_name.eq(identity.icon_name),
                    ))
                    .execute(conn)?;
            }

            Team::find_all(conn)
        })
    }

    /// suggests a name from the fixed list that no team is using yet
    pub fn suggest_name(conn: &db::Conn) -> Result<NameSuggestion, ServiceError> {
        let names = teams::table.select(teams::name).load::<String>(conn)?;
        let used: Vec<&str> = names.iter().map(|name| name.as_str()).collect();

        Ok(NameSuggestion {
            name: palette::pick_name(&used, &mut rand::thread_rng()),
        })
    }

    fn apply_ranks(updates: &[RankUpdate], conn: &db::Conn) -> Result<(), ServiceError> {
        for update in updates {
            diesel::update(teams::table.find(update.id))
                .set(teams::rank.eq(update.rank))
                .execute(conn)?;
        }

        Ok(())
    }
}

impl UpdateTeam {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.icon_name.is_none()
    }

    /// trims the name and maps the color onto its palette spelling
    fn normalized(self) -> UpdateTeam {
        UpdateTeam {
            name: self.name.map(|name| name.trim().to_string()),
            color: self
                .color
                .map(|color| palette::color(&color).map(str::to_string).unwrap_or(color)),
            icon_name: self.icon_name,
        }
    }
}

impl crate::validator::Validate<CreateTeam> for CreateTeam {
    fn validate(&self) -> Result<(), ServiceError> {
        validate_name("name", &self.name)
    }
}

impl crate::validator::Validate<UpdateTeam> for UpdateTeam {
    fn validate(&self) -> Result<(), ServiceError> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }

        if let Some(color) = &self.color {
            if palette::color(color).is_none() {
                bad_request!(format!("{} is not one of the team colors", color));
            }
        }

        if let Some(icon_name) = &self.icon_name {
            if palette::icon(icon_name).is_none() {
                bad_request!(format!("{} is not one of the team icons", icon_name));
            }
        }

        Ok(())
    }
}
