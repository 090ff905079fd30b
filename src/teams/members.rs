use crate::errors::ServiceError;

/// the amount of players a team can hold
pub const TEAM_CAPACITY: usize = 2;

pub fn is_full(player_ids: &[i64]) -> bool {
    player_ids.len() >= TEAM_CAPACITY
}

/// formats the occupation of a team, eg: "1/2"
pub fn capacity_text(player_ids: &[i64]) -> String {
    format!("{}/{}", player_ids.len(), TEAM_CAPACITY)
}

/// returns the member list without `player_id`
pub fn without(player_ids: &[i64], player_id: i64) -> Vec<i64> {
    player_ids
        .iter()
        .copied()
        .filter(|id| *id != player_id)
        .collect()
}

/// Appends `player_id` to the member list.
///
/// Members keep the order in which they joined, adding an existing member changes nothing.
pub fn with(player_ids: &[i64], player_id: i64) -> Result<Vec<i64>, ServiceError> {
    if player_ids.contains(&player_id) {
        return Ok(player_ids.to_vec());
    }

    if is_full(player_ids) {
        conflict!(format!(
            "this team is full, a team can have at most {} players",
            TEAM_CAPACITY
        ));
    }

    let mut members = player_ids.to_vec();
    members.push(player_id);
    Ok(members)
}
