//! Rank bookkeeping shared by players and teams.
//!
//! Ranks are 1-based and kept contiguous: every operation that reorders or
//! removes items renumbers the remaining ones to `1..=N`.

/// Which way an item moves in the ranking.
///
/// `Up` moves toward rank 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    fn offset(self) -> isize {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
        }
    }
}

/// **POST /api/{players,teams}/{id}/move**
///
/// ``` shell
/// curl --location --request POST 'localhost:8080/api/players/3/move' \
///     --header 'Content-Type: application/json' \
///     --data-raw '{ "direction": "up" }'
/// ```
#[derive(Debug, Deserialize)]
pub struct MoveMessage {
    pub direction: Direction,
}

pub trait Ranked {
    fn id(&self) -> i64;
    fn rank(&self) -> i32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankUpdate {
    pub id: i64,
    pub rank: i32,
}

/// (id, rank) pairs sorted by rank, ties are broken by id
fn ordered<T: Ranked>(items: &[T]) -> Vec<(i64, i32)> {
    let mut order: Vec<(i64, i32)> = items.iter().map(|item| (item.id(), item.rank())).collect();
    order.sort_by_key(|&(id, rank)| (rank, id));
    order
}

/// Returns the rank changes needed to move `id` one place in `direction`.
///
/// `None` when the item doesn't exist or would leave the ranking.
pub fn plan_move<T: Ranked>(items: &[T], id: i64, direction: Direction) -> Option<Vec<RankUpdate>> {
    let mut order = ordered(items);

    let current = order.iter().position(|&(item, _)| item == id)?;
    let target = current as isize + direction.offset();

    if target < 0 || target as usize >= order.len() {
        return None;
    }

    order.swap(current, target as usize);

    Some(renumber(&order))
}

/// Returns the rank changes that close gaps and duplicates while keeping the order
pub fn compact<T: Ranked>(items: &[T]) -> Vec<RankUpdate> {
    renumber(&ordered(items))
}

fn renumber(order: &[(i64, i32)]) -> Vec<RankUpdate> {
    order
        .iter()
        .enumerate()
        .filter_map(|(index, &(id, rank))| {
            let new_rank = index as i32 + 1;
            if rank == new_rank {
                None
            } else {
                Some(RankUpdate { id, rank: new_rank })
            }
        })
        .collect()
}
