//! Live updates for subscribed clients.
//!
//! Every mutation is followed by a fresh snapshot of the collections it touched,
//! pushed to all connected websocket sessions.

use actix::Addr;

use crate::db;
use crate::errors::ServiceError;
use crate::players::Player;
use crate::teams::{Team, TeamResponse};

pub mod routes;
pub mod server;

pub use server::{Notification, NotificationServer, Publish};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Players,
    Teams,
}

impl Topic {
    pub const ALL: [Topic; 2] = [Topic::Players, Topic::Teams];
}

/// Where the notification server reads its snapshots from
pub trait Snapshots: Send + Sync {
    fn load(&self, topic: Topic) -> Result<Notification, ServiceError>;
}

impl Snapshots for db::Pool {
    fn load(&self, topic: Topic) -> Result<Notification, ServiceError> {
        let conn = self.get()?;
        snapshot(topic, &conn)
    }
}

/// loads the current, rank ordered content of a collection
pub fn snapshot(topic: Topic, conn: &db::Conn) -> Result<Notification, ServiceError> {
    let notification = match topic {
        Topic::Players => Notification::Players(Player::find_all(conn)?),
        Topic::Teams => Notification::Teams(
            Team::find_all(conn)?
                .into_iter()
                .map(TeamResponse::from)
                .collect(),
        ),
    };

    Ok(notification)
}

/// Asks the notification server to send fresh snapshots of `topics` to every session.
///
/// Call it after the change is committed, the snapshots are read when the server gets to it.
pub fn publish(notifier: &Addr<NotificationServer>, topics: &[Topic]) {
    notifier.do_send(Publish {
        topics: topics.to_vec(),
    });
}
