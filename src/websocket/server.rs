use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use actix::prelude::*;
use actix_web::web;
use rand::{self, rngs::ThreadRng, Rng};

use crate::errors::ServiceError;
use crate::players::Player;
use crate::teams::TeamResponse;
use crate::websocket::{Snapshots, Topic};

type SessionId = usize;

/// Registers a session, which then receives the current snapshot of every collection
#[derive(Message)]
#[rtype(usize)]
pub struct Connect {
    pub addr: Recipient<Notification>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: SessionId,
}

#[derive(Message)]
#[rtype(usize)]
pub struct ActiveSessionCount;

/// Loads the given collections and broadcasts them to every session
#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct Publish {
    pub topics: Vec<Topic>,
}

/// A snapshot of one collection, as it is sent to the clients:
///
/// ``` json
/// { "type": "players", "data": [ { "id": 1, "name": "Ricky", ... } ] }
/// ```
#[derive(Message, Debug, Clone, Serialize)]
#[rtype(result = "()")]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Notification {
    Players(Vec<Player>),
    Teams(Vec<TeamResponse>),
}

/// `NotificationServer` fans collection snapshots out to the websocket sessions.
///
/// Snapshots are loaded while the server handles a message and no other message
/// is handled until they're sent, so sessions always receive them in the order
/// they were read.
pub struct NotificationServer {
    sessions: HashMap<SessionId, Recipient<Notification>>,
    snapshots: Arc<dyn Snapshots>,
    rng: ThreadRng,
}

impl NotificationServer {
    pub fn new<S: Snapshots + 'static>(snapshots: S) -> NotificationServer {
        NotificationServer {
            sessions: HashMap::new(),
            snapshots: Arc::new(snapshots),
            rng: rand::thread_rng(),
        }
    }

    fn broadcast(&mut self, notification: Notification) {
        let mut stale: Vec<SessionId> = Vec::new();

        for (id, addr) in &self.sessions {
            if addr.do_send(notification.clone()).is_err() {
                stale.push(*id);
            }
        }

        for id in stale {
            debug!("dropping unreachable websocket session {}", id);
            self.sessions.remove(&id);
        }
    }

    /// reads the snapshots on the blocking threadpool
    fn load(
        &self,
        topics: Vec<Topic>,
    ) -> impl Future<Output = Result<Vec<Notification>, ServiceError>> {
        let snapshots = self.snapshots.clone();

        async move {
            let notifications = web::block(move || {
                topics
                    .into_iter()
                    .map(|topic| snapshots.load(topic))
                    .collect::<Result<Vec<Notification>, ServiceError>>()
            })
            .await?;

            Ok(notifications)
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Actor for NotificationServer {
    type Context = Context<Self>;
}

/// Register new session and assign unique id to this session
impl Handler<Connect> for NotificationServer {
    type Result = usize;

    fn handle(&mut self, msg: Connect, ctx: &mut Context<Self>) -> Self::Result {
        let id = loop {
            let id = self.rng.gen::<SessionId>();
            if !self.sessions.contains_key(&id) {
                break id;
            }
        };

        let addr = msg.addr.clone();
        self.sessions.insert(id, msg.addr);

        // the session is registered before anything is read,
        // changes made from here on are published to it as well
        self.load(Topic::ALL.to_vec())
            .into_actor(self)
            .then(move |res, _, _| {
                match res {
                    Ok(notifications) => {
                        for notification in notifications {
                            let _ = addr.do_send(notification);
                        }
                    }
                    Err(e) => error!("unable to load the initial snapshots: {}", e),
                }
                fut::ready(())
            })
            .wait(ctx);

        id
    }
}

impl Handler<Disconnect> for NotificationServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        self.sessions.remove(&msg.id);
    }
}

impl Handler<ActiveSessionCount> for NotificationServer {
    type Result = usize;

    fn handle(&mut self, _: ActiveSessionCount, _: &mut Context<Self>) -> Self::Result {
        self.session_count()
    }
}

impl Handler<Publish> for NotificationServer {
    type Result = ();

    fn handle(&mut self, msg: Publish, ctx: &mut Context<Self>) {
        self.load(msg.topics)
            .into_actor(self)
            .then(|res, act, _| {
                match res {
                    Ok(notifications) => {
                        for notification in notifications {
                            act.broadcast(notification);
                        }
                    }
                    Err(e) => error!("unable to publish the latest snapshots: {}", e),
                }
                fut::ready(())
            })
            .wait(ctx);
    }
}
