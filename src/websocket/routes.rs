use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::web::{Data, Payload};
use actix_web::{get, web, HttpRequest};
use actix_web_actors::ws;

use crate::server::Response;
use crate::websocket::server;
use crate::websocket::Notification;

/// How often heartbeat pings are sent
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
/// How long before lack of client response causes a timeout
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Subscribes to the players and teams collections.
///
/// The current snapshots are sent right after connecting, later snapshots follow every change.
#[get("/ws")]
async fn subscribe(
    req: HttpRequest,
    stream: Payload,
    notifier: Data<Addr<server::NotificationServer>>,
) -> Response {
    ws::start(
        WebsocketConnection {
            id: 0,
            hb: Instant::now(),
            notifier: notifier.get_ref().clone(),
        },
        &req,
        stream,
    )
    .map_err(|e| e.into())
}

struct WebsocketConnection {
    /// unique session id
    /// Get's filled in when connecting
    id: usize,
    /// Client must send ping at least once per 10 seconds (CLIENT_TIMEOUT),
    /// otherwise we drop connection.
    hb: Instant,
    notifier: Addr<server::NotificationServer>,
}

impl Actor for WebsocketConnection {
    type Context = ws::WebsocketContext<Self>;

    /// Method is called on actor start.
    /// We register ws session with NotificationServer
    fn started(&mut self, ctx: &mut Self::Context) {
        self.hb(ctx);

        // `AsyncContext::wait` blocks other events until the session has an id,
        // the notification server follows up with the current snapshots
        let addr = ctx.address();
        self.notifier
            .send(server::Connect {
                addr: addr.recipient(),
            })
            .into_actor(self)
            .then(|res, act, ctx| {
                match res {
                    Ok(res) => act.id = res,
                    // something is wrong with notification server
                    Err(e) => {
                        error!("unable to start websocket connection: {}", e);
                        ctx.stop();
                    }
                }
                fut::ready(())
            })
            .wait(ctx);
        debug!("websocket session connected");
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.notifier.do_send(server::Disconnect { id: self.id });
        Running::Stop
    }
}

fn send(notification: Notification, ctx: &mut ws::WebsocketContext<WebsocketConnection>) {
    match serde_json::to_string(&notification) {
        Ok(json) => ctx.text(json),
        Err(error) => error!(
            "unable to serialize websocket message: {:?}, error: {}",
            notification, error
        ),
    }
}

/// Handle messages from server, we simply send it to peer websocket
impl Handler<Notification> for WebsocketConnection {
    type Result = ();

    fn handle(&mut self, notification: Notification, ctx: &mut Self::Context) {
        send(notification, ctx);
    }
}

/// Clients only listen, anything but control frames closes the session
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WebsocketConnection {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let msg = match msg {
            Err(error) => {
                error!("Invalid websocket protocol message: {}", error);
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Protocol)));
                ctx.stop();
                return;
            }
            Ok(msg) => msg,
        };

        trace!("Websocket received message: {:?}", msg);
        match msg {
            ws::Message::Ping(msg) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            ws::Message::Pong(_) => {
                self.hb = Instant::now();
            }
            ws::Message::Text(_) | ws::Message::Binary(_) => {
                debug!("closing websocket session after an unexpected message");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Unsupported)));
                ctx.stop();
            }
            ws::Message::Close(reason) => {
                ctx.close(reason);
                ctx.stop();
            }
            ws::Message::Continuation(_) => {
                ctx.stop();
            }
            ws::Message::Nop => (),
        }
    }
}

impl WebsocketConnection {
    /// sends a ping every HEARTBEAT_INTERVAL and drops clients that stopped answering
    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                warn!("Websocket Client heartbeat failed, disconnecting!");

                act.notifier.do_send(server::Disconnect { id: act.id });

                ctx.stop();

                // don't try to send a ping
                return;
            }

            ctx.ping(b"");
        });
    }
}

pub fn register(cfg: &mut web::ServiceConfig) {
    cfg.service(subscribe);
}
