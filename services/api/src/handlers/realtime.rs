//! `GET /ws`: room-scoped realtime feed.
//!
//! Each connection subscribes to the process-wide [`RealtimeHub`] at upgrade
//! time and forwards only the events addressed to rooms it has joined. The
//! server pings every 15s and drops a connection after 45s without client
//! traffic; tests shorten both.

use std::collections::HashSet;
use std::fmt::Display;
use std::time::Duration;

use axum::extract::State;
use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocketUpgrade, close_code};
use axum::response::Response;
use bytes::Bytes;
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use beos_domain::blood::BloodType;

use crate::domain::types::Room;
use crate::infra::realtime::{RealtimeHub, RoomEvent};

#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(45);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(300);

const CONNECTED_MESSAGE: &str = "Connected to BEOS backend";

pub async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<RealtimeHub>) -> Response {
    // Subscribe before the upgrade completes so nothing published in between is lost.
    let events = hub.subscribe();
    ws.on_upgrade(move |socket| async move {
        let (sink, stream) = socket.split();
        run_session(sink, stream, events).await;
    })
}

/// Messages a client may send.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
enum ClientMessage {
    JoinCity(String),
    JoinBloodType(BloodType),
    LeaveCity(String),
    LeaveBloodType(BloodType),
}

#[derive(Serialize)]
struct ConnectionAck {
    event: &'static str,
    data: AckData,
}

#[derive(Serialize)]
struct AckData {
    message: &'static str,
}

#[derive(Serialize)]
struct RoomAck<'a> {
    event: &'static str,
    room: &'a str,
}

enum SessionError {
    ClientClosed(Option<CloseFrame>),
    StreamClosed,
    HubClosed,
    HeartbeatTimeout,
    Receive(String),
    InvalidPayload,
    Send(String),
}

struct Session<S> {
    sink: S,
    rooms: HashSet<String>,
}

pub(crate) async fn run_session<S, R, E>(
    sink: S,
    mut stream: R,
    mut events: broadcast::Receiver<RoomEvent>,
) where
    S: Sink<Message> + Unpin,
    S::Error: Display,
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let mut session = Session {
        sink,
        rooms: HashSet::new(),
    };
    let ack = ConnectionAck {
        event: "connection_ack",
        data: AckData {
            message: CONNECTED_MESSAGE,
        },
    };
    if let Err(error) = session.send_json(&ack).await {
        session.shutdown(error).await;
        return;
    }
    debug!("realtime connection opened");

    let mut last_seen = Instant::now();
    let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

    loop {
        let result = tokio::select! {
            _ = heartbeat.tick() => session.on_heartbeat(last_seen).await,
            message = stream.next() => session.on_client_frame(&mut last_seen, message).await,
            event = events.recv() => session.on_room_event(event).await,
        };
        if let Err(error) = result {
            session.shutdown(error).await;
            return;
        }
    }
}

impl<S> Session<S>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    async fn on_heartbeat(&mut self, last_seen: Instant) -> Result<(), SessionError> {
        if last_seen.elapsed() > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }
        self.send(Message::Ping(Bytes::new())).await
    }

    async fn on_client_frame<E: Display>(
        &mut self,
        last_seen: &mut Instant,
        frame: Option<Result<Message, E>>,
    ) -> Result<(), SessionError> {
        let message = match frame {
            None => return Err(SessionError::StreamClosed),
            Some(Err(error)) => return Err(SessionError::Receive(error.to_string())),
            Some(Ok(message)) => message,
        };
        *last_seen = Instant::now();
        match message {
            Message::Text(text) => self.on_text(text.as_str()).await,
            // axum answers pings itself.
            Message::Ping(_) | Message::Pong(_) | Message::Binary(_) => Ok(()),
            Message::Close(frame) => Err(SessionError::ClientClosed(frame)),
        }
    }

    async fn on_text(&mut self, text: &str) -> Result<(), SessionError> {
        let message = match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => message,
            Err(error) => {
                warn!(error = %error, "rejected malformed realtime payload");
                return Err(SessionError::InvalidPayload);
            }
        };
        let (join, room) = match message {
            ClientMessage::JoinCity(city) => (true, Room::city(&city)),
            ClientMessage::LeaveCity(city) => (false, Room::city(&city)),
            ClientMessage::JoinBloodType(bt) => (true, Some(Room::BloodType(bt))),
            ClientMessage::LeaveBloodType(bt) => (false, Some(Room::BloodType(bt))),
        };
        let Some(room) = room else {
            warn!("rejected realtime join with blank city");
            return Err(SessionError::InvalidPayload);
        };
        let room = room.to_string();
        let event = if join {
            self.rooms.insert(room.clone());
            "joined"
        } else {
            self.rooms.remove(&room);
            "left"
        };
        debug!(%room, event, "realtime room membership changed");
        self.send_json(&RoomAck { event, room: &room }).await
    }

    async fn on_room_event(
        &mut self,
        event: Result<RoomEvent, RecvError>,
    ) -> Result<(), SessionError> {
        match event {
            Ok(event) if self.rooms.contains(&event.room) => self.send_json(&event).await,
            Ok(_) => Ok(()),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "realtime connection lagging; events dropped");
                Ok(())
            }
            Err(RecvError::Closed) => Err(SessionError::HubClosed),
        }
    }

    async fn send_json<T: Serialize>(&mut self, payload: &T) -> Result<(), SessionError> {
        match serde_json::to_string(payload) {
            Ok(body) => self.send(Message::Text(body.into())).await,
            Err(error) => {
                warn!(error = %error, "failed to serialize realtime payload");
                Ok(())
            }
        }
    }

    async fn send(&mut self, message: Message) -> Result<(), SessionError> {
        self.sink
            .send(message)
            .await
            .map_err(|e| SessionError::Send(e.to_string()))
    }

    async fn shutdown(mut self, error: SessionError) {
        let close = match error {
            SessionError::HeartbeatTimeout => {
                warn!("realtime heartbeat timeout; closing connection");
                Some(CloseFrame {
                    code: close_code::NORMAL,
                    reason: Utf8Bytes::from_static("heartbeat timeout"),
                })
            }
            SessionError::InvalidPayload => Some(CloseFrame {
                code: close_code::POLICY,
                reason: Utf8Bytes::from_static("invalid payload"),
            }),
            SessionError::HubClosed => Some(CloseFrame {
                code: close_code::AWAY,
                reason: Utf8Bytes::from_static("server shutting down"),
            }),
            SessionError::Receive(error) => {
                warn!(%error, "realtime receive failed");
                None
            }
            SessionError::Send(error) => {
                warn!(%error, "realtime send failed; closing connection");
                None
            }
            SessionError::ClientClosed(frame) => {
                debug!(?frame, "realtime client closed connection");
                None
            }
            SessionError::StreamClosed => None,
        };
        if let Some(frame) = close {
            if let Err(e) = self.sink.send(Message::Close(Some(frame))).await {
                debug!(error = %e, "failed to send realtime close frame");
            }
        }
        debug!("realtime connection closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use serde_json::Value;
    use tokio::task::JoinHandle;

    use crate::domain::repository::Notifier;

    struct Client {
        tx: mpsc::UnboundedSender<Result<Message, axum::Error>>,
        rx: mpsc::UnboundedReceiver<Message>,
        hub: RealtimeHub,
        task: JoinHandle<()>,
    }

    impl Client {
        fn connect() -> Self {
            let hub = RealtimeHub::new();
            let (tx, client_rx) = mpsc::unbounded();
            let (server_tx, rx) = mpsc::unbounded();
            let task = tokio::spawn(run_session(server_tx, client_rx, hub.subscribe()));
            Self { tx, rx, hub, task }
        }

        fn send(&self, payload: Value) {
            self.tx
                .unbounded_send(Ok(Message::Text(payload.to_string().into())))
                .unwrap();
        }

        /// Next non-ping frame from the server.
        async fn next_frame(&mut self) -> Message {
            loop {
                let frame = time::timeout(Duration::from_secs(2), self.rx.next())
                    .await
                    .expect("timed out waiting for frame")
                    .expect("server closed channel");
                if !matches!(frame, Message::Ping(_)) {
                    return frame;
                }
            }
        }

        async fn next_json(&mut self) -> Value {
            match self.next_frame().await {
                Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
                other => panic!("expected text frame, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn should_acknowledge_connection() {
        let mut client = Client::connect();
        let ack = client.next_json().await;
        assert_eq!(ack["event"], "connection_ack");
        assert_eq!(ack["data"]["message"], CONNECTED_MESSAGE);
    }

    #[tokio::test]
    async fn should_forward_only_joined_room_events() {
        let mut client = Client::connect();
        client.next_json().await;

        client.send(serde_json::json!({ "event": "join-city", "data": "Lagos" }));
        let joined = client.next_json().await;
        assert_eq!(joined["event"], "joined");
        assert_eq!(joined["room"], "city_lagos");

        client.hub.publish(
            &Room::city("Abuja").unwrap(),
            "new-emergency",
            serde_json::json!({ "id": 1 }),
        );
        client.hub.publish(
            &Room::city("lagos").unwrap(),
            "new-emergency",
            serde_json::json!({ "id": 2 }),
        );

        let event = client.next_json().await;
        assert_eq!(event["event"], "new-emergency");
        assert_eq!(event["room"], "city_lagos");
        assert_eq!(event["data"]["id"], 2);
    }

    #[tokio::test]
    async fn should_stop_forwarding_after_leave() {
        let mut client = Client::connect();
        client.next_json().await;

        client.send(serde_json::json!({ "event": "join-blood-type", "data": "O-" }));
        client.send(serde_json::json!({ "event": "join-blood-type", "data": "A+" }));
        client.send(serde_json::json!({ "event": "leave-blood-type", "data": "O-" }));
        for expected in ["joined", "joined", "left"] {
            assert_eq!(client.next_json().await["event"], expected);
        }

        client.hub.publish(
            &Room::BloodType(BloodType::ONegative),
            "request-update",
            Value::Null,
        );
        client.hub.publish(
            &Room::BloodType(BloodType::APositive),
            "request-update",
            serde_json::json!({ "id": 9 }),
        );

        let event = client.next_json().await;
        assert_eq!(event["room"], "type_A+");
        assert_eq!(event["data"]["id"], 9);
    }

    #[tokio::test]
    async fn should_close_with_policy_on_unknown_event() {
        let mut client = Client::connect();
        client.next_json().await;

        client.send(serde_json::json!({ "event": "join-planet", "data": "Mars" }));

        match client.next_frame().await {
            Message::Close(Some(frame)) => assert_eq!(frame.code, close_code::POLICY),
            other => panic!("expected close frame, got {other:?}"),
        }
        client.task.await.unwrap();
    }

    #[tokio::test]
    async fn should_close_with_policy_on_unknown_blood_type() {
        let mut client = Client::connect();
        client.next_json().await;

        client.send(serde_json::json!({ "event": "join-blood-type", "data": "C+" }));

        assert!(matches!(
            client.next_frame().await,
            Message::Close(Some(frame)) if frame.code == close_code::POLICY
        ));
    }

    #[tokio::test]
    async fn should_close_idle_connection_after_timeout() {
        let mut client = Client::connect();
        client.next_json().await;

        match client.next_frame().await {
            Message::Close(Some(frame)) => assert_eq!(frame.code, close_code::NORMAL),
            other => panic!("expected close frame, got {other:?}"),
        }
        client.task.await.unwrap();
    }

    #[tokio::test]
    async fn should_end_quietly_when_client_disconnects() {
        let mut client = Client::connect();
        client.next_json().await;

        client.tx.close_channel();
        client.task.await.unwrap();
        while let Some(frame) = client.rx.next().await {
            assert!(matches!(frame, Message::Ping(_)), "unexpected {frame:?}");
        }
    }
}
