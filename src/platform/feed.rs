use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::AppError;
use crate::models::event::GatewayEvent;

/// Opcodes for gateway frames.
pub mod opcode {
    pub const EVENT: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const HEARTBEAT_ACK: u8 = 4;
    pub const HELLO: u8 = 5;
}

/// Gateway frame envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct Frame {
    pub op: u8,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Websocket event feed. One `run` call is one connection; the caller owns
/// the reconnect loop.
pub struct EventFeed {
    url: String,
    token: String,
}

impl EventFeed {
    pub fn new(url: &str, token: &str) -> Self {
        Self {
            url: url.to_string(),
            token: token.to_string(),
        }
    }

    /// Connects, identifies, and forwards decoded events into `tx` until
    /// the stream ends or errors.
    pub async fn run(&self, tx: mpsc::Sender<GatewayEvent>) -> Result<(), AppError> {
        let (stream, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| AppError::Platform(format!("gateway connect failed: {e}")))?;
        let (mut sink, mut source) = stream.split();

        let identify = serde_json::to_string(&Frame {
            op: opcode::IDENTIFY,
            event_type: None,
            data: Some(json!({ "token": self.token })),
        })
        .map_err(|e| AppError::Internal(e.to_string()))?;
        sink.send(Message::text(identify))
            .await
            .map_err(|e| AppError::Platform(format!("identify failed: {e}")))?;

        let mut heartbeat =
            tokio::time::interval(std::time::Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
        heartbeat.tick().await; // first tick fires immediately

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    let frame = format!(r#"{{"op":{}}}"#, opcode::HEARTBEAT);
                    sink.send(Message::text(frame))
                        .await
                        .map_err(|e| AppError::Platform(format!("heartbeat failed: {e}")))?;
                }
                msg = source.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Some(event) = decode_event(text.as_str()) {
                                if tx.send(event).await.is_err() {
                                    return Ok(());
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            return Err(AppError::Platform("gateway stream closed".to_string()));
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            return Err(AppError::Platform(format!("gateway read error: {e}")));
                        }
                    }
                }
            }
        }
    }
}

/// Decodes an event frame into a GatewayEvent. Unknown opcodes and event
/// types are skipped; a dropped event degrades to unknown attribution
/// downstream rather than failing the feed.
fn decode_event(raw: &str) -> Option<GatewayEvent> {
    let frame: Frame = match serde_json::from_str(raw) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("undecodable gateway frame: {e}");
            return None;
        }
    };
    match frame.op {
        opcode::EVENT => {}
        opcode::HELLO => {
            tracing::debug!("gateway said hello");
            return None;
        }
        opcode::HEARTBEAT_ACK => return None,
        op => {
            tracing::debug!(op, "ignoring gateway frame");
            return None;
        }
    }
    let envelope = json!({
        "type": frame.event_type?,
        "data": frame.data?,
    });
    match serde_json::from_value::<GatewayEvent>(envelope) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!("ignoring gateway event: {e}");
            None
        }
    }
}
