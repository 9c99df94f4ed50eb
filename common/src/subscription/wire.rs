//! Decoding of subscription messages as they arrive on the wire.
//!
//! Two shapes are understood: AppSync real-time envelopes
//! (`{"type": "data", "payload": {...}}`) and bare GraphQL responses
//! (`{"data": {"onNewRecord": {...}}}`).

use serde::Deserialize;
use serde_json::Value;

use sensor_dashboard_model::{ConnectionState, SensorRecord, StreamEvent};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported message type `{0}`")]
    UnsupportedType(String),
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RealtimeMessage {
    ConnectionAck {},
    Ka {},
    StartAck {},
    Data {
        #[serde(default)]
        payload: GraphqlResponse,
    },
    Error {
        #[serde(default)]
        payload: GraphqlResponse,
    },
    Complete {},
}

#[derive(Deserialize, Debug, Default)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<SubscriptionData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct SubscriptionData {
    #[serde(default)]
    on_new_record: Option<SensorRecord>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GraphqlError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    error_type: Option<String>,
}

impl GraphqlResponse {
    fn into_event(self) -> Option<StreamEvent> {
        if !self.errors.is_empty() {
            return Some(StreamEvent::Error(join_errors(&self.errors)));
        }
        self.data
            .and_then(|data| data.on_new_record)
            .map(StreamEvent::Sample)
    }
}

fn join_errors(errors: &[GraphqlError]) -> String {
    let messages: Vec<&str> = errors
        .iter()
        .map(|e| match (e.message.as_str(), e.error_type.as_deref()) {
            ("", Some(error_type)) => error_type,
            ("", None) => "unknown error",
            (message, _) => message,
        })
        .collect();
    messages.join("; ")
}

/// Decodes one JSON message.
///
/// Returns `Ok(None)` for messages that carry nothing for the dashboard, such
/// as keep-alives or a data message without a record.
pub fn decode_message(line: &str) -> Result<Option<StreamEvent>, DecodeError> {
    let value: Value = serde_json::from_str(line)?;

    let Some(kind) = value.get("type").and_then(Value::as_str) else {
        let response: GraphqlResponse = serde_json::from_value(value)?;
        return Ok(response.into_event());
    };

    if !matches!(
        kind,
        "connection_ack" | "ka" | "start_ack" | "data" | "error" | "complete"
    ) {
        return Err(DecodeError::UnsupportedType(kind.to_string()));
    }

    let event = match serde_json::from_value::<RealtimeMessage>(value)? {
        RealtimeMessage::ConnectionAck {} => {
            Some(StreamEvent::ConnectionState(ConnectionState::Connected))
        }
        RealtimeMessage::Ka {} | RealtimeMessage::StartAck {} => None,
        RealtimeMessage::Data { payload } => payload.into_event(),
        RealtimeMessage::Error { payload } if payload.errors.is_empty() => {
            Some(StreamEvent::Error("subscription failed".into()))
        }
        RealtimeMessage::Error { payload } => Some(StreamEvent::Error(join_errors(&payload.errors))),
        RealtimeMessage::Complete {} => {
            Some(StreamEvent::ConnectionState(ConnectionState::Disconnected))
        }
    };
    Ok(event)
}
