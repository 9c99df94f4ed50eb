use serde::{Deserialize, Serialize};

use crate::SensorRecord;

/// Connection states reported by the managed real-time client.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Connected,
    ConnectedPendingNetwork,
    ConnectionDisrupted,
    ConnectionDisruptedPendingNetwork,
    Connecting,
    ConnectedPendingDisconnect,
    Disconnected,
    ConnectedPendingKeepAlive,
}

/// What a connection state means for the status line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusChange {
    /// Show this message.
    Show(&'static str),
    /// Remove any message.
    Clear,
    /// Leave the status line as it is.
    Keep,
}

impl ConnectionState {
    pub fn status_change(self) -> StatusChange {
        match self {
            ConnectionState::Connecting => StatusChange::Show("Connecting…"),
            ConnectionState::ConnectionDisrupted => {
                StatusChange::Show("Connection lost. Reconnecting…")
            }
            ConnectionState::ConnectionDisruptedPendingNetwork => {
                StatusChange::Show("Network unavailable. Reconnecting…")
            }
            ConnectionState::Disconnected => StatusChange::Show("Disconnected. Please reload."),
            ConnectionState::Connected => StatusChange::Clear,
            ConnectionState::ConnectedPendingNetwork
            | ConnectionState::ConnectedPendingDisconnect
            | ConnectionState::ConnectedPendingKeepAlive => StatusChange::Keep,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Connected => "Connected",
            ConnectionState::ConnectedPendingNetwork => "ConnectedPendingNetwork",
            ConnectionState::ConnectionDisrupted => "ConnectionDisrupted",
            ConnectionState::ConnectionDisruptedPendingNetwork => {
                "ConnectionDisruptedPendingNetwork"
            }
            ConnectionState::Connecting => "Connecting",
            ConnectionState::ConnectedPendingDisconnect => "ConnectedPendingDisconnect",
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::ConnectedPendingKeepAlive => "ConnectedPendingKeepAlive",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a real-time channel can push to the dashboard.
///
/// Serialized as `{"type": "sample" | "connectionState" | "error", "payload": ...}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum StreamEvent {
    Sample(SensorRecord),
    ConnectionState(ConnectionState),
    Error(String),
}

/// Receiver side of a subscription.
///
/// Implemented by whatever consumes the channel: the dashboard state itself,
/// or a queue that hands the events over to the UI thread.
pub trait StreamListener {
    fn on_sample(&mut self, record: SensorRecord);

    fn on_connection_state_change(&mut self, state: ConnectionState);

    fn on_error(&mut self, message: String);

    /// Dispatches a tagged event to the matching callback.
    fn on_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Sample(record) => self.on_sample(record),
            StreamEvent::ConnectionState(state) => self.on_connection_state_change(state),
            StreamEvent::Error(message) => self.on_error(message),
        }
    }
}

impl StreamListener for Vec<StreamEvent> {
    fn on_sample(&mut self, record: SensorRecord) {
        self.push(StreamEvent::Sample(record));
    }

    fn on_connection_state_change(&mut self, state: ConnectionState) {
        self.push(StreamEvent::ConnectionState(state));
    }

    fn on_error(&mut self, message: String) {
        self.push(StreamEvent::Error(message));
    }
}

/// Hands events over to another thread, typically the UI event loop.
impl StreamListener for std::sync::mpsc::Sender<StreamEvent> {
    fn on_sample(&mut self, record: SensorRecord) {
        self.on_event(StreamEvent::Sample(record));
    }

    fn on_connection_state_change(&mut self, state: ConnectionState) {
        self.on_event(StreamEvent::ConnectionState(state));
    }

    fn on_error(&mut self, message: String) {
        self.on_event(StreamEvent::Error(message));
    }

    fn on_event(&mut self, event: StreamEvent) {
        if self.send(event).is_err() {
            log::debug!("Event receiver is gone, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_use_tagged_json() {
        let event: StreamEvent = serde_json::from_str(
            r#"{"type": "connectionState", "payload": "ConnectionDisrupted"}"#,
        )
        .unwrap();
        assert_eq!(event, StreamEvent::ConnectionState(ConnectionState::ConnectionDisrupted));

        let event: StreamEvent =
            serde_json::from_str(r#"{"type": "error", "payload": "socket closed"}"#).unwrap();
        assert_eq!(event, StreamEvent::Error("socket closed".into()));

        let event: StreamEvent = serde_json::from_str(
            r#"{"type": "sample", "payload": {"thingId": "M5StackCore2", "ts": "2024-05-01T12:00:00Z", "temperature": 24.1}}"#,
        )
        .unwrap();
        let StreamEvent::Sample(record) = event else {
            panic!("expected a sample event");
        };
        assert_eq!(record.temperature, Some(24.1));
    }

    #[test]
    fn display_matches_wire_name() {
        let state: ConnectionState = serde_json::from_str("\"ConnectedPendingKeepAlive\"").unwrap();
        assert_eq!(state.to_string(), "ConnectedPendingKeepAlive");
    }

    #[test]
    fn status_changes() {
        assert_eq!(ConnectionState::Connected.status_change(), StatusChange::Clear);
        assert_eq!(
            ConnectionState::Disconnected.status_change(),
            StatusChange::Show("Disconnected. Please reload.")
        );
        assert_eq!(ConnectionState::ConnectedPendingNetwork.status_change(), StatusChange::Keep);
    }

    #[test]
    fn vec_listener_records_events_in_order() {
        let mut events = Vec::new();
        events.on_connection_state_change(ConnectionState::Connecting);
        events.on_event(StreamEvent::Error("boom".into()));
        assert_eq!(
            events,
            vec![
                StreamEvent::ConnectionState(ConnectionState::Connecting),
                StreamEvent::Error("boom".into()),
            ]
        );
    }
}
