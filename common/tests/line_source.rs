use std::io::Cursor;
use std::sync::mpsc;
use std::time::Duration;

use sensor_dashboard_common::subscription::LineSource;
use sensor_dashboard_common::{SampleSource, SourceError};
use sensor_dashboard_model::{
    AxisDomain, ConnectionState, DashboardState, Field, StreamEvent, StreamListener,
};

const INPUT: &str = r#"{"type":"connection_ack","payload":{"connectionTimeoutMs":300000}}
{"type":"start_ack","id":"1"}
{"type":"data","id":"1","payload":{"data":{"onNewRecord":{"thingId":"M5StackCore2","ts":"2024-05-01T12:00:00Z","temperature":24.3,"humidity":45.2}}}}
{"type":"ka"}

{"type":"data","id":"1","payload":{"data":{"onNewRecord":{"thingId":"Greenhouse","ts":"2024-05-01T12:00:01Z","temperature":31.0,"humidity":80.0}}}}
this is not json
{"type":"data","id":"1","payload":{"data":{"onNewRecord":{"thingId":"M5StackCore2","ts":"not a time","temperature":99.0}}}}
{"data":{"onNewRecord":{"thingId":"M5StackCore2","ts":"2024-05-01T12:00:05Z","temperature":24.9,"humidity":46.8}}}
"#;

fn collect_events(input: &str) -> Vec<StreamEvent> {
    let source = LineSource::new(Cursor::new(input.to_string()));
    let (sender, receiver) = mpsc::channel::<StreamEvent>();
    let _subscription = source.subscribe("M5StackCore2", Box::new(sender)).unwrap();

    let mut events = Vec::new();
    while let Ok(event) = receiver.recv_timeout(Duration::from_secs(5)) {
        let done = event == StreamEvent::ConnectionState(ConnectionState::Disconnected);
        events.push(event);
        if done {
            break;
        }
    }
    events
}

#[test]
fn line_source_feeds_the_dashboard() {
    let events = collect_events(INPUT);

    assert_eq!(
        events.first(),
        Some(&StreamEvent::ConnectionState(ConnectionState::Connecting))
    );
    assert_eq!(
        events.last(),
        Some(&StreamEvent::ConnectionState(ConnectionState::Disconnected))
    );
    let samples = events
        .iter()
        .filter(|e| matches!(e, StreamEvent::Sample(_)))
        .count();
    assert_eq!(samples, 3, "foreign device filtered, malformed timestamp passed on");

    let mut state = DashboardState::default();
    state.subscription_started();
    for event in events.iter().take(events.len() - 1).cloned() {
        state.on_event(event);
    }

    assert_eq!(state.status(), None);
    assert_eq!(state.connection_state(), Some(ConnectionState::Connected));
    assert_eq!(state.window().len(), 2);

    let view = state.view();
    assert_eq!(view.humidity.domain, AxisDomain::new(44.0, 48.0));
    assert_eq!(view.series(Field::Temperature).latest_value(), Some(24.9));
}

#[test]
fn end_of_input_disconnects() {
    let events = collect_events("");
    assert_eq!(
        events,
        vec![
            StreamEvent::ConnectionState(ConnectionState::Connecting),
            StreamEvent::ConnectionState(ConnectionState::Disconnected),
        ]
    );

    let mut state = DashboardState::default();
    for event in events {
        state.on_event(event);
    }
    assert_eq!(state.status(), Some("Disconnected. Please reload."));
}

#[test]
fn line_source_subscribes_once() {
    let source = LineSource::new(Cursor::new(String::new()));
    let (sender, _receiver) = mpsc::channel::<StreamEvent>();
    let _first = source.subscribe("M5StackCore2", Box::new(sender.clone())).unwrap();

    assert!(matches!(
        source.subscribe("M5StackCore2", Box::new(sender)),
        Err(SourceError::AlreadySubscribed)
    ));
}
