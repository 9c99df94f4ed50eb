use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use sensor_dashboard_model::{ConnectionState, SensorRecord, StreamListener};

use super::{ListenerPointer, SampleSource, SourceError, Subscription};

/// A reading from the bundled dummy data set.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DummyReading {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

/// Replays a bundled set of readings, stamped with the current time, so the
/// dashboard has something to show without a live channel.
#[derive(Clone, Debug)]
pub struct DummySampleSource {
    readings: Vec<DummyReading>,
    interval: Duration,
}

impl DummySampleSource {
    pub fn new(interval: Duration) -> Result<Self, serde_json::Error> {
        let json_data = std::include_str!("./dummyreadings.json");

        Ok(Self {
            readings: serde_json::from_str(json_data)?,
            interval,
        })
    }

    pub fn readings(&self) -> &[DummyReading] {
        &self.readings
    }

    /// The record emitted for the `index`-th tick. Readings repeat cyclically.
    pub fn record_at(&self, index: usize, thing_id: &str, now: DateTime<Utc>) -> Option<SensorRecord> {
        let reading = self.readings.get(index % self.readings.len().max(1))?;
        let ts = now.to_rfc3339();

        Some(SensorRecord {
            thing_id: thing_id.to_string(),
            ts: Some(ts.clone()),
            temperature: reading.temperature,
            humidity: reading.humidity,
            sent_at: Some(ts.clone()),
            received_at: Some(ts),
        })
    }
}

impl SampleSource for DummySampleSource {
    fn subscribe(
        &self,
        thing_id: &str,
        listener: ListenerPointer,
    ) -> Result<Subscription, SourceError> {
        if self.readings.is_empty() {
            return Err(SourceError::NoReadings);
        }

        let source = self.clone();
        let thing_id = thing_id.to_string();

        Subscription::spawn("dummy-source", listener, move |mut listener, stop| {
            listener.on_connection_state_change(ConnectionState::Connecting);
            listener.on_connection_state_change(ConnectionState::Connected);

            let mut index = 0;
            while !stop.is_stopped() {
                if let Some(record) = source.record_at(index, &thing_id, Utc::now()) {
                    log::debug!(
                        "Dummy reading: {:?} °C, {:?} %",
                        record.temperature,
                        record.humidity
                    );
                    listener.on_sample(record);
                }
                index += 1;
                std::thread::sleep(source.interval);
            }
        })
    }
}

#[test]
fn test_dummy_sample_source() {
    let source = DummySampleSource::new(Duration::from_millis(1)).unwrap();
    assert!(!source.readings().is_empty());

    let now = Utc::now();
    let first = source.record_at(0, "M5StackCore2", now).unwrap();
    let wrapped = source.record_at(source.readings().len(), "M5StackCore2", now).unwrap();
    assert_eq!(first, wrapped);
    assert_eq!(first.thing_id, "M5StackCore2");
    assert!(sensor_dashboard_model::Sample::try_from(first).is_ok());
}

#[test]
fn test_dummy_subscription_emits_samples() {
    use sensor_dashboard_model::StreamEvent;

    let source = DummySampleSource::new(Duration::from_millis(1)).unwrap();
    let (sender, receiver) = std::sync::mpsc::channel::<StreamEvent>();
    let subscription = source.subscribe("M5StackCore2", Box::new(sender)).unwrap();

    assert_eq!(
        receiver.recv().unwrap(),
        StreamEvent::ConnectionState(ConnectionState::Connecting)
    );
    assert_eq!(
        receiver.recv().unwrap(),
        StreamEvent::ConnectionState(ConnectionState::Connected)
    );
    assert!(matches!(receiver.recv().unwrap(), StreamEvent::Sample(_)));

    subscription.unsubscribe();
}
