//! Sources of sensor events and the handle that keeps a subscription alive.

mod dummy;
mod lines;
mod wire;

pub use dummy::{DummyReading, DummySampleSource};
pub use lines::LineSource;
pub use wire::{decode_message, DecodeError};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use sensor_dashboard_model::{ConnectionState, SensorRecord, StreamListener};

use crate::DashboardConfig;

pub type ListenerPointer = Box<dyn StreamListener + Send>;

/// Errors raised while setting up a subscription.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("unknown sample source `{0}` (expected `dummy` or `stdin`)")]
    UnknownSource(String),
    #[error("invalid dummy readings: {0}")]
    DummyData(#[from] serde_json::Error),
    #[error("no dummy readings available")]
    NoReadings,
    #[error("source was already subscribed")]
    AlreadySubscribed,
    #[error("failed to start source thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Something that can push sensor events for one device.
pub trait SampleSource {
    /// Starts delivering events for `thing_id` to `listener`.
    ///
    /// Events stop once the returned [`Subscription`] is unsubscribed or dropped.
    fn subscribe(&self, thing_id: &str, listener: ListenerPointer)
        -> Result<Subscription, SourceError>;
}

pub type SampleSourcePointer = Box<dyn SampleSource>;

/// The sources that can be selected through [`DashboardConfig::source`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Dummy,
    Stdin,
}

impl std::str::FromStr for SourceKind {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dummy" => Ok(SourceKind::Dummy),
            "stdin" => Ok(SourceKind::Stdin),
            _ => Err(SourceError::UnknownSource(s.to_string())),
        }
    }
}

/// Creates the source selected by `config`.
pub fn open_source(config: &DashboardConfig) -> Result<SampleSourcePointer, SourceError> {
    let source: SampleSourcePointer = match config.source.parse::<SourceKind>()? {
        SourceKind::Dummy => Box::new(DummySampleSource::new(config.dummy_interval)?),
        SourceKind::Stdin => Box::new(LineSource::stdin()),
    };
    log::info!("Using {} sample source", config.source);
    Ok(source)
}

/// Shared flag telling a source thread to stop delivering events.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Forwards events to the wrapped listener until the signal is raised.
pub struct GatedListener {
    inner: ListenerPointer,
    stop: StopSignal,
}

impl StreamListener for GatedListener {
    fn on_sample(&mut self, record: SensorRecord) {
        if !self.stop.is_stopped() {
            self.inner.on_sample(record);
        }
    }

    fn on_connection_state_change(&mut self, state: ConnectionState) {
        if !self.stop.is_stopped() {
            self.inner.on_connection_state_change(state);
        }
    }

    fn on_error(&mut self, message: String) {
        if !self.stop.is_stopped() {
            self.inner.on_error(message);
        }
    }
}

/// A running subscription. Dropping it unsubscribes.
pub struct Subscription {
    stop: StopSignal,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Runs `task` on a named thread with a listener that goes quiet once the
    /// subscription is cancelled.
    pub fn spawn<F>(name: &str, listener: ListenerPointer, task: F) -> Result<Self, SourceError>
    where
        F: FnOnce(GatedListener, StopSignal) + Send + 'static,
    {
        let stop = StopSignal::default();
        let gated = GatedListener {
            inner: listener,
            stop: stop.clone(),
        };

        let task_stop = stop.clone();
        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || task(gated, task_stop))?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Whether the source thread is still running.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops event delivery.
    ///
    /// The source thread is not joined: it may be blocked on input and exits
    /// the next time it wakes up.
    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop.stop();
            log::debug!("Unsubscribed from {}", handle.thread().name().unwrap_or("source"));
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensor_dashboard_model::StreamEvent;
    use std::sync::mpsc;

    #[test]
    fn source_kind_parsing() {
        assert_eq!("dummy".parse::<SourceKind>().unwrap(), SourceKind::Dummy);
        assert_eq!(" Stdin".parse::<SourceKind>().unwrap(), SourceKind::Stdin);
        assert!(matches!(
            "mqtt".parse::<SourceKind>(),
            Err(SourceError::UnknownSource(name)) if name == "mqtt"
        ));
    }

    #[test]
    fn open_source_rejects_unknown_kind() {
        let config = DashboardConfig {
            source: "appsync".into(),
            ..Default::default()
        };
        let err = open_source(&config).err().unwrap();
        assert_eq!(
            err.to_string(),
            "unknown sample source `appsync` (expected `dummy` or `stdin`)"
        );
    }

    #[test]
    fn cancelled_subscription_delivers_nothing() {
        let (sender, receiver) = mpsc::channel::<StreamEvent>();
        let (go_tx, go_rx) = mpsc::channel::<()>();

        let subscription = Subscription::spawn("test-source", Box::new(sender), move |mut listener, _| {
            listener.on_connection_state_change(ConnectionState::Connected);
            let _ = go_rx.recv();
            listener.on_error("after unsubscribe".into());
        })
        .unwrap();

        assert_eq!(
            receiver.recv().unwrap(),
            StreamEvent::ConnectionState(ConnectionState::Connected)
        );

        subscription.unsubscribe();
        go_tx.send(()).unwrap();

        assert!(receiver.recv().is_err());
    }
}
