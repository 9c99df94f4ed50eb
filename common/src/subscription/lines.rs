use std::io::{BufRead, BufReader};
use std::sync::Mutex;

use sensor_dashboard_model::{ConnectionState, StreamEvent, StreamListener};

use super::{
    decode_message, GatedListener, ListenerPointer, SampleSource, SourceError, StopSignal,
    Subscription,
};

/// Reads newline-delimited subscription messages from any reader, for example
/// the output of a websocket client piped into the dashboard.
///
/// The reader is consumed by the first subscription.
pub struct LineSource<R> {
    reader: Mutex<Option<R>>,
}

impl<R: BufRead + Send + 'static> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(Some(reader)),
        }
    }
}

impl LineSource<BufReader<std::io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(std::io::stdin()))
    }
}

impl<R: BufRead + Send + 'static> SampleSource for LineSource<R> {
    fn subscribe(
        &self,
        thing_id: &str,
        listener: ListenerPointer,
    ) -> Result<Subscription, SourceError> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| SourceError::AlreadySubscribed)?
            .take()
            .ok_or(SourceError::AlreadySubscribed)?;

        let thing_id = thing_id.to_string();
        Subscription::spawn("line-source", listener, move |listener, stop| {
            read_messages(reader, &thing_id, listener, &stop)
        })
    }
}

fn read_messages(
    reader: impl BufRead,
    thing_id: &str,
    mut listener: GatedListener,
    stop: &StopSignal,
) {
    listener.on_connection_state_change(ConnectionState::Connecting);

    for line in reader.lines() {
        if stop.is_stopped() {
            return;
        }

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("Failed to read subscription input: {e}");
                listener.on_error(e.to_string());
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match decode_message(&line) {
            Ok(Some(StreamEvent::Sample(record)))
                if !record.thing_id.is_empty() && record.thing_id != thing_id =>
            {
                log::debug!("Ignoring record for {}", record.thing_id);
            }
            Ok(Some(event)) => listener.on_event(event),
            Ok(None) => {}
            Err(e) => log::warn!("Ignoring message: {e}"),
        }
    }

    listener.on_connection_state_change(ConnectionState::Disconnected);
}
