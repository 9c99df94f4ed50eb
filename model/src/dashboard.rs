use crate::{
    time_extent, ChartSeries, ConnectionState, Field, SensorRecord, StatusChange, StreamListener,
    Window,
};

/// Everything the dashboard view shows, derived from a [`DashboardState`].
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardView {
    pub temperature: ChartSeries,
    pub humidity: ChartSeries,
    /// Earliest and latest timestamp in the window, in epoch milliseconds.
    pub time_extent: Option<(i64, i64)>,
    pub connection_state: Option<ConnectionState>,
    pub status: Option<String>,
    pub loading: bool,
}

impl DashboardView {
    pub fn series(&self, field: Field) -> &ChartSeries {
        match field {
            Field::Temperature => &self.temperature,
            Field::Humidity => &self.humidity,
        }
    }

    /// Connection state as shown next to the charts.
    pub fn connection_label(&self) -> &'static str {
        self.connection_state.map_or("unknown", ConnectionState::as_str)
    }
}

/// State behind one mounted dashboard.
///
/// All mutation goes through the [`StreamListener`] callbacks and the two
/// subscription lifecycle methods, one event at a time.
#[derive(Clone, Debug)]
pub struct DashboardState {
    window: Window,
    connection_state: Option<ConnectionState>,
    status: Option<String>,
    setup_failed: bool,
    loading: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(Window::default())
    }
}

impl DashboardState {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            connection_state: None,
            status: None,
            setup_failed: false,
            loading: true,
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn connection_state(&self) -> Option<ConnectionState> {
        self.connection_state
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the session ended because the subscription could not be set up.
    pub fn is_terminal(&self) -> bool {
        self.setup_failed
    }

    /// The subscription is up and events may start flowing.
    pub fn subscription_started(&mut self) {
        self.loading = false;
    }

    /// The subscription could not be established. The message stays for the
    /// rest of the session.
    pub fn subscription_failed(&mut self, message: impl std::fmt::Display) {
        self.loading = false;
        self.setup_failed = true;
        self.status = Some(format!("Subscription setup error: {message}"));
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            temperature: ChartSeries::from_window(&self.window, Field::Temperature),
            humidity: ChartSeries::from_window(&self.window, Field::Humidity),
            time_extent: time_extent(&self.window),
            connection_state: self.connection_state,
            status: self.status.clone(),
            loading: self.loading,
        }
    }
}

impl StreamListener for DashboardState {
    fn on_sample(&mut self, record: SensorRecord) {
        self.loading = false;
        if let Err(e) = self.window.push_record(record) {
            log::debug!("Dropping sample: {e}");
        }
    }

    fn on_connection_state_change(&mut self, state: ConnectionState) {
        log::info!("Connection state: {state}");
        self.connection_state = Some(state);

        if self.setup_failed {
            return;
        }

        match state.status_change() {
            StatusChange::Show(message) => self.status = Some(message.to_string()),
            StatusChange::Clear => self.status = None,
            StatusChange::Keep => {}
        }
    }

    fn on_error(&mut self, message: String) {
        log::error!("Subscription error: {message}");
        if !self.setup_failed {
            self.status = Some(format!("Subscription error: {message}"));
        }
    }
}
