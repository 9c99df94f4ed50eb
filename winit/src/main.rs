// Prevent console window in addition to Slint window in Windows release builds when, e.g., starting the app via file manager. Ignored on other platforms.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

slint::include_modules!();

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;

use sensor_dashboard_common::chart;
use sensor_dashboard_common::{open_source, DashboardConfig, Subscription};
use sensor_dashboard_model::{ChartSeries, DashboardState, DashboardView, StreamEvent, StreamListener};

/// Holds the UI, the dashboard state and the subscription feeding it.
///
/// Events arrive on the source's thread and are queued in a channel. A timer
/// on the UI thread drains the queue, applies every event to the state and
/// pushes the derived view into the `ViewModel` global.
struct App {
    ui: AppWindow,
    config: DashboardConfig,
    state: Rc<RefCell<DashboardState>>,
    events: Option<mpsc::Receiver<StreamEvent>>,
    subscription: Option<Subscription>,
    timer: slint::Timer,
}

impl App {
    const VALUE_TICKS: usize = 5;
    const TIME_TICKS: usize = 4;

    /// Create the window and subscribe to the configured source.
    ///
    /// A failing subscription does not fail the app, it is shown as the
    /// session's error message instead.
    fn new(config: DashboardConfig) -> anyhow::Result<Self> {
        let ui = AppWindow::new()?;

        let state = Rc::new(RefCell::new(DashboardState::default()));
        let (sender, receiver) = mpsc::channel::<StreamEvent>();

        let subscription = match open_source(&config)
            .and_then(|source| source.subscribe(&config.thing_id, Box::new(sender)))
        {
            Ok(subscription) => {
                log::info!("Subscribed to {}", config.thing_id);
                state.borrow_mut().subscription_started();
                Some(subscription)
            }
            Err(e) => {
                log::error!("Subscription setup failed: {e}");
                state.borrow_mut().subscription_failed(&e);
                None
            }
        };

        update_view(&ui, &state.borrow().view());

        Ok(Self {
            ui,
            config,
            state,
            events: Some(receiver),
            subscription,
            timer: slint::Timer::default(),
        })
    }

    /// Run the UI until the window is closed, then unsubscribe.
    fn run(&mut self) -> anyhow::Result<()> {
        let ui_handle = self.ui.as_weak();
        let state = self.state.clone();

        if let Some(events) = self.events.take() {
            self.timer.start(
                slint::TimerMode::Repeated,
                self.config.poll_interval,
                move || {
                    let mut state = state.borrow_mut();

                    let mut received = 0;
                    for event in events.try_iter() {
                        state.on_event(event);
                        received += 1;
                    }
                    if received == 0 {
                        return;
                    }

                    if let Some(ui) = ui_handle.upgrade() {
                        update_view(&ui, &state.view());
                    }
                },
            );
        }

        let result = self.ui.run();

        self.timer.stop();
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }

        result.map_err(|e| e.into())
    }
}

fn update_view(ui: &AppWindow, view: &DashboardView) {
    let model = ui.global::<ViewModel>();

    model.set_temperature(chart_data(&view.temperature, view.time_extent));
    model.set_humidity(chart_data(&view.humidity, view.time_extent));
    model.set_connection_state(view.connection_label().into());
    model.set_status(view.status.as_deref().unwrap_or_default().into());
    model.set_loading(view.loading);
}

fn chart_data(series: &ChartSeries, extent: Option<(i64, i64)>) -> ChartData {
    let points = chart::plot_points(series, extent);

    let dots: Vec<ChartDot> = points
        .iter()
        .flatten()
        .map(|p| ChartDot {
            x: p.x as f32,
            y: p.y as f32,
        })
        .collect();

    let latest = series
        .latest_value()
        .map(|v| series.field.format_value(v))
        .unwrap_or_default();

    ChartData {
        title: series.field.to_string().into(),
        commands: chart::path_commands(&points).into(),
        dots: slint::ModelRc::new(slint::VecModel::from(dots)),
        value_ticks: ticks_model(chart::value_ticks(&series.domain, App::VALUE_TICKS)),
        time_ticks: ticks_model(chart::time_ticks(extent, App::TIME_TICKS)),
        latest: latest.into(),
    }
}

fn ticks_model(ticks: Vec<chart::Tick>) -> slint::ModelRc<AxisTick> {
    let ticks: Vec<AxisTick> = ticks.into_iter().map(AxisTick::from).collect();
    slint::ModelRc::new(slint::VecModel::from(ticks))
}

impl From<chart::Tick> for AxisTick {
    fn from(tick: chart::Tick) -> Self {
        Self {
            position: tick.position as f32,
            label: tick.label.into(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::from_env();
    log::info!("Starting dashboard with {config:?}");

    let mut app = App::new(config)?;

    app.run()
}
