//! Data model of the sensor dashboard.
//!
//! A [`Window`] keeps the most recent samples of one device, [`compute_domain`]
//! derives the value range each chart is drawn in, and [`DashboardState`] ties
//! both to the events pushed by a real-time channel. Nothing in here does I/O.

mod dashboard;
mod domain;
mod event;
mod field;
mod sample;
mod series;
mod window;

pub use dashboard::{DashboardState, DashboardView};
pub use domain::{
    compute_domain, domain_for_samples, domain_for_values, time_extent, AxisDomain,
    DOMAIN_PADDING,
};
pub use event::{ConnectionState, StatusChange, StreamEvent, StreamListener};
pub use field::Field;
pub use sample::{parse_timestamp, Sample, SampleError, SensorRecord};
pub use series::{ChartPoint, ChartSeries};
pub use window::Window;
