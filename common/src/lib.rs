//! Everything around the data model that is shared between dashboard front ends:
//! configuration, the sample sources behind a subscription, and chart geometry.

pub mod chart;
mod config;
pub mod subscription;

pub use config::{DashboardConfig, DEFAULT_THING_ID};
pub use subscription::{open_source, SampleSource, SampleSourcePointer, SourceError, Subscription};
