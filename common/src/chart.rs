//! Geometry and labels for drawing a [`ChartSeries`] into a fixed view box.
//!
//! Coordinates are in view-box units with the origin in the top left corner,
//! so larger values end up closer to the top.

use std::fmt::Write;

use chrono::{Local, TimeZone};
use sensor_dashboard_model::{AxisDomain, ChartSeries};

/// Width and height of the square view box the paths are expressed in.
pub const VIEWBOX: f64 = 1000.0;

/// A point inside the plot area, both coordinates in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

/// An axis label and where it sits along the axis (`0.0..=1.0`).
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

/// Maps the series into the plot area. The x axis spans `extent`, the y axis
/// the series' domain. Points without a value stay `None`.
pub fn plot_points(series: &ChartSeries, extent: Option<(i64, i64)>) -> Vec<Option<PlotPoint>> {
    let (start, end) = extent.unwrap_or((0, 0));
    let width = (end - start) as f64;

    series
        .points
        .iter()
        .map(|point| {
            let value = point.value?;
            let x = if width > 0.0 {
                (point.timestamp_millis - start) as f64 / width
            } else {
                0.5
            };
            let y = 1.0 - series.domain.normalize(value);
            Some(PlotPoint {
                x: x.clamp(0.0, 1.0),
                y: y.clamp(0.0, 1.0),
            })
        })
        .collect()
}

/// SVG-style path commands connecting consecutive points.
///
/// A missing point ends the current line; the next one starts a new one.
pub fn path_commands(points: &[Option<PlotPoint>]) -> String {
    let mut commands = String::new();
    let mut pen_down = false;

    for point in points {
        let Some(point) = point else {
            pen_down = false;
            continue;
        };
        let verb = if pen_down { 'L' } else { 'M' };
        if !commands.is_empty() {
            commands.push(' ');
        }
        let _ = write!(
            commands,
            "{verb} {:.1} {:.1}",
            point.x * VIEWBOX,
            point.y * VIEWBOX
        );
        pen_down = true;
    }

    commands
}

/// `count` evenly spaced labels from `domain.min` (position 0) to `domain.max`.
pub fn value_ticks(domain: &AxisDomain, count: usize) -> Vec<Tick> {
    let count = count.max(2);
    (0..count)
        .map(|i| {
            let position = i as f64 / (count - 1) as f64;
            Tick {
                position,
                label: format_tick_value(domain.min + domain.span() * position),
            }
        })
        .collect()
}

/// `count` evenly spaced time labels across `extent`, in local time.
pub fn time_ticks(extent: Option<(i64, i64)>, count: usize) -> Vec<Tick> {
    time_ticks_in(extent, count, &Local)
}

pub fn time_ticks_in<Tz: TimeZone>(extent: Option<(i64, i64)>, count: usize, tz: &Tz) -> Vec<Tick>
where
    Tz::Offset: std::fmt::Display,
{
    let Some((start, end)) = extent else {
        return Vec::new();
    };
    if start == end {
        return vec![Tick {
            position: 0.5,
            label: format_time_in(start, tz),
        }];
    }

    let count = count.max(2);
    (0..count)
        .map(|i| {
            let position = i as f64 / (count - 1) as f64;
            let ms = start + ((end - start) as f64 * position).round() as i64;
            Tick {
                position,
                label: format_time_in(ms, tz),
            }
        })
        .collect()
}

/// `HH:MM:SS` (24h) in local time.
pub fn format_time(timestamp_millis: i64) -> String {
    format_time_in(timestamp_millis, &Local)
}

pub fn format_time_in<Tz: TimeZone>(timestamp_millis: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    tz.timestamp_millis_opt(timestamp_millis)
        .single()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

fn format_tick_value(value: f64) -> String {
    if (value - value.round()).abs() < 0.05 {
        format!("{:.0}", value.round())
    } else {
        format!("{value:.1}")
    }
}
