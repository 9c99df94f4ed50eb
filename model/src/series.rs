use serde::{Deserialize, Serialize};

use crate::{AxisDomain, Field, Window};

/// One point handed to a chart. A `None` value leaves a gap in the line.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ChartPoint {
    pub timestamp_millis: i64,
    pub value: Option<f64>,
}

/// A windowed series with the value range it should be drawn in.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChartSeries {
    pub field: Field,
    pub points: Vec<ChartPoint>,
    pub domain: AxisDomain,
}

impl ChartSeries {
    /// Projects the window onto `field` and derives its domain.
    pub fn from_window(window: &Window, field: Field) -> Self {
        let points = window
            .iter()
            .map(|sample| ChartPoint {
                timestamp_millis: sample.timestamp_millis(),
                value: sample.value(field).filter(|v| !v.is_nan()),
            })
            .collect();

        Self {
            field,
            points,
            domain: window.domain(field),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points that actually carry a value.
    pub fn values(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.value.map(|v| (p.timestamp_millis, v)))
    }

    pub fn latest_value(&self) -> Option<f64> {
        self.points.iter().rev().find_map(|p| p.value)
    }
}

#[test]
fn series_keeps_gaps_and_order() {
    use chrono::{TimeZone, Utc};

    let mut window = Window::default();
    let at = |secs| Utc.timestamp_opt(secs, 0).unwrap();
    window.append(crate::Sample::new("dev", at(20)).with_temperature(22.0).with_humidity(40.0));
    window.append(crate::Sample::new("dev", at(10)).with_humidity(41.0));
    window.append(crate::Sample::new("dev", at(30)).with_temperature(f64::NAN));

    let temperature = ChartSeries::from_window(&window, Field::Temperature);
    assert_eq!(
        temperature.points,
        vec![
            ChartPoint { timestamp_millis: 20_000, value: Some(22.0) },
            ChartPoint { timestamp_millis: 10_000, value: None },
            ChartPoint { timestamp_millis: 30_000, value: None },
        ]
    );
    assert_eq!(temperature.domain, AxisDomain::new(21.0, 23.0));
    assert_eq!(temperature.latest_value(), Some(22.0));

    let humidity = ChartSeries::from_window(&window, Field::Humidity);
    assert_eq!(humidity.values().collect::<Vec<_>>(), vec![(20_000, 40.0), (10_000, 41.0)]);
    assert_eq!(humidity.domain, AxisDomain::new(39.0, 42.0));
}
