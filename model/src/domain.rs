use serde::{Deserialize, Serialize};

use crate::{Field, Sample, Window};

/// Padding added below the floor and above the ceiling of the plotted values.
pub const DOMAIN_PADDING: f64 = 1.0;

/// Lowest and highest relative humidity that can be displayed.
const HUMIDITY_LIMITS: (f64, f64) = (0.0, 100.0);

/// Display range of a chart's value axis. `min <= max` always holds.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct AxisDomain {
    pub min: f64,
    pub max: f64,
}

impl AxisDomain {
    /// Creates a domain from two bounds, swapping them if given in reverse.
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Position of `value` inside the domain, `0.0` at `min` and `1.0` at `max`.
    ///
    /// A zero-width domain maps everything to the middle.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.span();
        if span <= f64::EPSILON {
            0.5
        } else {
            (value - self.min) / span
        }
    }
}

impl From<AxisDomain> for (f64, f64) {
    fn from(domain: AxisDomain) -> Self {
        (domain.min, domain.max)
    }
}

/// Computes the value-axis range for `field` over the current window.
pub fn compute_domain(window: &Window, field: Field) -> AxisDomain {
    domain_for_samples(window.iter(), field)
}

/// Same as [`compute_domain`] for any sequence of samples.
pub fn domain_for_samples<'a>(
    samples: impl IntoIterator<Item = &'a Sample>,
    field: Field,
) -> AxisDomain {
    domain_for_values(samples.into_iter().filter_map(|s| s.value(field)), field)
}

/// Derives the padded range for a set of raw readings.
///
/// Non-finite values are ignored. Without any usable value the field's
/// [fallback](Field::fallback_domain) is returned. Otherwise the range is
/// `[floor(min) - 1, ceil(max) + 1]`, then:
///
/// * temperature: the lower bound is clamped to `0` as long as every reading is
///   non-negative. Sub-zero readings extend the axis below zero.
/// * humidity: both bounds are clamped to `[0, 100]`.
pub fn domain_for_values(values: impl IntoIterator<Item = f64>, field: Field) -> AxisDomain {
    let extremes = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });

    let Some((raw_min, raw_max)) = extremes else {
        return field.fallback_domain();
    };

    let mut min = raw_min.floor() - DOMAIN_PADDING;
    let mut max = raw_max.ceil() + DOMAIN_PADDING;

    match field {
        Field::Temperature => {
            if raw_min >= 0.0 {
                min = min.max(0.0);
            }
        }
        Field::Humidity => {
            let (lower, upper) = HUMIDITY_LIMITS;
            min = min.clamp(lower, upper);
            max = max.clamp(lower, upper);
        }
    }

    AxisDomain::new(min, max)
}

/// First and last timestamp (in epoch milliseconds) present in the window.
///
/// Arrival order is not timestamp order, so this scans the whole window.
pub fn time_extent(window: &Window) -> Option<(i64, i64)> {
    window.iter().map(Sample::timestamp_millis).fold(None, |acc, ms| match acc {
        None => Some((ms, ms)),
        Some((lo, hi)) => Some((lo.min(ms), hi.max(ms))),
    })
}
