use serde::{Deserialize, Serialize};

use crate::AxisDomain;

/// The measured quantities a dashboard chart can show.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Temperature,
    Humidity,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::Temperature, Field::Humidity];

    pub fn label(self) -> &'static str {
        match self {
            Field::Temperature => "Temperature",
            Field::Humidity => "Humidity",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Field::Temperature => "°C",
            Field::Humidity => "%",
        }
    }

    /// The range shown while there is nothing to plot.
    pub fn fallback_domain(self) -> AxisDomain {
        match self {
            Field::Temperature => AxisDomain::new(15.0, 30.0),
            Field::Humidity => AxisDomain::new(0.0, 100.0),
        }
    }

    /// Formats a reading with two decimals and the unit, e.g. `23.40 °C`.
    pub fn format_value(self, value: f64) -> String {
        format!("{value:.2} {}", self.unit())
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.label(), self.unit())
    }
}
