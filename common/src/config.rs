use std::time::Duration;

/// Device the dashboard subscribes to unless configured otherwise.
pub const DEFAULT_THING_ID: &str = "M5StackCore2";

/// Runtime configuration of the dashboard.
///
/// Read from the environment by [`DashboardConfig::from_env`]:
///
/// | Variable                   | Default        |
/// |----------------------------|----------------|
/// | `SENSOR_THING_ID`          | `M5StackCore2` |
/// | `SENSOR_SOURCE`            | `dummy`        |
/// | `SENSOR_DUMMY_INTERVAL_MS` | `2000`         |
/// | `SENSOR_POLL_INTERVAL_MS`  | `200`          |
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardConfig {
    pub thing_id: String,
    /// Name of the sample source, see [`crate::subscription::SourceKind`].
    pub source: String,
    /// Delay between two synthetic readings of the dummy source.
    pub dummy_interval: Duration,
    /// How often the UI drains pending events.
    pub poll_interval: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            thing_id: DEFAULT_THING_ID.into(),
            source: "dummy".into(),
            dummy_interval: Duration::from_millis(2000),
            poll_interval: Duration::from_millis(200),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Missing or
    /// invalid values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let thing_id = lookup("SENSOR_THING_ID")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.thing_id);

        let source = lookup("SENSOR_SOURCE")
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.source);

        Self {
            thing_id,
            source,
            dummy_interval: millis(&lookup, "SENSOR_DUMMY_INTERVAL_MS")
                .unwrap_or(defaults.dummy_interval),
            poll_interval: millis(&lookup, "SENSOR_POLL_INTERVAL_MS")
                .unwrap_or(defaults.poll_interval),
        }
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Some(Duration::from_millis(ms)),
        _ => {
            log::warn!("Ignoring invalid {key}={raw:?}, using the default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> DashboardConfig {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        DashboardConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        assert_eq!(config_from(&[]), DashboardConfig::default());
        assert_eq!(DashboardConfig::default().thing_id, "M5StackCore2");
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("SENSOR_THING_ID", "Greenhouse"),
            ("SENSOR_SOURCE", " STDIN "),
            ("SENSOR_DUMMY_INTERVAL_MS", "500"),
            ("SENSOR_POLL_INTERVAL_MS", "50"),
        ]);
        assert_eq!(config.thing_id, "Greenhouse");
        assert_eq!(config.source, "stdin");
        assert_eq!(config.dummy_interval, Duration::from_millis(500));
        assert_eq!(config.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[
            ("SENSOR_THING_ID", "   "),
            ("SENSOR_DUMMY_INTERVAL_MS", "soon"),
            ("SENSOR_POLL_INTERVAL_MS", "0"),
        ]);
        assert_eq!(config, DashboardConfig::default());
    }
}
