use std::collections::VecDeque;

use crate::{AxisDomain, Field, Sample, SampleError, SensorRecord};

/// Rolling buffer of the most recent samples, kept in arrival order.
///
/// Samples are never re-sorted: whatever order the channel delivers them in is
/// the order they are drawn in.
#[derive(Clone, Debug, PartialEq)]
pub struct Window {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl Default for Window {
    fn default() -> Self {
        Self::with_capacity(Self::CAPACITY)
    }
}

impl Window {
    /// Number of points a dashboard chart keeps.
    pub const CAPACITY: usize = 30;

    /// Creates an empty window holding at most `capacity` samples (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Appends `sample` and evicts from the front until the capacity holds again.
    pub fn append(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Validates a raw record and appends it.
    ///
    /// Malformed records leave the window untouched. The error is returned so
    /// the caller can log it; it is not meant to be shown to the user.
    pub fn push_record(&mut self, record: SensorRecord) -> Result<(), SampleError> {
        let sample = Sample::try_from(record)?;
        self.append(sample);
        Ok(())
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Sample> + ExactSizeIterator {
        self.samples.iter()
    }

    /// The most recently received sample.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// The most recent reading of `field`, skipping samples without one.
    pub fn latest_value(&self, field: Field) -> Option<f64> {
        self.samples.iter().rev().find_map(|s| s.value(field))
    }

    pub fn domain(&self, field: Field) -> AxisDomain {
        crate::compute_domain(self, field)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl<'a> IntoIterator for &'a Window {
    type Item = &'a Sample;
    type IntoIter = std::collections::vec_deque::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl Extend<Sample> for Window {
    fn extend<T: IntoIterator<Item = Sample>>(&mut self, iter: T) {
        for sample in iter {
            self.append(sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample(secs: i64, temperature: f64) -> Sample {
        Sample::new("M5StackCore2", Utc.timestamp_opt(secs, 0).unwrap()).with_temperature(temperature)
    }

    fn temperatures(window: &Window) -> Vec<f64> {
        window.iter().filter_map(|s| s.temperature).collect()
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut window = Window::default();
        for i in 0..100 {
            window.append(sample(i, i as f64));
            assert!(window.len() <= Window::CAPACITY);
        }
        assert_eq!(window.len(), Window::CAPACITY);
    }

    #[test]
    fn keeps_the_thirty_most_recent() {
        let mut window = Window::default();
        window.extend((0..=30).map(|i| sample(i, i as f64)));

        let expected: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        assert_eq!(temperatures(&window), expected);
        assert_eq!(window.domain(Field::Temperature), AxisDomain::new(0.0, 31.0));
    }

    #[test]
    fn keeps_arrival_order() {
        let mut window = Window::with_capacity(4);
        for (secs, t) in [(5, 1.0), (2, 2.0), (9, 3.0), (1, 4.0), (7, 5.0)] {
            window.append(sample(secs, t));
        }
        assert_eq!(temperatures(&window), vec![2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn malformed_record_is_not_appended() {
        let mut window = Window::default();
        window.append(sample(1, 20.0));

        let record = SensorRecord {
            thing_id: "M5StackCore2".into(),
            ts: Some("not a date".into()),
            temperature: Some(99.0),
            ..Default::default()
        };
        assert!(window.push_record(record).is_err());
        assert_eq!(window.len(), 1);
        assert_eq!(window.latest_value(Field::Temperature), Some(20.0));
    }

    #[test]
    fn valid_record_is_appended() {
        let mut window = Window::default();
        let record = SensorRecord {
            thing_id: "M5StackCore2".into(),
            ts: Some("2024-05-01T12:00:00Z".into()),
            humidity: Some(48.0),
            ..Default::default()
        };
        window.push_record(record).unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window.latest_value(Field::Humidity), Some(48.0));
        assert_eq!(window.latest_value(Field::Temperature), None);
    }

    #[test]
    fn latest_value_skips_gaps() {
        let mut window = Window::default();
        window.append(sample(1, 21.0));
        window.append(Sample::new("M5StackCore2", Utc.timestamp_opt(2, 0).unwrap()));
        assert_eq!(window.latest().and_then(|s| s.temperature), None);
        assert_eq!(window.latest_value(Field::Temperature), Some(21.0));
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let mut window = Window::with_capacity(0);
        window.append(sample(1, 1.0));
        window.append(sample(2, 2.0));
        assert_eq!(window.capacity(), 1);
        assert_eq!(temperatures(&window), vec![2.0]);
    }
}
