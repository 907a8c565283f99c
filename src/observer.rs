//! Observation sink for named scalar outputs.
//!
//! The simulator pushes values by hierarchical key path and never knows the
//! sink's encoding; file-format observers live outside this crate.

use std::collections::HashMap;

/// Sink of named scalar time series.
pub trait Observer {
    fn write(&mut self, path: &[&str], value: f64);
}

/// In-memory observer keyed by the joined path, mostly for tests and
/// diagnostics.
#[derive(Default)]
pub struct MapObserver {
    values: HashMap<String, Vec<f64>>,
}

impl MapObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&[f64]> {
        self.values.get(path).map(|v| v.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }
}

impl Observer for MapObserver {
    fn write(&mut self, path: &[&str], value: f64) {
        self.values
            .entry(path.join("/"))
            .or_default()
            .push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_accumulate_under_joined_path() {
        let mut obs = MapObserver::new();
        obs.write(&["efforts", "cube", "gravity", "Fz"], 9810.);
        obs.write(&["efforts", "cube", "gravity", "Fz"], 9810.);
        assert_eq!(obs.get("efforts/cube/gravity/Fz"), Some(&[9810., 9810.][..]));
        assert_eq!(obs.get("missing"), None);
    }
}
