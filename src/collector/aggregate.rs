//! Per-device route counting

use crate::collector::DeviceRouteCount;
use std::collections::BTreeMap;

/// Counts emitted route records per device within one cycle
#[derive(Debug, Default)]
pub struct Aggregator {
    counts: BTreeMap<String, u64>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, device: &str) {
        match self.counts.get_mut(device) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(device.to_string(), 1);
            }
        }
    }

    /// Consume the counts, one entry per device, ordered by device name
    pub fn flush(self) -> Vec<DeviceRouteCount> {
        self.counts
            .into_iter()
            .map(|(device, count)| DeviceRouteCount { device, count })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_per_device() {
        let mut agg = Aggregator::new();
        agg.increment("eth1");
        agg.increment("eth0");
        agg.increment("eth1");
        agg.increment("");

        let counts = agg.flush();
        assert_eq!(
            counts,
            vec![
                DeviceRouteCount {
                    device: String::new(),
                    count: 1,
                },
                DeviceRouteCount {
                    device: "eth0".to_string(),
                    count: 1,
                },
                DeviceRouteCount {
                    device: "eth1".to_string(),
                    count: 2,
                },
            ]
        );
    }

    #[test]
    fn test_empty_flush() {
        assert!(Aggregator::new().flush().is_empty());
    }
}
