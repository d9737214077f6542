// Bounded, insertion-ordered sample and alert windows.
// Oldest entries are evicted first once a window exceeds its capacity.

use std::collections::VecDeque;

use crate::models::{Alert, PerformanceSample};

/// Max request samples kept in memory.
pub const MAX_SAMPLES: usize = 1000;

/// Max alerts kept in memory.
pub const MAX_ALERTS: usize = 100;

#[derive(Debug)]
pub struct SampleStore {
    samples: VecDeque<PerformanceSample>,
    alerts: VecDeque<Alert>,
    max_samples: usize,
    max_alerts: usize,
}

impl Default for SampleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_SAMPLES, MAX_ALERTS)
    }

    pub fn with_capacity(max_samples: usize, max_alerts: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples + 1),
            alerts: VecDeque::with_capacity(max_alerts + 1),
            max_samples,
            max_alerts,
        }
    }

    pub fn append(&mut self, sample: PerformanceSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.max_samples {
            self.samples.pop_front();
        }
    }

    pub fn append_alert(&mut self, alert: Alert) {
        self.alerts.push_back(alert);
        while self.alerts.len() > self.max_alerts {
            self.alerts.pop_front();
        }
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.alerts.clear();
    }

    pub fn samples(&self) -> &VecDeque<PerformanceSample> {
        &self.samples
    }

    pub fn alerts(&self) -> &VecDeque<Alert> {
        &self.alerts
    }

    /// Last `n` samples, oldest first.
    pub fn recent_samples(&self, n: usize) -> Vec<PerformanceSample> {
        tail(&self.samples, n)
    }

    /// Last `n` alerts, oldest first.
    pub fn recent_alerts(&self, n: usize) -> Vec<Alert> {
        tail(&self.alerts, n)
    }
}

fn tail<T: Clone>(items: &VecDeque<T>, n: usize) -> Vec<T> {
    let skip = items.len().saturating_sub(n);
    items.iter().skip(skip).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProcessCpu, ProcessMemory};

    fn sample(ms: u64) -> PerformanceSample {
        PerformanceSample::new(
            "/a",
            "GET",
            ms,
            200,
            0,
            ProcessMemory::default(),
            ProcessCpu::default(),
            ms,
        )
    }

    #[test]
    fn append_evicts_oldest_past_capacity() {
        let mut store = SampleStore::with_capacity(3, 2);
        for i in 0..5 {
            store.append(sample(i));
        }
        let kept: Vec<u64> = store.samples().iter().map(|s| s.response_time_ms).collect();
        assert_eq!(kept, vec![2, 3, 4]);
    }

    #[test]
    fn recent_samples_is_oldest_first_and_clamped() {
        let mut store = SampleStore::new();
        for i in 0..4 {
            store.append(sample(i));
        }
        let recent: Vec<u64> = store
            .recent_samples(2)
            .iter()
            .map(|s| s.response_time_ms)
            .collect();
        assert_eq!(recent, vec![2, 3]);
        assert_eq!(store.recent_samples(10).len(), 4);
        assert!(store.recent_samples(0).is_empty());
    }

    #[test]
    fn reset_clears_both_windows() {
        let mut store = SampleStore::new();
        store.append(sample(1));
        store.reset();
        assert!(store.samples().is_empty());
        assert!(store.alerts().is_empty());
    }
}
