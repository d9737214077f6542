// Per-endpoint statistics derived from the retained samples.
// Nothing is cached: every call recomputes from the window it is given,
// so eviction never leaves stale aggregates behind.

use std::collections::HashMap;

use crate::models::{EndpointStats, PerformanceSample};

const MINUTE_MS: u64 = 60_000;
const SECOND_MS: u64 = 1_000;

/// Nearest-rank percentile over an ascending slice; 0 when empty.
pub fn percentile(sorted: &[u64], p: f64) -> u64 {
    let n = sorted.len();
    if n == 0 {
        return 0;
    }
    let rank = ((p / 100.0) * n as f64).ceil() as i64 - 1;
    let idx = rank.clamp(0, n as i64 - 1) as usize;
    sorted[idx]
}

/// Stats for one endpoint, or `None` when no retained sample matches.
pub fn stats_for<'a, I>(samples: I, endpoint_key: &str, now: u64) -> Option<EndpointStats>
where
    I: IntoIterator<Item = &'a PerformanceSample>,
{
    let matching: Vec<&PerformanceSample> = samples
        .into_iter()
        .filter(|s| s.endpoint_key == endpoint_key)
        .collect();
    compute(endpoint_key, &matching, now)
}

/// One entry per endpoint, in the order each endpoint first appears in the window.
pub fn all_endpoint_stats<'a, I>(samples: I, now: u64) -> Vec<EndpointStats>
where
    I: IntoIterator<Item = &'a PerformanceSample>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&PerformanceSample>> = HashMap::new();
    for s in samples {
        let key = s.endpoint_key.as_str();
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(s);
    }
    order
        .into_iter()
        .filter_map(|key| groups.get(key).and_then(|group| compute(key, group, now)))
        .collect()
}

fn compute(endpoint_key: &str, samples: &[&PerformanceSample], now: u64) -> Option<EndpointStats> {
    if samples.is_empty() {
        return None;
    }
    let total = samples.len() as u64;
    let mut times: Vec<u64> = samples.iter().map(|s| s.response_time_ms).collect();
    times.sort_unstable();
    let sum: u128 = times.iter().map(|&t| u128::from(t)).sum();
    let error_count = samples.iter().filter(|s| s.is_failure()).count() as u64;
    let minute_ago = now.saturating_sub(MINUTE_MS);
    let requests_per_minute = samples.iter().filter(|s| s.timestamp > minute_ago).count() as u64;
    let last_updated_at = samples.iter().map(|s| s.timestamp).max().unwrap_or(0);

    Some(EndpointStats {
        endpoint_key: endpoint_key.to_string(),
        total_requests: total,
        error_count,
        error_rate: error_count as f64 / total as f64 * 100.0,
        average_response_time_ms: sum as f64 / total as f64,
        min_response_time_ms: times[0],
        max_response_time_ms: times[times.len() - 1],
        p95_response_time_ms: percentile(&times, 95.0),
        p99_response_time_ms: percentile(&times, 99.0),
        requests_per_minute,
        last_updated_at,
    })
}

/// Window-wide totals: (requests, average response time, error rate %).
/// All zero for an empty window. Response times are summed in `u128`, so any
/// `u64` duration is accepted.
pub fn summarize<'a, I>(samples: I) -> (u64, f64, f64)
where
    I: IntoIterator<Item = &'a PerformanceSample>,
{
    let (count, sum, failures) = samples.into_iter().fold((0u64, 0u128, 0u64), |acc, s| {
        (
            acc.0 + 1,
            acc.1 + u128::from(s.response_time_ms),
            acc.2 + u64::from(s.is_failure()),
        )
    });
    if count == 0 {
        return (0, 0.0, 0.0);
    }
    (
        count,
        sum as f64 / count as f64,
        failures as f64 / count as f64 * 100.0,
    )
}

/// Samples recorded within the last second.
pub fn requests_per_second<'a, I>(samples: I, now: u64) -> u32
where
    I: IntoIterator<Item = &'a PerformanceSample>,
{
    let second_ago = now.saturating_sub(SECOND_MS);
    samples
        .into_iter()
        .filter(|s| s.timestamp > second_ago)
        .count()
        .min(u32::MAX as usize) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_rank_is_clamped() {
        let v = [3, 9];
        assert_eq!(percentile(&v, 0.0), 3);
        assert_eq!(percentile(&v, 50.0), 3);
        assert_eq!(percentile(&v, 51.0), 9);
        assert_eq!(percentile(&v, 150.0), 9);
    }
}
