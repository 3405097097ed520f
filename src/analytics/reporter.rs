//! Activity reporter. Aggregates the JSONL request log for `orgdash activity`.
//!
//! Groups requests by endpoint and reports call counts, outcome
//! distribution and average latency.

use std::collections::HashMap;
use std::path::Path;

use crate::analytics::logger::{self, RequestEvent, RequestOutcome};

// ---------------------------------------------------------------------------
// Aggregated activity
// ---------------------------------------------------------------------------

/// Summary for `orgdash activity`.
#[derive(Debug)]
pub struct Activity {
    pub total_requests: usize,
    pub outcomes: OutcomeDistribution,
    /// Sorted by request count, busiest endpoint first.
    pub endpoints: Vec<EndpointStat>,
}

/// Per-endpoint aggregated statistics.
#[derive(Debug, Clone)]
pub struct EndpointStat {
    pub endpoint: String,
    pub count: usize,
    pub failures: usize,
    pub avg_duration_ms: u64,
    pub last_status: Option<u16>,
}

impl EndpointStat {
    /// Failure rate in percent; 0.0 for an empty stat.
    pub fn failure_pct(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.failures as f64 / self.count as f64) * 100.0
        }
    }
}

/// Distribution across request outcomes.
#[derive(Debug, Default)]
pub struct OutcomeDistribution {
    pub ok: usize,
    pub failed: usize,
    pub server: usize,
    pub network: usize,
}

impl OutcomeDistribution {
    pub fn total(&self) -> usize {
        self.ok + self.failed + self.server + self.network
    }

    /// Percentage for a given count, returns 0.0 if total is zero.
    pub fn pct(&self, count: usize) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (count as f64 / total as f64) * 100.0
        }
    }

    fn record(&mut self, outcome: RequestOutcome) {
        match outcome {
            RequestOutcome::Ok => self.ok += 1,
            RequestOutcome::Failed => self.failed += 1,
            RequestOutcome::Server => self.server += 1,
            RequestOutcome::Network => self.network += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Compute activity from the log at `path`, optionally limited to the last
/// `days` days.
pub fn compute_activity(path: &Path, days: Option<u32>) -> Activity {
    let events = logger::read_events_since_days(path, days);
    build_activity(&events)
}

fn build_activity(events: &[RequestEvent]) -> Activity {
    let mut outcomes = OutcomeDistribution::default();
    let mut groups: HashMap<&str, Vec<&RequestEvent>> = HashMap::new();

    for event in events {
        outcomes.record(event.outcome);
        groups.entry(event.endpoint()).or_default().push(event);
    }

    let mut endpoints: Vec<EndpointStat> = groups
        .into_iter()
        .map(|(endpoint, group)| {
            let count = group.len();
            let failures = group
                .iter()
                .filter(|e| e.outcome != RequestOutcome::Ok)
                .count();
            let total_ms: u64 = group.iter().map(|e| e.duration_ms).sum();
            let last_status = group
                .iter()
                .max_by(|a, b| a.timestamp.cmp(&b.timestamp))
                .and_then(|e| e.status);

            EndpointStat {
                endpoint: endpoint.to_string(),
                count,
                failures,
                avg_duration_ms: total_ms / count as u64,
                last_status,
            }
        })
        .collect();

    endpoints.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.endpoint.cmp(&b.endpoint)));

    Activity {
        total_requests: events.len(),
        outcomes,
        endpoints,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
