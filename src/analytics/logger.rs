use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request log entry (JSONL)
// ---------------------------------------------------------------------------

/// Outcome of one gateway request as recorded in the request log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestOutcome {
    /// Envelope reported success.
    Ok,
    /// Structurally valid response whose envelope reported failure.
    Failed,
    /// HTTP status >= 500.
    Server,
    /// Connection, timeout or decode failure.
    Network,
}

impl std::fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Failed => write!(f, "failed"),
            Self::Server => write!(f, "server"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// A single entry in the request log (`~/.orgdash/requests.jsonl`).
///
/// Bodies are never logged; the login password must not reach disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEvent {
    pub timestamp: String,
    pub method: String,
    /// Endpoint path without the base URL (query string included).
    pub path: String,
    /// HTTP status, absent when no response arrived.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<u16>,
    pub duration_ms: u64,
    pub outcome: RequestOutcome,
    /// Whether an `Authorization` header was attached.
    #[serde(default)]
    pub authenticated: bool,
}

impl RequestEvent {
    pub fn new(
        method: &str,
        path: &str,
        status: Option<u16>,
        duration_ms: u64,
        outcome: RequestOutcome,
        authenticated: bool,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            method: method.to_string(),
            path: path.to_string(),
            status,
            duration_ms,
            outcome,
            authenticated,
        }
    }

    /// Endpoint path with the query string stripped, for grouping.
    pub fn endpoint(&self) -> &str {
        self.path.split('?').next().unwrap_or(&self.path)
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Append an event to the log at `path`.
///
/// Best effort: write failures are ignored and never fail a
/// dashboard command.
pub fn log_request(path: &Path, event: &RequestEvent) {
    let _ = append_event(path, event);
}

fn append_event(path: &Path, event: &RequestEvent) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(event)?;
    writeln!(file, "{json}")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read all request events from `path`.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_all_events(path: &Path) -> Vec<RequestEvent> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<RequestEvent>(&line).ok())
        .collect()
}

/// Read events from the last N days. `None` returns everything.
pub fn read_events_since_days(path: &Path, days: Option<u32>) -> Vec<RequestEvent> {
    let events = read_all_events(path);

    let Some(days) = days else {
        return events;
    };

    let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();

    events
        .into_iter()
        .filter(|e| e.timestamp >= cutoff)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("requests.jsonl");

        log_request(
            &path,
            &RequestEvent::new("GET", "/reports?page=2", Some(200), 12, RequestOutcome::Ok, true),
        );
        log_request(
            &path,
            &RequestEvent::new("GET", "/dashboard/overview", None, 3, RequestOutcome::Network, false),
        );

        let events = read_all_events(&path);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].endpoint(), "/reports");
        assert_eq!(events[0].status, Some(200));
        assert_eq!(events[1].outcome, RequestOutcome::Network);
        assert!(!events[1].authenticated);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requests.jsonl");
        fs::write(&path, "garbage\n").unwrap();
        log_request(
            &path,
            &RequestEvent::new("POST", "/auth/login", Some(422), 5, RequestOutcome::Failed, false),
        );
        assert_eq!(read_all_events(&path).len(), 1);
    }

    #[test]
    fn day_window_filters_old_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requests.jsonl");
        let mut old = RequestEvent::new("GET", "/employees", Some(200), 1, RequestOutcome::Ok, true);
        old.timestamp = (Utc::now() - chrono::Duration::days(30)).to_rfc3339();
        log_request(&path, &old);
        log_request(
            &path,
            &RequestEvent::new("GET", "/employees", Some(200), 1, RequestOutcome::Ok, true),
        );

        assert_eq!(read_events_since_days(&path, Some(7)).len(), 1);
        assert_eq!(read_events_since_days(&path, None).len(), 2);
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_all_events(&dir.path().join("none.jsonl")).is_empty());
    }
}
