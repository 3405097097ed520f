//! Report history, one page at a time.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::DashboardView;
use crate::api::endpoints::{REPORTS_PATH, paged};

/// Laravel-style paginator payload: `{ data: [...], last_page, ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct PagePayload<T> {
    pub data: Option<Vec<T>>,
    pub current_page: Option<u32>,
    pub last_page: Option<u32>,
    pub total: Option<u64>,
}

/// One normalized page of rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub page: u32,
    /// At least 1, even for an empty list.
    pub total_pages: u32,
    pub total: Option<u64>,
}

impl<T> Page<T> {
    /// Resolve paginator defaults. `requested` is the page that was asked
    /// for, used when the backend does not echo `current_page`.
    pub fn from_payload<R>(payload: PagePayload<R>, requested: u32, map: impl FnMut(R) -> T) -> Self {
        Self {
            rows: payload.data.unwrap_or_default().into_iter().map(map).collect(),
            page: payload.current_page.unwrap_or(requested).max(1),
            total_pages: payload.last_page.unwrap_or(1).max(1),
            total: payload.total,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportPayload {
    pub id: Option<Value>,
    #[serde(alias = "reportType")]
    pub report_type: Option<String>,
    pub format: Option<String>,
    pub status: Option<String>,
    #[serde(alias = "generatedBy")]
    pub generated_by: Option<Value>,
    #[serde(alias = "generatedAt")]
    pub generated_at: Option<String>,
    #[serde(alias = "downloadUrl")]
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStatus {
    Generating,
    Completed,
    Failed,
    Other(String),
}

impl Serialize for ReportStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl ReportStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "GENERATING" => Self::Generating,
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Generating => "GENERATING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub id: String,
    pub report_type: String,
    pub format: String,
    pub status: ReportStatus,
    pub generated_by: String,
    /// `None` when the backend timestamp is missing or unparseable.
    pub generated_at: Option<DateTime<Utc>>,
    pub download_url: Option<String>,
}

impl ReportRow {
    /// Only completed reports with a link can be downloaded.
    pub fn is_downloadable(&self) -> bool {
        self.status == ReportStatus::Completed && self.download_url.is_some()
    }
}

/// `GET /reports?page=N`.
#[derive(Debug, Clone, Copy)]
pub struct ReportsView {
    pub page: u32,
}

impl Default for ReportsView {
    fn default() -> Self {
        Self { page: 1 }
    }
}

impl DashboardView for ReportsView {
    type Raw = PagePayload<ReportPayload>;
    type Model = Page<ReportRow>;
    const SUBJECT: &'static str = "reports";

    fn path(&self) -> String {
        paged(REPORTS_PATH, self.page)
    }

    fn normalize(&self, raw: Self::Raw) -> Self::Model {
        Page::from_payload(raw, self.page, |report| ReportRow {
            id: report.id.as_ref().map(value_to_string).unwrap_or_default(),
            report_type: report.report_type.unwrap_or_default(),
            format: report.format.unwrap_or_default(),
            status: ReportStatus::parse(report.status.as_deref().unwrap_or("")),
            generated_by: report
                .generated_by
                .as_ref()
                .map(value_to_string)
                .unwrap_or_default(),
            generated_at: report.generated_at.as_deref().and_then(parse_timestamp),
            download_url: report.download_url.filter(|url| !url.is_empty()),
        })
    }
}

/// Render an id-like JSON value (number or string) as text.
pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parse RFC 3339 or the backend's `YYYY-MM-DD HH:MM:SS` (UTC) format.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
