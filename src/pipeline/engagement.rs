//! Engagement: login trends, active users, appointments and inactivity.

use serde::{Deserialize, Serialize};

use super::{DashboardView, percent};
use crate::api::endpoints::ENGAGEMENT_PATH;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngagementPayload {
    pub login_trends: Option<Vec<LoginTrendPayload>>,
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub weekly_active_users: Option<u64>,
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub monthly_active_users: Option<u64>,
    pub appointment_metrics: Option<AppointmentPayload>,
    pub inactivity_flags: Option<InactivityPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginTrendPayload {
    pub date: Option<String>,
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub logins: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentPayload {
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub total_booked: Option<u64>,
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub completed: Option<u64>,
    #[serde(default, deserialize_with = "super::lenient::rate")]
    pub no_show_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InactivityPayload {
    #[serde(rename = "30_days")]
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub days_30: Option<u64>,
    #[serde(rename = "60_days")]
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub days_60: Option<u64>,
    #[serde(rename = "90_days")]
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub days_90: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementModel {
    pub login_trends: Vec<LoginTrendPoint>,
    pub weekly_active_users: u64,
    pub monthly_active_users: u64,
    pub appointments: AppointmentSummary,
    /// 30, 60 and 90 day windows, in that order.
    pub inactivity: Vec<InactivityFlag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginTrendPoint {
    pub date: String,
    pub logins: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentSummary {
    pub total_booked: u64,
    pub completed: u64,
    pub no_show_rate: f64,
    /// Completed share of booked appointments, one decimal (`"30.0"`), or
    /// `"0"` when nothing was booked or completed.
    pub completion_rate: String,
}

impl AppointmentSummary {
    /// Completion rate with its percent sign, as shown on the card.
    pub fn completion_label(&self) -> String {
        format!("{}%", self.completion_rate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InactivityFlag {
    pub days: u32,
    pub count: u64,
    /// Share of monthly active users, in percent.
    pub share_pct: f64,
}

/// Completed share of booked appointments, formatted for display.
pub fn completion_rate(completed: u64, total_booked: u64) -> String {
    if completed == 0 || total_booked == 0 {
        return "0".to_string();
    }
    format!("{:.1}", percent(completed, total_booked))
}

/// `GET /analytics/engagement`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngagementView;

impl DashboardView for EngagementView {
    type Raw = EngagementPayload;
    type Model = EngagementModel;
    const SUBJECT: &'static str = "engagement metrics";

    fn path(&self) -> String {
        ENGAGEMENT_PATH.to_string()
    }

    fn normalize(&self, raw: EngagementPayload) -> EngagementModel {
        let monthly_active_users = raw.monthly_active_users.unwrap_or(0);
        let appointments = raw.appointment_metrics.unwrap_or_default();
        let total_booked = appointments.total_booked.unwrap_or(0);
        let completed = appointments.completed.unwrap_or(0);
        let flags = raw.inactivity_flags.unwrap_or_default();

        // Inactivity bars are scaled against MAU, never below 1.
        let mau_base = monthly_active_users.max(1);
        let inactivity = [(30, flags.days_30), (60, flags.days_60), (90, flags.days_90)]
            .into_iter()
            .map(|(days, count)| {
                let count = count.unwrap_or(0);
                InactivityFlag {
                    days,
                    count,
                    share_pct: percent(count, mau_base),
                }
            })
            .collect();

        EngagementModel {
            login_trends: raw
                .login_trends
                .unwrap_or_default()
                .into_iter()
                .map(|point| LoginTrendPoint {
                    date: point.date.unwrap_or_default(),
                    logins: point.logins.unwrap_or(0),
                })
                .collect(),
            weekly_active_users: raw.weekly_active_users.unwrap_or(0),
            monthly_active_users,
            appointments: AppointmentSummary {
                total_booked,
                completed,
                no_show_rate: appointments.no_show_rate.unwrap_or(0.0),
                completion_rate: completion_rate(completed, total_booked),
            },
            inactivity,
        }
    }
}
