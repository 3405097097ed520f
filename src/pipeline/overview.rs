//! Dashboard overview: headcount, activity, engagement and risk mix.

use serde::{Deserialize, Serialize};

use super::{DashboardView, Segment};
use crate::api::endpoints::OVERVIEW_PATH;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverviewPayload {
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub total_employees: Option<u64>,
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub active_users: Option<u64>,
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub inactive_users: Option<u64>,
    #[serde(default, deserialize_with = "super::lenient::rate")]
    pub engagement_rate: Option<f64>,
    #[serde(default, deserialize_with = "super::lenient::rate")]
    pub program_participation_rate: Option<f64>,
    pub risk_distribution: Option<RiskPayload>,
    pub outcome_indicators: Option<OutcomePayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskPayload {
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub low: Option<u64>,
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub medium: Option<u64>,
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub high: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutcomePayload {
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub improved: Option<u64>,
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub stable: Option<u64>,
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub declined: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewModel {
    pub total_employees: u64,
    pub active_users: u64,
    pub inactive_users: u64,
    pub engagement_rate: f64,
    pub program_participation_rate: f64,
    pub risk_distribution: RiskDistribution,
    /// `None` when the backend does not track outcomes for this organization.
    pub outcome_indicators: Option<OutcomeIndicators>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskDistribution {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

impl RiskDistribution {
    pub fn segments(&self) -> Vec<Segment> {
        vec![
            Segment::new("Low", Some(self.low)),
            Segment::new("Medium", Some(self.medium)),
            Segment::new("High", Some(self.high)),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeIndicators {
    pub improved: u64,
    pub stable: u64,
    pub declined: u64,
}

impl OutcomeIndicators {
    pub fn segments(&self) -> Vec<Segment> {
        vec![
            Segment::new("Improved", Some(self.improved)),
            Segment::new("Stable", Some(self.stable)),
            Segment::new("Declined", Some(self.declined)),
        ]
    }
}

/// `GET /dashboard/overview`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverviewView;

impl DashboardView for OverviewView {
    type Raw = OverviewPayload;
    type Model = OverviewModel;
    const SUBJECT: &'static str = "dashboard metrics";

    fn path(&self) -> String {
        OVERVIEW_PATH.to_string()
    }

    fn normalize(&self, raw: OverviewPayload) -> OverviewModel {
        let risk = raw.risk_distribution.unwrap_or_default();

        OverviewModel {
            total_employees: raw.total_employees.unwrap_or(0),
            active_users: raw.active_users.unwrap_or(0),
            inactive_users: raw.inactive_users.unwrap_or(0),
            engagement_rate: raw.engagement_rate.unwrap_or(0.0),
            program_participation_rate: raw.program_participation_rate.unwrap_or(0.0),
            risk_distribution: RiskDistribution {
                low: risk.low.unwrap_or(0),
                medium: risk.medium.unwrap_or(0),
                high: risk.high.unwrap_or(0),
            },
            outcome_indicators: raw.outcome_indicators.map(|o| OutcomeIndicators {
                improved: o.improved.unwrap_or(0),
                stable: o.stable.unwrap_or(0),
                declined: o.declined.unwrap_or(0),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(json: serde_json::Value) -> OverviewModel {
        OverviewView.normalize(serde_json::from_value(json).unwrap())
    }

    #[test]
    fn full_payload_maps_fields() {
        let model = normalize(serde_json::json!({
            "total_employees": 250,
            "active_users": 196,
            "inactive_users": 54,
            "engagement_rate": 78.4,
            "program_participation_rate": 61.2,
            "risk_distribution": {"low": 150, "medium": 70, "high": 30},
            "outcome_indicators": {"improved": 40, "stable": 100, "declined": 8},
        }));
        assert_eq!(model.total_employees, 250);
        assert_eq!(model.inactive_users, 54);
        assert!((model.engagement_rate - 78.4).abs() < f64::EPSILON);
        assert_eq!(model.risk_distribution.high, 30);
        assert_eq!(model.outcome_indicators.map(|o| o.declined), Some(8));
    }

    #[test]
    fn empty_payload_defaults_to_zero() {
        let model = normalize(serde_json::json!({}));
        assert_eq!(model.total_employees, 0);
        assert_eq!(model.engagement_rate, 0.0);
        assert_eq!(model.risk_distribution, RiskDistribution::default());
        assert!(model.outcome_indicators.is_none());
    }

    #[test]
    fn string_and_float_aggregates_still_load() {
        let model = normalize(serde_json::json!({
            "total_employees": 250.0,
            "active_users": "196",
            "engagement_rate": "78.4",
            "risk_distribution": {"low": "150", "medium": 70.0, "high": "n/a"},
        }));
        assert_eq!(model.total_employees, 250);
        assert_eq!(model.active_users, 196);
        assert!((model.engagement_rate - 78.4).abs() < f64::EPSILON);
        assert_eq!(
            model.risk_distribution,
            RiskDistribution {
                low: 150,
                medium: 70,
                high: 0
            }
        );
    }

    #[test]
    fn present_but_partial_outcomes_stay_present() {
        let model = normalize(serde_json::json!({"outcome_indicators": {"improved": 3}}));
        assert_eq!(
            model.outcome_indicators,
            Some(OutcomeIndicators {
                improved: 3,
                stable: 0,
                declined: 0
            })
        );
    }

    #[test]
    fn risk_segments_are_ordered() {
        let labels: Vec<String> = RiskDistribution::default()
            .segments()
            .into_iter()
            .map(|s| s.label)
            .collect();
        assert_eq!(labels, ["Low", "Medium", "High"]);
    }
}
