//! Population health: BMI, blood-pressure and diabetes risk distributions.
//!
//! All figures are aggregates; nothing here identifies an individual.

use serde::{Deserialize, Serialize};

use super::{DashboardView, Segment};
use crate::api::endpoints::POPULATION_HEALTH_PATH;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PopulationHealthPayload {
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub total_enrolled: Option<u64>,
    pub bmi_distribution: Option<BmiPayload>,
    pub blood_pressure_risk: Option<BloodPressurePayload>,
    pub diabetes_risk: Option<DiabetesPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BmiPayload {
    pub underweight: Option<BmiBucket>,
    pub normal: Option<BmiBucket>,
    pub overweight: Option<BmiBucket>,
    pub obese: Option<BmiBucket>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BmiBucket {
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub count: Option<u64>,
    #[serde(default, deserialize_with = "super::lenient::rate")]
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BloodPressurePayload {
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub normal: Option<u64>,
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub elevated: Option<u64>,
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub high: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiabetesPayload {
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub low: Option<u64>,
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub moderate: Option<u64>,
    #[serde(default, deserialize_with = "super::lenient::count")]
    pub high: Option<u64>,
}

/// Display model. A chart whose section is missing from the payload is
/// `None` so the page can say "no data" instead of drawing zeros.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationHealthModel {
    pub total_enrolled: u64,
    pub bmi_distribution: Option<Vec<Segment>>,
    pub blood_pressure_risk: Option<Vec<Segment>>,
    pub diabetes_risk: Option<Vec<Segment>>,
}

/// `GET /analytics/population-health`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PopulationHealthView;

impl DashboardView for PopulationHealthView {
    type Raw = PopulationHealthPayload;
    type Model = PopulationHealthModel;
    const SUBJECT: &'static str = "population health data";

    fn path(&self) -> String {
        POPULATION_HEALTH_PATH.to_string()
    }

    fn normalize(&self, raw: PopulationHealthPayload) -> PopulationHealthModel {
        PopulationHealthModel {
            total_enrolled: raw.total_enrolled.unwrap_or(0),
            bmi_distribution: raw.bmi_distribution.map(|bmi| {
                vec![
                    bmi_segment("Underweight", bmi.underweight),
                    bmi_segment("Normal", bmi.normal),
                    bmi_segment("Overweight", bmi.overweight),
                    bmi_segment("Obese", bmi.obese),
                ]
            }),
            blood_pressure_risk: raw.blood_pressure_risk.map(|bp| {
                vec![
                    Segment::new("Normal", bp.normal),
                    Segment::new("Elevated", bp.elevated),
                    Segment::new("High", bp.high),
                ]
            }),
            diabetes_risk: raw.diabetes_risk.map(|d| {
                vec![
                    Segment::new("Low", d.low),
                    Segment::new("Moderate", d.moderate),
                    Segment::new("High", d.high),
                ]
            }),
        }
    }
}

fn bmi_segment(label: &str, bucket: Option<BmiBucket>) -> Segment {
    let bucket = bucket.unwrap_or_default();
    Segment {
        percentage: bucket.percentage,
        ..Segment::new(label, bucket.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(json: serde_json::Value) -> PopulationHealthModel {
        PopulationHealthView.normalize(serde_json::from_value(json).unwrap())
    }

    #[test]
    fn bmi_buckets_keep_counts_and_percentages() {
        let model = normalize(serde_json::json!({
            "total_enrolled": 120,
            "bmi_distribution": {
                "underweight": {"count": 6, "percentage": 5.0},
                "normal": {"count": 54, "percentage": 45.0},
                "obese": {"count": 18}
            }
        }));
        assert_eq!(model.total_enrolled, 120);

        let bmi = model.bmi_distribution.unwrap();
        assert_eq!(bmi.len(), 4);
        assert_eq!(bmi[0].count, 6);
        assert_eq!(bmi[0].percentage, Some(5.0));
        assert_eq!(bmi[2].label, "Overweight");
        assert_eq!(bmi[2].count, 0);
        assert_eq!(bmi[3].percentage, None);
    }

    #[test]
    fn bucket_counts_may_be_strings() {
        let model = normalize(serde_json::json!({
            "total_enrolled": "120",
            "bmi_distribution": {"normal": {"count": "54", "percentage": "45.0"}},
            "blood_pressure_risk": {"elevated": 12.0}
        }));
        assert_eq!(model.total_enrolled, 120);
        let bmi = model.bmi_distribution.unwrap();
        assert_eq!(bmi[1].count, 54);
        assert_eq!(bmi[1].percentage, Some(45.0));
        assert_eq!(model.blood_pressure_risk.unwrap()[1].count, 12);
    }

    #[test]
    fn absent_sections_are_none_not_zero() {
        let model = normalize(serde_json::json!({"diabetes_risk": {"high": 2}}));
        assert_eq!(model.total_enrolled, 0);
        assert!(model.bmi_distribution.is_none());
        assert!(model.blood_pressure_risk.is_none());

        let diabetes = model.diabetes_risk.unwrap();
        let counts: Vec<u64> = diabetes.iter().map(|s| s.count).collect();
        assert_eq!(counts, [0, 0, 2]);
    }
}
