use serde::Serialize;
use serde_json::Value;

use crate::prediction::CloudAssessment;
use crate::rain::RiskLevel;

/// JSON body returned for an analyzed upload.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub cloud_type: String,
    pub rain_probability: f64,
    pub rain_percent: f64,
    pub risk_level: RiskLevel,
    pub gauge_color: &'static str,
    pub detections: usize,
    pub labels: Vec<String>,
    /// Workflow response as received, for diagnostics.
    pub raw: Value,
}

impl AnalysisReport {
    pub fn new(assessment: CloudAssessment, raw: Value) -> Self {
        let risk_level = RiskLevel::from_probability(assessment.rain_probability);
        Self {
            rain_percent: assessment.rain_probability * 100.0,
            rain_probability: assessment.rain_probability,
            risk_level,
            gauge_color: risk_level.gauge_color(),
            detections: assessment.labels.len(),
            cloud_type: assessment.cloud_type,
            labels: assessment.labels,
            raw,
        }
    }
}
