//! Rain probability per cloud genus and the display tiers built on it.

use serde::Serialize;

/// Probability returned for codes missing from [`RAIN_PROBABILITY`].
pub const DEFAULT_RAIN_PROBABILITY: f64 = 0.10;

/// Resolved label when an image has no detections.
pub const UNKNOWN_CLOUD: &str = "Unknown";

/// Two-letter cloud code → estimated chance of rain.
pub const RAIN_PROBABILITY: &[(&str, f64)] = &[
    ("Cb", 0.95), // Cumulonimbus
    ("Ns", 0.90), // Nimbostratus
    ("As", 0.60), // Altostratus
    ("Sc", 0.40), // Stratocumulus
    ("Cu", 0.30), // Cumulus
    ("Ac", 0.25), // Altocumulus
    ("St", 0.20), // Stratus
    ("Cs", 0.12), // Cirrostratus
    ("Ci", 0.05), // Cirrus
    (UNKNOWN_CLOUD, 0.0),
    ("Cc", 0.10), // Cirrocumulus
    ("Ct", 0.15), // Contrail
];

/// Look up the rain probability for a cloud code.
///
/// Codes outside the table fall back to [`DEFAULT_RAIN_PROBABILITY`]. Note
/// that `"Unknown"` is in the table and maps to `0.0`.
pub fn estimate_rain_probability(cloud_type: &str) -> f64 {
    RAIN_PROBABILITY
        .iter()
        .find(|(code, _)| *code == cloud_type)
        .map(|&(_, prob)| prob)
        .unwrap_or(DEFAULT_RAIN_PROBABILITY)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Tier a probability: above 0.7 is high, above 0.4 is medium.
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.7 {
            RiskLevel::High
        } else if probability > 0.4 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Gauge bar colour for this tier.
    pub fn gauge_color(self) -> &'static str {
        match self {
            RiskLevel::High => "red",
            RiskLevel::Medium => "orange",
            RiskLevel::Low => "green",
        }
    }
}
