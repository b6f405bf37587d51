//! Turning a raw workflow response into one cloud type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::rain::{estimate_rain_probability, UNKNOWN_CLOUD};

/// One detected cloud instance. Only `class` is read; the rest (confidence,
/// bounding box, detection id) is carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionInstance {
    pub class: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl PredictionInstance {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            metadata: Map::new(),
        }
    }
}

// `[{"predictions": {"predictions": [...]}}]`, first element only.
#[derive(Deserialize)]
struct WorkflowOutput {
    predictions: DetectionBlock,
}

#[derive(Deserialize)]
struct DetectionBlock {
    predictions: Vec<Value>,
}

/// Pull the per-instance predictions out of a workflow response.
///
/// A response that does not match the expected shape yields an empty list
/// instead of an error. Individual instances without a string `class` are
/// skipped; the rest are kept.
pub fn extract_predictions(response: &Value) -> Vec<PredictionInstance> {
    let Some(first) = response.as_array().and_then(|outputs| outputs.first()) else {
        debug!("response is not a non-empty array");
        return Vec::new();
    };

    let instances = match WorkflowOutput::deserialize(first) {
        Ok(output) => output.predictions.predictions,
        Err(e) => {
            warn!(error = %e, "unexpected workflow output shape, treating as no detections");
            return Vec::new();
        }
    };

    instances
        .iter()
        .enumerate()
        .filter_map(|(index, instance)| match PredictionInstance::deserialize(instance) {
            Ok(prediction) => Some(prediction),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed prediction");
                None
            }
        })
        .collect()
}

/// Majority vote over per-instance labels.
///
/// Returns `"Unknown"` for an empty list. On a tie, the label that first
/// appears earliest in `labels` wins.
pub fn resolve_cloud_type<S: AsRef<str>>(labels: &[S]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for label in labels {
        let label = label.as_ref();
        match counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (label, count) in counts {
        let better = match best {
            None => true,
            Some((_, top)) => count > top,
        };
        if better {
            best = Some((label, count));
        }
    }

    best.map(|(label, _)| label.to_string())
        .unwrap_or_else(|| UNKNOWN_CLOUD.to_string())
}

/// Outcome of running the full reduction over one response.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudAssessment {
    pub cloud_type: String,
    pub rain_probability: f64,
    /// Labels of every detected instance, in response order.
    pub labels: Vec<String>,
}

/// extract → vote → look up.
pub fn analyze(response: &Value) -> CloudAssessment {
    let labels: Vec<String> = extract_predictions(response)
        .into_iter()
        .map(|p| p.class)
        .collect();
    let cloud_type = resolve_cloud_type(&labels);
    let rain_probability = estimate_rain_probability(&cloud_type);

    debug!(detections = labels.len(), %cloud_type, rain_probability, "assessed sky");

    CloudAssessment {
        cloud_type,
        rain_probability,
        labels,
    }
}
