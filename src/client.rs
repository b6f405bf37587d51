//! HTTP binding to the hosted Roboflow workflow.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info};

use crate::config::RoboflowConfig;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("workflow returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("could not read staged image: {0}")]
    Image(#[from] std::io::Error),
}

/// Anything that can classify a staged image file into a raw workflow response.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image_path: &Path) -> Result<Value, ClassifyError>;
}

pub struct WorkflowClient {
    client: reqwest::Client,
    config: RoboflowConfig,
}

impl WorkflowClient {
    pub fn new(config: RoboflowConfig) -> Result<Self, ClassifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// `{api_url}/{workspace}/workflows/{workflow}`
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}/workflows/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.workspace.trim_matches('/'),
            self.config.workflow.trim_matches('/'),
        )
    }

    pub fn request_body(&self, image_b64: String) -> Value {
        let mut body = json!({
            "api_key": self.config.api_key,
            "use_cache": self.config.use_cache,
            "inputs": {
                "image": {"type": "base64", "value": image_b64}
            }
        });
        if self.config.skip_visualization {
            body["excluded_fields"] = json!(["visualization"]);
        }
        body
    }

    /// Run the workflow on one image and return its `outputs` array.
    ///
    /// A response without `outputs` comes back as `null`; shape checking is
    /// left to the caller.
    pub async fn run_workflow(&self, image_path: &Path) -> Result<Value, ClassifyError> {
        let bytes = tokio::fs::read(image_path).await?;
        let body = self.request_body(BASE64.encode(&bytes));

        info!(
            workspace = %self.config.workspace,
            workflow = %self.config.workflow,
            bytes = bytes.len(),
            "running classification workflow"
        );
        let resp = self.client.post(self.endpoint()).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "workflow request failed");
            return Err(ClassifyError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let mut payload: Value = resp.json().await?;
        Ok(payload
            .get_mut("outputs")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }
}

#[async_trait]
impl Classifier for WorkflowClient {
    async fn classify(&self, image_path: &Path) -> Result<Value, ClassifyError> {
        self.run_workflow(image_path).await
    }
}
