//! External workflow dispatcher client
//!
//! The dashboard triggers automations (email, CRM, reminders, plans) by
//! forwarding a JSON payload to an external dispatcher and relaying its
//! `{success, data?, error?}` answer. A `success: false` answer is a soft
//! failure to surface to the user; only an unreachable dispatcher is a
//! server-side error.

use crate::config::WorkflowConfig;
use crate::error::{Result, VaultdeskError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Answer from the workflow dispatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    /// Whether the workflow ran successfully
    pub success: bool,
    /// Workflow output, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Failure description, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Dispatches named workflows with a JSON payload
///
/// Abstracted as a trait so tests can substitute a fake dispatcher
/// without a running webhook receiver.
#[async_trait]
pub trait WorkflowDispatcher: Send + Sync {
    /// Trigger a workflow by name
    async fn dispatch(&self, workflow: &str, payload: Value) -> Result<DispatchResult>;
}

/// HTTP implementation forwarding to the configured dispatcher URL
pub struct HttpWorkflowDispatcher {
    client: Client,
    base_url: String,
}

impl HttpWorkflowDispatcher {
    /// Create a dispatcher client from configuration
    pub fn new(config: &WorkflowConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| VaultdeskError::Workflow(format!("failed to build client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.dispatcher_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WorkflowDispatcher for HttpWorkflowDispatcher {
    async fn dispatch(&self, workflow: &str, payload: Value) -> Result<DispatchResult> {
        let url = format!("{}/webhook/{}", self.base_url, workflow);
        tracing::debug!(workflow, %url, "dispatching workflow");

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| VaultdeskError::Workflow(format!("dispatcher unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            // The dispatcher answered; relay the failure softly
            return Ok(DispatchResult {
                success: false,
                data: None,
                error: Some(format!("dispatcher returned {}", status)),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| VaultdeskError::Workflow(format!("invalid dispatcher response: {}", e)))?;

        // Prefer the dispatcher's own contract shape; wrap anything else
        match serde_json::from_value::<DispatchResult>(body.clone()) {
            Ok(result) => Ok(result),
            Err(_) => Ok(DispatchResult {
                success: true,
                data: Some(body),
                error: None,
            }),
        }
    }
}
