// SPDX-FileCopyrightText: 2026 Pulse Station Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the GitHub Actions `workflow_dispatch` endpoint.
//!
//! Provides [`GithubDispatcher`], which starts the broadcast workflow in a
//! target repository using the unlocked personal access token.

use std::time::Duration;

use pulse_config::model::StationConfig;
use pulse_core::{PulseError, StationTarget};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = "pulse-station";

/// Request body of a workflow dispatch.
#[derive(Debug, Serialize)]
struct DispatchRequest<'a> {
    #[serde(rename = "ref")]
    git_ref: &'a str,
    inputs: DispatchInputs,
}

#[derive(Debug, Serialize)]
struct DispatchInputs {
    /// GitHub only accepts string-valued workflow inputs.
    is_test: String,
}

/// Error body returned by the GitHub REST API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    message: String,
}

/// Dispatches the broadcast workflow through the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubDispatcher {
    client: reqwest::Client,
    api_base: String,
    workflow: String,
    branch: String,
}

impl GithubDispatcher {
    /// Creates a dispatcher for the configured API base, workflow and branch.
    pub fn new(config: &StationConfig) -> Result<Self, PulseError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PulseError::Dispatch {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            workflow: config.workflow.clone(),
            branch: config.branch.clone(),
        })
    }

    /// Workflow file this dispatcher starts.
    pub fn workflow(&self) -> &str {
        &self.workflow
    }

    /// Endpoint for `target`'s broadcast workflow.
    pub fn dispatch_url(&self, target: &StationTarget) -> String {
        format!(
            "{}/repos/{}/{}/actions/workflows/{}/dispatches",
            self.api_base, target.user, target.repo, self.workflow
        )
    }

    /// Starts one workflow run on `target`, authenticated with `pat`.
    ///
    /// Any 2xx response is success. No retry: a repeated dispatch would start
    /// a second broadcast.
    pub async fn dispatch(
        &self,
        target: &StationTarget,
        pat: &SecretString,
        test_mode: bool,
    ) -> Result<(), PulseError> {
        let mut auth = HeaderValue::from_str(&format!("token {}", pat.expose_secret()))
            .map_err(|_| PulseError::Dispatch {
                message: "access token contains characters not valid in a header".into(),
                source: None,
            })?;
        auth.set_sensitive(true);

        let body = DispatchRequest {
            git_ref: &self.branch,
            inputs: DispatchInputs {
                is_test: test_mode.to_string(),
            },
        };

        let response = self
            .client
            .post(self.dispatch_url(target))
            .header(AUTHORIZATION, auth)
            .json(&body)
            .send()
            .await
            .map_err(|e| PulseError::Dispatch {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, repo = %target.slug(), "dispatch response received");

        if status.is_success() {
            info!(repo = %target.slug(), workflow = %self.workflow, test_mode, "broadcast dispatched");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        Err(PulseError::Dispatch {
            message: self.error_message(status, &text),
            source: None,
        })
    }

    fn error_message(&self, status: reqwest::StatusCode, body: &str) -> String {
        match serde_json::from_str::<ApiErrorResponse>(body) {
            Ok(err) if err.message == "Not Found" => format!(
                "workflow file '{}' not found in {} branch",
                self.workflow, self.branch
            ),
            Ok(err) => err.message,
            Err(_) => format!("GitHub returned {status}: {body}"),
        }
    }
}
