//! Request and response bodies for the event API.
//!
//! Every business field is optional with a defined default: the pipeline is
//! an untrusted reporter, and a missing field never fails the call. Only an
//! unparseable body is rejected (by the `Json` extractor, before any
//! mutation).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::snapshot::{DEFAULT_MAX_ITERATIONS, RunStatus};

/// Body of `POST /api/pipeline/start`.
#[derive(Debug, Deserialize)]
pub struct PipelineStartRequest {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,
}

fn default_max_iterations() -> u64 {
    DEFAULT_MAX_ITERATIONS
}

/// Body of `POST /api/iteration/start`.
#[derive(Debug, Deserialize)]
pub struct IterationStartRequest {
    /// Defaults to the previous iteration number plus one.
    #[serde(default)]
    pub number: Option<u64>,
}

/// Body of `POST /api/step/start`.
#[derive(Debug, Deserialize)]
pub struct StepStartRequest {
    #[serde(default)]
    pub step: String,
}

/// Body of `POST /api/step/complete`.
#[derive(Debug, Deserialize)]
pub struct StepCompleteRequest {
    #[serde(default)]
    pub step: String,
    #[serde(default)]
    pub result: Map<String, Value>,
}

/// Body of `POST /api/pipeline/finish`.
#[derive(Debug, Deserialize)]
pub struct PipelineFinishRequest {
    #[serde(default = "default_finish_status")]
    pub status: RunStatus,
    #[serde(default)]
    pub summary: Map<String, Value>,
}

fn default_finish_status() -> RunStatus {
    RunStatus::Finished
}

/// Acknowledgement returned by all five event endpoints.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Response from the health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
