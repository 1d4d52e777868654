//! Shared wire types for the siteforge API boundary.
//!
//! These are pure data shapes: the inbound task request, the round outcome
//! returned to the caller, and the payload posted to the evaluation callback.
//! All behavior lives in the `siteforge` crate.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn default_email() -> String {
    "unknown".to_string()
}

fn default_task() -> String {
    "demo-task".to_string()
}

fn default_round() -> u32 {
    1
}

fn default_nonce() -> String {
    "none".to_string()
}

/// Inbound task request, one per round.
///
/// Field names and defaults match the wire format the evaluation harness
/// sends; anything optional is defaulted rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskRequest {
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_email")]
    pub email: String,
    #[serde(default = "default_task")]
    pub task: String,
    #[serde(default = "default_round")]
    pub round: u32,
    #[serde(default = "default_nonce")]
    pub nonce: String,
    #[serde(default)]
    pub brief: String,
    #[serde(default)]
    pub checks: Vec<String>,
    #[serde(default)]
    pub evaluation_url: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Binary attachment carried alongside the manifest through deployment.
///
/// The payload is a base64 data URI (`data:<mime>;base64,<data>`) or bare
/// base64 text. Undecodable payloads are skipped at deploy time, not rejected
/// here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Attachment {
    pub name: String,
    #[serde(alias = "url")]
    pub payload: String,
}

/// Result of one orchestrated round, returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoundOutcome {
    pub status: String,
    pub task: String,
    pub round: u32,
    pub repo_url: String,
    pub pages_url: String,
}

/// Round-completion event posted to the evaluation callback.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EvaluationPayload {
    pub email: String,
    pub task: String,
    pub round: u32,
    pub nonce: String,
    pub repo_url: String,
    pub commit_sha: String,
    pub pages_url: String,
}
