//! Inference backend contract
//!
//! Request/response bodies of the two JSON endpoints the level pages call.
//! No client lives here; callers bring their own HTTP stack.

use serde::{Deserialize, Serialize};

pub const GENERATE_ENDPOINT: &str = "/api/generate";
pub const COUNCIL_ENDPOINT: &str = "/api/council";

/// Body for both endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub query: String,
    /// Consciousness level (1-5) of the calling page
    pub level: u8,
    pub model: String,
}

impl GenerationRequest {
    pub fn new(query: impl Into<String>, level: u8, model: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            level,
            model: model.into(),
        }
    }
}

/// `/api/generate` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

/// One council member's answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilVoice {
    /// Older backends label this `model`
    #[serde(alias = "model")]
    pub perspective: String,
    pub response: String,
    pub confidence: f32,
}

/// `/api/council` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilResponse {
    pub council_responses: Vec<CouncilVoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_convergence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthesis: Option<String>,
}

impl CouncilResponse {
    /// Mean confidence across voices, 0 when empty
    pub fn mean_confidence(&self) -> f32 {
        if self.council_responses.is_empty() {
            return 0.0;
        }
        let total: f32 = self.council_responses.iter().map(|v| v.confidence).sum();
        total / self.council_responses.len() as f32
    }
}
