//! Generative text model seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_output_tokens: 690,
            temperature: 0.7,
        }
    }
}

/// Single-turn, non-streaming completion. The reply is untrusted free text:
/// nothing guarantees it follows the format the prompt asked for.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String, ModelError>;
}
