use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use ootd_suggest::{GenerationParams, ModelError, TextModel};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

use crate::config::LlmSection;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const OPENAI_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    OpenAI,
}

impl Provider {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAI),
            other => bail!("unknown llm provider: {other} (expected gemini or openai)"),
        }
    }

    fn key_var(self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            Provider::Gemini => GEMINI_BASE_URL,
            Provider::OpenAI => OPENAI_BASE_URL,
        }
    }
}

/// Build the configured model client. A missing API key is not an error here:
/// the client reports `NotConfigured` on first use so `ootd serve` still starts.
pub fn build_model(cfg: &LlmSection) -> Result<Arc<dyn TextModel>> {
    let provider = Provider::parse(&cfg.provider)?;
    let api_key = std::env::var(provider.key_var()).ok().filter(|k| !k.trim().is_empty());
    let base_url = cfg
        .base_url
        .clone()
        .unwrap_or_else(|| provider.default_base_url().to_string());
    let base_url = base_url.trim_end_matches('/').to_string();

    if api_key.is_none() {
        tracing::warn!(provider = ?provider, "{} is not set; suggestions will fail", provider.key_var());
    }

    let http = reqwest::Client::new();
    Ok(match provider {
        Provider::Gemini => Arc::new(GeminiClient {
            http,
            base_url,
            model: cfg.model.clone(),
            api_key,
        }),
        Provider::OpenAI => Arc::new(OpenAiClient {
            http,
            base_url,
            model: cfg.model.clone(),
            api_key,
        }),
    })
}

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentOut>,
}

#[derive(Deserialize)]
struct GeminiContentOut {
    #[serde(default)]
    parts: Vec<GeminiPartOut>,
}

#[derive(Deserialize)]
struct GeminiPartOut {
    text: Option<String>,
}

impl GeminiResponse {
    /// Text of the first candidate, parts concatenated.
    fn text(self) -> String {
        let mut s = String::new();
        if let Some(content) = self.candidates.into_iter().next().and_then(|c| c.content) {
            for part in content.parts {
                if let Some(t) = part.text {
                    s.push_str(&t);
                }
            }
        }
        s
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String, ModelError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ModelError::NotConfigured("GEMINI_API_KEY is not set".to_string()))?;

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: params.max_output_tokens,
                temperature: params.temperature,
            },
        };

        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let resp = self
            .http
            .post(url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let out: GeminiResponse = read_json(resp).await?;
        Ok(out.text())
    }
}

pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

#[async_trait]
impl TextModel for OpenAiClient {
    async fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String, ModelError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ModelError::NotConfigured("OPENAI_API_KEY is not set".to_string()))?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: params.max_output_tokens,
            temperature: params.temperature,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        let resp = self
            .http
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let out: ChatResponse = read_json(resp).await?;
        Ok(out
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

async fn read_json<T: for<'de> Deserialize<'de>>(resp: reqwest::Response) -> Result<T, ModelError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ModelError::Status {
            status: status.as_u16(),
            body,
        });
    }
    resp.json::<T>()
        .await
        .map_err(|e| ModelError::Decode(e.to_string()))
}
