// crates/propdesk-agent/src/provider/http.rs
// ============================================================================
// Module: HTTP Reasoning Provider
// Description: Messages-API client for Anthropic-compatible endpoints.
// Purpose: Provide completion round trips with strict response parsing.
// Dependencies: reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! The HTTP provider posts conversation history and the tool catalog to an
//! Anthropic-compatible messages endpoint and parses the response into a
//! tagged [`ModelTurn`]. A small named registry selects between the default
//! `anthropic` endpoint and a `minimax` compatibility endpoint; the name is
//! taken from configuration or the `PROPDESK_PROVIDER` environment variable.
//! API keys are read from the environment at construction and never logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::contract::ToolSpec;
use crate::provider::ModelTurn;
use crate::provider::ProviderError;
use crate::provider::ReasoningProvider;
use crate::provider::ToolInvocation;
use crate::provider::Turn;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable selecting the provider name.
pub const PROVIDER_ENV: &str = "PROPDESK_PROVIDER";

/// Messages-API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default request timeout for completion calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum tokens requested per completion.
const MAX_TOKENS: u32 = 1024;

// ============================================================================
// SECTION: Provider Settings
// ============================================================================

/// Settings for one named reasoning endpoint.
///
/// # Invariants
/// - `base_url` has no trailing slash.
/// - `api_key_env` names the environment variable holding the key; the key
///   itself is never stored in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderSettings {
    /// Registry name of the provider.
    pub name: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Endpoint base URL.
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl ProviderSettings {
    /// Returns the settings registered under the given name.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnknownProvider`] for unregistered names.
    pub fn named(name: &str) -> Result<Self, ProviderError> {
        match name {
            "anthropic" => Ok(Self {
                name: "anthropic".to_string(),
                model: "claude-sonnet-4-5".to_string(),
                base_url: "https://api.anthropic.com".to_string(),
                api_key_env: "ANTHROPIC_API_KEY".to_string(),
            }),
            "minimax" => Ok(Self {
                name: "minimax".to_string(),
                model: "MiniMax-M2".to_string(),
                base_url: "https://api.minimax.io/anthropic".to_string(),
                api_key_env: "MINIMAX_API_KEY".to_string(),
            }),
            other => Err(ProviderError::UnknownProvider(other.to_string())),
        }
    }

    /// Returns settings from `PROPDESK_PROVIDER`, defaulting to `anthropic`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnknownProvider`] when the variable names an
    /// unregistered provider.
    pub fn from_env() -> Result<Self, ProviderError> {
        let name = std::env::var(PROVIDER_ENV).unwrap_or_else(|_| "anthropic".to_string());
        Self::named(&name)
    }
}

// ============================================================================
// SECTION: Response Wire Types
// ============================================================================

/// One content block in a messages-API response.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    /// Natural-language text block.
    Text {
        /// Text content.
        text: String,
    },
    /// Tool invocation block.
    ToolUse {
        /// Invocation identifier.
        id: String,
        /// Tool wire name.
        name: String,
        /// Raw tool input.
        input: Value,
    },
    /// Unrecognized block kinds are ignored.
    #[serde(other)]
    Other,
}

/// Messages-API response envelope.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    /// Ordered response content blocks.
    content: Vec<ResponseBlock>,
}

// ============================================================================
// SECTION: HTTP Provider
// ============================================================================

/// Reasoning provider backed by an Anthropic-compatible messages endpoint.
///
/// # Invariants
/// - The API key is resolved once at construction and held in memory only.
/// - At most the first tool invocation of a response is surfaced.
pub struct HttpReasoningProvider {
    /// Endpoint settings.
    settings: ProviderSettings,
    /// Resolved API key.
    api_key: String,
    /// Shared HTTP client.
    client: reqwest::Client,
}

impl HttpReasoningProvider {
    /// Creates a provider, resolving the API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::MissingApiKey`] when the configured key
    /// variable is unset and [`ProviderError::Transport`] when the HTTP
    /// client cannot be built.
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let api_key = std::env::var(&settings.api_key_env)
            .map_err(|_| ProviderError::MissingApiKey(settings.api_key_env.clone()))?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ProviderError::Transport(err.to_string()))?;
        Ok(Self {
            settings,
            api_key,
            client,
        })
    }

    /// Folds response blocks into a tagged model turn.
    fn fold_turn(response: MessagesResponse) -> ModelTurn {
        let mut turn = ModelTurn::default();
        for block in response.content {
            match block {
                ResponseBlock::Text {
                    text,
                } => turn.prose.push(text),
                ResponseBlock::ToolUse {
                    id,
                    name,
                    input,
                } => {
                    if turn.tool.is_none() {
                        turn.tool = Some(ToolInvocation {
                            id,
                            name,
                            input,
                        });
                    }
                }
                ResponseBlock::Other => {}
            }
        }
        turn
    }
}

#[async_trait::async_trait]
impl ReasoningProvider for HttpReasoningProvider {
    async fn complete(
        &self,
        system: &str,
        turns: &[Turn],
        tools: &[ToolSpec],
    ) -> Result<ModelTurn, ProviderError> {
        let body = json!({
            "model": self.settings.model,
            "max_tokens": MAX_TOKENS,
            "system": system,
            "messages": turns,
            "tools": tools,
        });
        let response = self
            .client
            .post(format!("{}/v1/messages", self.settings.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|err| ProviderError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: MessagesResponse =
            response.json().await.map_err(|err| ProviderError::Decode(err.to_string()))?;
        Ok(Self::fold_turn(parsed))
    }
}
