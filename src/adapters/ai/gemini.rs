//! Gemini Responder - implementation of the Responder port over Google's
//! `generateContent` API.
//!
//! Renders a fixed system-prompt template with an in-process, per-session
//! message history, so the model sees recent context without any external
//! memory store. History is bounded and process-local; a restart forgets it.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-2.0-flash")
//!     .with_system_prompt(prompt);
//!
//! let responder = GeminiResponder::new(config);
//! ```

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::foundation::SessionId;
use crate::ports::{GenerationError, Responder};

/// Pre-sales assistant persona used when no system prompt is configured.
const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a digital pre-sales assistant (AI Closer) for a law firm in Brazil.
Your purpose is to engage leads, understand their legal concerns, and smoothly guide them to schedule a consultation on WhatsApp.

Behavior Rules:
- Always respond in Brazilian Portuguese (PT-BR).
- Keep answers short, clear, and human-like (maximum 3 sentences).
- Use a warm, persuasive, and professional tone.
- Ask open-ended questions to understand the lead's situation.
- Do not provide detailed legal advice; highlight the firm's experience and reliability instead.
- If the user shows interest, invite them to continue the conversation on WhatsApp.
- If the user hesitates, reinforce credibility (years of experience, quick support, personalized service).
- Always sound empathetic and supportive, never robotic.";

/// Configuration for the Gemini responder.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
    /// Turns of history kept per session (one turn = user + assistant).
    pub history_limit: usize,
    /// Sessions tracked at once; the least recently used one is dropped
    /// when a new session would exceed this.
    pub max_sessions: usize,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: 0.7,
            max_output_tokens: 300,
            timeout: Duration::from_secs(30),
            history_limit: 20,
            max_sessions: 1000,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

#[derive(Debug, Clone)]
struct Turn {
    user: String,
    assistant: String,
}

#[derive(Debug)]
struct SessionHistory {
    turns: VecDeque<Turn>,
    last_used: Instant,
}

impl SessionHistory {
    fn new() -> Self {
        Self {
            turns: VecDeque::new(),
            last_used: Instant::now(),
        }
    }
}

/// Gemini-backed Responder with per-session conversation memory.
pub struct GeminiResponder {
    config: GeminiConfig,
    client: Client,
    histories: Mutex<HashMap<Option<SessionId>, SessionHistory>>,
}

impl GeminiResponder {
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::NotConfigured(e.to_string()))?;

        Ok(Self {
            config,
            client,
            histories: Mutex::new(HashMap::new()),
        })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    /// Renders the full prompt: system persona, recent history, user turn.
    fn render_prompt(&self, history: &VecDeque<Turn>, user_text: &str) -> String {
        let mut rendered = String::new();
        for turn in history {
            rendered.push_str(&format!(
                "User: {}\nAssistant: {}\n",
                turn.user, turn.assistant
            ));
        }

        format!(
            "{}\n\nConversation History:\n{}\nUser: {}\nAssistant:",
            self.config.system_prompt, rendered, user_text
        )
    }

    async fn remember(&self, session_id: Option<SessionId>, user: String, assistant: String) {
        let mut histories = self.histories.lock().await;

        // A new session over the cap evicts the least recently used one.
        if !histories.contains_key(&session_id) && histories.len() >= self.config.max_sessions {
            if let Some(oldest) = histories
                .iter()
                .min_by_key(|(_, h)| h.last_used)
                .map(|(k, _)| *k)
            {
                histories.remove(&oldest);
            }
        }

        let history = histories.entry(session_id).or_insert_with(SessionHistory::new);
        history.last_used = Instant::now();
        history.turns.push_back(Turn { user, assistant });
        while history.turns.len() > self.config.history_limit {
            history.turns.pop_front();
        }
    }
}

#[async_trait]
impl Responder for GeminiResponder {
    async fn generate(
        &self,
        text: &str,
        session_id: Option<&SessionId>,
    ) -> Result<String, GenerationError> {
        let key = session_id.copied();
        let prompt = {
            let histories = self.histories.lock().await;
            let empty = VecDeque::new();
            let turns = histories.get(&key).map_or(&empty, |h| &h.turns);
            self.render_prompt(turns, text)
        };

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        debug!(model = %self.config.model, "sending generation request");

        let response = self
            .client
            .post(self.generate_url())
            .header("X-goog-api-key", self.config.api_key())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout
                } else {
                    GenerationError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "generation request rejected");
            return Err(GenerationError::Unavailable(format!("{status}: {body}")));
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        let reply = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                GenerationError::InvalidResponse("response carried no text parts".to_string())
            })?;

        self.remember(key, text.to_string(), reply.clone()).await;
        Ok(reply)
    }

    async fn clear_history(&self, session_id: Option<&SessionId>) {
        let mut histories = self.histories.lock().await;
        match session_id {
            Some(id) => {
                histories.remove(&Some(*id));
            }
            None => histories.clear(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<Part>,
}
