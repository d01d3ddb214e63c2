//! OpenAI-compatible text-completions oracle.
//!
//! Talks to any server exposing `POST {base}/completions` and
//! `GET {base}/models` (LM Studio, llama.cpp server, vLLM, ...). Calls are
//! rate limited with a token bucket and transient failures are retried with
//! exponential backoff.

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::domain::models::{OracleConfig, RateLimitConfig, RetryConfig};
use crate::domain::ports::{CompletionRequest, Oracle, OracleError};

/// Model id used when none is configured and the server lists none.
pub const FALLBACK_MODEL: &str = "local model";

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// Oracle backed by an OpenAI-compatible HTTP endpoint.
pub struct OpenAiCompatOracle {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    model_configured: bool,
    health_timeout: Duration,
    retry: RetryConfig,
    limiter: DefaultDirectRateLimiter,
}

impl OpenAiCompatOracle {
    pub fn new(
        oracle: &OracleConfig,
        retry: &RetryConfig,
        rate_limit: &RateLimitConfig,
    ) -> Result<Self, OracleError> {
        let client = Client::builder()
            .build()
            .map_err(|e| OracleError::Unexpected(format!("failed to build HTTP client: {e}")))?;

        if let Some(key) = &oracle.api_key {
            debug!(api_key = %redact(key), "using bearer authentication");
        }

        Ok(Self {
            client,
            base_url: oracle.base_url.trim_end_matches('/').to_string(),
            api_key: oracle.api_key.clone(),
            model: oracle
                .model
                .clone()
                .unwrap_or_else(|| FALLBACK_MODEL.to_string()),
            model_configured: oracle.model.is_some(),
            health_timeout: Duration::from_secs(oracle.health_timeout_secs),
            retry: retry.clone(),
            limiter: RateLimiter::direct(quota(rate_limit)),
        })
    }

    /// Pick the model to use: the configured one, else the first model the
    /// server lists, else [`FALLBACK_MODEL`].
    pub async fn resolve_model(self) -> Self {
        if self.model_configured {
            return self;
        }
        let listed = self.list_models().await;
        match listed {
            Ok(models) => self.select_model(&models),
            Err(e) => {
                warn!(error = %e, "could not list models, using '{FALLBACK_MODEL}'");
                self.select_model(&[])
            }
        }
    }

    /// Same as [`OpenAiCompatOracle::resolve_model`] over a model list that
    /// was already fetched.
    #[must_use]
    pub fn select_model(mut self, models: &[String]) -> Self {
        if self.model_configured {
            return self;
        }
        if let Some(first) = models.first() {
            self.model.clone_from(first);
        }
        info!(model = %self.model, "model selected");
        self
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn complete_once(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        self.limiter.until_ready().await;

        let body = CompletionBody {
            model: &self.model,
            prompt: &request.prompt,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        };

        let response = self
            .authorize(self.client.post(format!("{}/completions", self.base_url)))
            .header(header::CONTENT_TYPE, "application/json")
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify(&e, request.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(protocol_error(status, body));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Unexpected(format!("failed to decode completion: {e}")))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .unwrap_or_default())
    }
}

#[async_trait]
impl Oracle for OpenAiCompatOracle {
    fn name(&self) -> &'static str {
        "openai_compat"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(purpose = %request.purpose, temperature = %request.temperature))]
    async fn complete(&self, request: CompletionRequest) -> Result<String, OracleError> {
        let max_retries = self.retry.max_retries;
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(self.retry.initial_backoff_ms))
            .with_max_interval(Duration::from_millis(self.retry.max_backoff_ms))
            .with_max_elapsed_time(None)
            .build();

        let request = &request;
        let mut attempt: u32 = 0;
        backoff::future::retry_notify(
            policy,
            || {
                attempt += 1;
                let current = attempt;
                async move {
                    self.complete_once(request).await.map_err(|e| {
                        if e.is_transient() && current <= max_retries {
                            backoff::Error::transient(e)
                        } else {
                            backoff::Error::permanent(e)
                        }
                    })
                }
            },
            |e: OracleError, wait: Duration| {
                warn!(error = %e, wait_ms = wait.as_millis(), "transient oracle failure, retrying");
            },
        )
        .await
    }

    async fn list_models(&self) -> Result<Vec<String>, OracleError> {
        let response = self
            .authorize(self.client.get(format!("{}/models", self.base_url)))
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(|e| classify(&e, self.health_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(protocol_error(status, body));
        }

        let parsed: ModelsResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Unexpected(format!("failed to decode model list: {e}")))?;
        Ok(parsed.data.into_iter().map(|model| model.id).collect())
    }
}

fn quota(rate_limit: &RateLimitConfig) -> Quota {
    let burst = NonZeroU32::new(rate_limit.burst_size).unwrap_or(NonZeroU32::MIN);
    let per_second = if rate_limit.requests_per_second > 0.0 {
        rate_limit.requests_per_second
    } else {
        1.0
    };
    Quota::with_period(Duration::from_secs_f64(1.0 / per_second))
        .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
        .allow_burst(burst)
}

fn classify(error: &reqwest::Error, timeout: Duration) -> OracleError {
    if error.is_timeout() {
        OracleError::Timeout(timeout)
    } else if error.is_connect() {
        OracleError::ConnectionRefused(error.to_string())
    } else {
        OracleError::Unexpected(error.to_string())
    }
}

fn protocol_error(status: StatusCode, body: String) -> OracleError {
    OracleError::ProtocolError {
        status: status.as_u16(),
        body,
    }
}

/// Keep only a short prefix of a secret for logs and printed configuration.
pub(crate) fn redact(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}***")
}
