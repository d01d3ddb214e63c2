//! Scripted oracle for tests and offline runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::domain::ports::{CallPurpose, CompletionRequest, Oracle, OracleError};

type Responder = dyn Fn(&CompletionRequest) -> Result<String, OracleError> + Send + Sync;

/// Oracle whose answers come from a closure over the request.
///
/// Every request is recorded so tests can inspect prompts, temperatures and
/// call counts afterwards.
pub struct MockOracle {
    responder: Arc<Responder>,
    models: Vec<String>,
    unreachable: Option<OracleError>,
    delay: Option<Duration>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockOracle {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, OracleError> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            models: vec!["mock-model".to_string()],
            unreachable: None,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every call with `text`.
    pub fn constant(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| Ok(text.clone()))
    }

    /// Fail every call, model listing included, with `error`.
    pub fn failing(error: OracleError) -> Self {
        let mut oracle = Self::new({
            let error = error.clone();
            move |_| Err(error.clone())
        });
        oracle.models.clear();
        oracle.unreachable = Some(error);
        oracle
    }

    /// Answer by purpose; purposes without an entry fail as unexpected.
    pub fn by_purpose(responses: HashMap<CallPurpose, String>) -> Self {
        Self::new(move |request| {
            responses
                .get(&request.purpose)
                .cloned()
                .ok_or_else(|| {
                    OracleError::Unexpected(format!("no response for {}", request.purpose))
                })
        })
    }

    #[must_use]
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    /// Sleep before answering each call.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// All requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received for `purpose`.
    pub fn count(&self, purpose: CallPurpose) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|request| request.purpose == purpose)
            .count()
    }
}

#[async_trait]
impl Oracle for MockOracle {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        self.models.first().map_or("mock-model", String::as_str)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, OracleError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        (self.responder)(&request)
    }

    async fn list_models(&self) -> Result<Vec<String>, OracleError> {
        match &self.unreachable {
            Some(error) => Err(error.clone()),
            None => Ok(self.models.clone()),
        }
    }
}
