use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::client::LlmClient;
use super::types::{LlmRequest, LlmResponse};
use crate::error::{FlowError, Result};

type Responder = dyn Fn(&LlmRequest) -> Result<LlmResponse> + Send + Sync;

/// Deterministic model stand-in. Replies come from a queue or from a
/// responder closure; every request is recorded.
///
/// An exhausted queue answers with an empty response, which is the
/// "no output" case flows have to handle.
#[derive(Default)]
pub struct ScriptedClient {
    queue: Mutex<VecDeque<Result<LlmResponse>>>,
    responder: Option<Box<Responder>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&LlmRequest) -> Result<LlmResponse> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::default()
        }
    }

    pub fn then(self, response: LlmResponse) -> Self {
        self.queue.lock().push_back(Ok(response));
        self
    }

    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.queue
            .lock()
            .push_back(Err(FlowError::Generation(message.into())));
        self
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.requests.lock().push(request.clone());
        if let Some(responder) = &self.responder {
            return responder(&request);
        }
        self.queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(LlmResponse::empty()))
    }
}
