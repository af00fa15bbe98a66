//! Recording stub invoker for unit tests.

use async_trait::async_trait;
use std::sync::Mutex;

use super::invoker::{InvokeFailure, Invoker};
use super::model::{ExternalRequest, Payload};

/// Returns one canned outcome for every call and records each request it saw.
pub struct RecordingInvoker {
    outcome: Result<Payload, InvokeFailure>,
    seen: Mutex<Vec<ExternalRequest>>,
}

impl RecordingInvoker {
    pub fn returning(payload: Payload) -> Self {
        Self {
            outcome: Ok(payload),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(InvokeFailure::new(message)),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ExternalRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Invoker for RecordingInvoker {
    async fn invoke(&self, request: ExternalRequest) -> Result<Payload, InvokeFailure> {
        self.seen.lock().unwrap().push(request);
        self.outcome.clone()
    }
}
