use async_trait::async_trait;
use forge_core::agent::{AgentError, ContentAgent, GenerateRequest};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One scripted backend answer.
#[allow(dead_code)]
pub enum Reply {
    Text(String),
    Fail(AgentError),
    /// Answers after the given (Tokio) delay.
    Slow(Duration, String),
}

/// Scripted in-memory backend that records every request.
#[derive(Default)]
pub struct MockAgent {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<GenerateRequest>>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    pub fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn text(&self, body: &str) {
        self.push(Reply::Text(body.to_string()));
    }

    pub fn fail(&self, message: &str) {
        self.push(Reply::Fail(AgentError::ProcessError {
            status_code: Some(500),
            message: message.to_string(),
            is_retryable: true,
            retry_after: None,
        }));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> GenerateRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("Should have received a request")
    }
}

#[async_trait]
impl ContentAgent for MockAgent {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Text(body)) => Ok(body),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Slow(delay, body)) => {
                tokio::time::sleep(delay).await;
                Ok(body)
            }
            None => Err(AgentError::Other("No scripted reply left".to_string())),
        }
    }
}
