use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::backend::QueryBackend;
use super::message::Message;
use crate::api::{QueryMode, QueryRequest};
use crate::core::config::QueryOptions;

pub const QUERY_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

/// What happened to one `submit` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Blank after trimming; nothing sent.
    Empty,
    /// Another question is still in flight; nothing sent.
    Busy,
    Answered(Message),
    /// The request failed; the generic error reply that was appended.
    Failed(Message),
}

impl SubmitOutcome {
    pub fn reply(&self) -> Option<&Message> {
        match self {
            SubmitOutcome::Answered(message) | SubmitOutcome::Failed(message) => Some(message),
            SubmitOutcome::Empty | SubmitOutcome::Busy => None,
        }
    }
}

/// A chat widget: ordered transcript plus single-flight query dispatch.
///
/// `submit` takes `&self`, so a session can be shared behind an `Arc`; at
/// most one request is outstanding at any time regardless of callers.
pub struct ChatSession<B> {
    backend: B,
    options: QueryOptions,
    mode: Mutex<QueryMode>,
    transcript: Mutex<Vec<Message>>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the request finishes, however it finishes.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<B: QueryBackend> ChatSession<B> {
    pub fn new(backend: B, options: QueryOptions, mode: QueryMode) -> Self {
        Self {
            backend,
            options,
            mode: Mutex::new(mode),
            transcript: Mutex::new(Vec::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn mode(&self) -> QueryMode {
        *lock(&self.mode)
    }

    /// Affects only questions submitted afterwards.
    pub fn set_mode(&self, mode: QueryMode) {
        *lock(&self.mode) = mode;
        tracing::debug!(%mode, "Chat mode changed");
    }

    pub fn toggle_mode(&self) -> QueryMode {
        let mut mode = lock(&self.mode);
        *mode = mode.toggled();
        *mode
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn messages(&self) -> Vec<Message> {
        lock(&self.transcript).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.transcript).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, message: Message) {
        lock(&self.transcript).push(message);
    }

    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let query = text.trim();
        if query.is_empty() {
            return SubmitOutcome::Empty;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Ignoring submission while a query is in flight");
            return SubmitOutcome::Busy;
        }
        let _guard = InFlight(&self.in_flight);

        let mode = self.mode();
        self.push(Message::user(query));

        let request = QueryRequest::new(query, &self.options);
        match self.backend.send_query(&request, mode).await {
            Ok(response) => {
                tracing::info!(
                    %mode,
                    citations = response.citations.len(),
                    processing_ms = response.processing_time_ms,
                    "Query answered"
                );
                let reply = Message::from_response(response, mode.is_multimodal());
                self.push(reply.clone());
                SubmitOutcome::Answered(reply)
            }
            Err(err) => {
                tracing::error!(%mode, error = %err, "Query failed");
                let reply = Message::assistant(QUERY_ERROR_MESSAGE);
                self.push(reply.clone());
                SubmitOutcome::Failed(reply)
            }
        }
    }
}
