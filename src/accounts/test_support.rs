//! Scripted Account Service for workflow and submitter tests.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};
use tokio::sync::Notify;

use super::{
    client::AccountService,
    errors::AccountError,
    types::{ForgotPasswordRequest, RegisterRequest, ResetPasswordRequest},
};

type Reply = Result<Option<String>, AccountError>;

/// Replies are consumed in order; an exhausted script answers `Ok(None)`.
/// With a gate set, every call waits for a `notify_one` before answering.
#[derive(Default)]
pub(super) struct ScriptedService {
    replies: Mutex<VecDeque<Reply>>,
    pub(super) gate: Option<Arc<Notify>>,
    pub(super) register_calls: AtomicUsize,
    pub(super) forgot_calls: AtomicUsize,
    pub(super) reset_calls: AtomicUsize,
    pub(super) seen_emails: Mutex<Vec<String>>,
}

impl ScriptedService {
    pub(super) fn replying(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    pub(super) fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
            + self.forgot_calls.load(Ordering::SeqCst)
            + self.reset_calls.load(Ordering::SeqCst)
    }

    pub(super) fn emails(&self) -> Vec<String> {
        self.seen_emails
            .lock()
            .map(|emails| emails.clone())
            .unwrap_or_default()
    }

    fn record(&self, counter: &AtomicUsize, email: &str) {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut emails) = self.seen_emails.lock() {
            emails.push(email.to_string());
        }
    }

    async fn answer(&self, counter: &AtomicUsize, email: &str) -> Reply {
        self.record(counter, email);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or(Ok(None))
    }
}

impl AccountService for ScriptedService {
    async fn register(&self, request: &RegisterRequest<'_>) -> Reply {
        self.answer(&self.register_calls, request.email).await
    }

    async fn forgot_password(&self, request: &ForgotPasswordRequest<'_>) -> Reply {
        self.answer(&self.forgot_calls, request.email).await
    }

    async fn reset_password(&self, request: &ResetPasswordRequest<'_>) -> Reply {
        self.answer(&self.reset_calls, request.email).await
    }
}
