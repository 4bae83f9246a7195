// src/chat/transcript.rs
//! Transcript of the selected session and the send flow that drives it.
//!
//! A send runs in two phases. The user message is written to the store
//! before the backend is called, so the transcript shows it immediately.
//! On success the assistant reply (and, for the first exchange, a generated
//! title) is written over it. On failure the tentative state is kept as-is.

use super::backend::ChatBackend;
use super::store::SharedStore;
use crate::models::chat::{Message, Role, Session, DEFAULT_TITLE};
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

const TITLE_PROMPT: &str =
    "Based on this conversation, generate a very brief, concise title (4-6 words max):";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyInput,
    NoSession,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Rejected(RejectReason),
    Replied,
    Failed,
}

pub struct TranscriptView<B> {
    backend: B,
    store: SharedStore,
    input: Mutex<String>,
    in_flight: AtomicBool,
}

/// Releases the in-flight flag however the send ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<B: ChatBackend> TranscriptView<B> {
    pub fn new(backend: B, store: SharedStore) -> Self {
        Self {
            backend,
            store,
            input: Mutex::new(String::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// The input field is read-only while a reply is pending.
    pub async fn set_input(&self, text: impl Into<String>) -> bool {
        if self.is_loading() {
            return false;
        }
        *self.input.lock().await = text.into();
        true
    }

    pub async fn input(&self) -> String {
        self.input.lock().await.clone()
    }

    pub async fn render_selected(&self) -> String {
        let store = self.store.read().await;
        render(store.selected(), self.is_loading())
    }

    pub async fn send_message(&self) -> SendOutcome {
        let text = self.input.lock().await.clone();
        if text.trim().is_empty() {
            return SendOutcome::Rejected(RejectReason::EmptyInput);
        }

        // the flag must be held before the session snapshot is taken
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Send dropped, a reply is already pending");
            return SendOutcome::Rejected(RejectReason::Busy);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let session = match self.store.read().await.selected().cloned() {
            Some(session) => session,
            None => return SendOutcome::Rejected(RejectReason::NoSession),
        };

        let was_first_exchange = session.messages.is_empty();
        let mut messages = session.messages.clone();
        messages.push(Message::user(text));

        self.store.write().await.replace(Session {
            messages: messages.clone(),
            ..session.clone()
        });

        tracing::debug!(session = %session.id, messages = messages.len(), "Sending chat request");

        let outcome = match self.backend.complete(&messages).await {
            Ok(reply) => {
                messages.push(Message::assistant(reply));

                let title = if was_first_exchange {
                    self.generate_title(&messages).await
                } else {
                    session.title.clone()
                };

                self.store.write().await.replace(Session {
                    id: session.id.clone(),
                    title,
                    messages,
                });
                tracing::debug!(session = %session.id, "Chat updated");
                SendOutcome::Replied
            }
            Err(e) => {
                tracing::warn!(session = %session.id, "Error in send_message: {}", e);
                SendOutcome::Failed
            }
        };

        self.input.lock().await.clear();
        outcome
    }

    async fn generate_title(&self, messages: &[Message]) -> String {
        let prompt = Message::user(title_prompt(messages));
        match self.backend.complete(std::slice::from_ref(&prompt)).await {
            Ok(raw) => clean_title(&raw).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            Err(e) => {
                tracing::warn!("Error generating title: {}", e);
                DEFAULT_TITLE.to_string()
            }
        }
    }
}

fn title_prompt(messages: &[Message]) -> String {
    let mut prompt = String::from(TITLE_PROMPT);
    for message in messages {
        let _ = write!(prompt, "\n{}: {}", message.role.as_str(), message.content);
    }
    prompt
}

fn clean_title(raw: &str) -> Option<String> {
    let title = raw.trim().trim_matches('"').trim();
    (!title.is_empty()).then(|| title.to_string())
}

pub fn render(session: Option<&Session>, loading: bool) -> String {
    let Some(session) = session else {
        return "Select or create a new chat\n".to_string();
    };

    let mut out = format!("== {} ==\n", session.title);
    for message in &session.messages {
        let label = match message.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        let _ = writeln!(out, "{}: {}", label, message.content);
    }
    if loading {
        out.push_str("thinking...\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::store::SessionStore;
    use crate::error::ClientError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct MockBackend {
        replies: std::sync::Mutex<VecDeque<Result<String, String>>>,
        calls: std::sync::Mutex<Vec<Vec<Message>>>,
        gate: Option<Arc<Notify>>,
    }

    impl MockBackend {
        fn scripted(replies: Vec<Result<&str, &str>>) -> Self {
            Self {
                replies: std::sync::Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_owned).map_err(str::to_owned))
                        .collect(),
                ),
                ..Default::default()
            }
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn calls(&self) -> Vec<Vec<Message>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for MockBackend {
        async fn complete(&self, messages: &[Message]) -> Result<String, ClientError> {
            let first_call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(messages.to_vec());
                calls.len() == 1
            };
            if let (true, Some(gate)) = (first_call, &self.gate) {
                gate.notified().await;
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err("no scripted reply".to_string()))
                .map_err(ClientError::MalformedResponse)
        }
    }

    impl<B> TranscriptView<B> {
        fn backend(&self) -> &B {
            &self.backend
        }
    }

    async fn view_with_session(backend: MockBackend) -> TranscriptView<MockBackend> {
        let store = SessionStore::shared();
        store.write().await.create_session();
        TranscriptView::new(backend, store)
    }

    async fn selected(view: &TranscriptView<MockBackend>) -> Session {
        view.store().read().await.selected().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_first_exchange_sets_title() {
        let backend = MockBackend::scripted(vec![Ok("Hi there"), Ok("  \"Greeting Exchange\"\n")]);
        let view = view_with_session(backend).await;

        view.set_input("Hello").await;
        assert_eq!(view.send_message().await, SendOutcome::Replied);

        let session = selected(&view).await;
        assert_eq!(
            session.messages,
            vec![Message::user("Hello"), Message::assistant("Hi there")]
        );
        assert_eq!(session.title, "Greeting Exchange");
        assert!(view.input().await.is_empty());
        assert!(!view.is_loading());

        let calls = view.backend().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], vec![Message::user("Hello")]);
        assert_eq!(calls[1].len(), 1);
        assert!(calls[1][0].content.starts_with(TITLE_PROMPT));
        assert!(calls[1][0].content.contains("assistant: Hi there"));
    }

    #[tokio::test]
    async fn test_later_exchange_keeps_title_and_sends_history() {
        let backend = MockBackend::scripted(vec![Ok("one"), Ok("Short Title"), Ok("two")]);
        let view = view_with_session(backend).await;

        view.set_input("first").await;
        view.send_message().await;
        view.set_input("second").await;
        assert_eq!(view.send_message().await, SendOutcome::Replied);

        let session = selected(&view).await;
        assert_eq!(session.title, "Short Title");
        assert_eq!(session.messages.len(), 4);
        assert_eq!(session.messages[3], Message::assistant("two"));

        let calls = view.backend().calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[2],
            vec![
                Message::user("first"),
                Message::assistant("one"),
                Message::user("second")
            ]
        );
    }

    #[tokio::test]
    async fn test_title_failure_falls_back() {
        let backend = MockBackend::scripted(vec![Ok("reply"), Err("title endpoint down")]);
        let view = view_with_session(backend).await;

        view.set_input("Hello").await;
        assert_eq!(view.send_message().await, SendOutcome::Replied);

        let session = selected(&view).await;
        assert_eq!(session.title, DEFAULT_TITLE);
        assert_eq!(session.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_exchange_keeps_user_message() {
        let backend = MockBackend::scripted(vec![Err("connection refused")]);
        let view = view_with_session(backend).await;

        view.set_input("Hello").await;
        assert_eq!(view.send_message().await, SendOutcome::Failed);

        let session = selected(&view).await;
        assert_eq!(session.messages, vec![Message::user("Hello")]);
        assert_eq!(session.title, DEFAULT_TITLE);
        assert!(!view.is_loading());
        assert!(view.input().await.is_empty());
        // no title request after a failed reply
        assert_eq!(view.backend().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_blank_input_and_missing_session() {
        let view = view_with_session(MockBackend::default()).await;
        view.set_input("   \n\t").await;
        assert_eq!(
            view.send_message().await,
            SendOutcome::Rejected(RejectReason::EmptyInput)
        );
        assert!(selected(&view).await.messages.is_empty());

        let no_session = TranscriptView::new(MockBackend::default(), SessionStore::shared());
        no_session.set_input("Hello").await;
        assert_eq!(
            no_session.send_message().await,
            SendOutcome::Rejected(RejectReason::NoSession)
        );
        assert_eq!(no_session.input().await, "Hello");
        assert!(view.backend().calls().is_empty());
        assert!(no_session.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_optimistic_update_and_busy_rejection() {
        let gate = Arc::new(Notify::new());
        let backend = MockBackend::scripted(vec![Ok("late reply"), Ok("Title")]).gated(gate.clone());
        let view = view_with_session(backend).await;
        view.set_input("Hello").await;

        let (outcome, ()) = tokio::join!(view.send_message(), async {
            // the first send is parked on the gate here
            assert!(view.is_loading());
            assert_eq!(selected(&view).await.messages, vec![Message::user("Hello")]);

            assert!(!view.set_input("ignored").await);
            assert_eq!(
                view.send_message().await,
                SendOutcome::Rejected(RejectReason::Busy)
            );
            assert_eq!(selected(&view).await.messages.len(), 1);
            assert!(
                view.render_selected().await.ends_with("thinking...\n"),
                "loading indicator shown while awaiting"
            );

            gate.notify_one();
        });

        assert_eq!(outcome, SendOutcome::Replied);
        let session = selected(&view).await;
        assert_eq!(
            session.messages,
            vec![Message::user("Hello"), Message::assistant("late reply")]
        );
        assert_eq!(view.backend().calls().len(), 2);
        assert!(!view.is_loading());
    }

    #[tokio::test]
    async fn test_reply_lands_in_originating_session() {
        let gate = Arc::new(Notify::new());
        let backend = MockBackend::scripted(vec![Ok("pong"), Ok("Ping")]).gated(gate.clone());
        let view = view_with_session(backend).await;
        let origin = view.store().read().await.selected_id().cloned().unwrap();
        view.set_input("ping").await;

        let (outcome, ()) = tokio::join!(view.send_message(), async {
            view.store().write().await.create_session();
            gate.notify_one();
        });
        assert_eq!(outcome, SendOutcome::Replied);

        let store = view.store().read().await;
        assert_eq!(store.get(&origin).unwrap().messages.len(), 2);
        assert!(store.selected().unwrap().messages.is_empty());
    }

    struct AckBackend;

    #[async_trait]
    impl ChatBackend for AckBackend {
        async fn complete(&self, _messages: &[Message]) -> Result<String, ClientError> {
            tokio::task::yield_now().await;
            Ok("ack".to_string())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_senders_never_lose_replies() {
        let store = SessionStore::shared();
        store.write().await.create_session();
        let view = Arc::new(TranscriptView::new(AckBackend, store));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let view = view.clone();
            tasks.push(tokio::spawn(async move {
                let mut replied: usize = 0;
                for _ in 0..50 {
                    view.set_input("hi").await;
                    if view.send_message().await == SendOutcome::Replied {
                        replied += 1;
                    }
                    tokio::task::yield_now().await;
                }
                replied
            }));
        }

        let mut replied: usize = 0;
        for task in tasks {
            replied += task.await.unwrap();
        }
        assert!(replied > 0);

        let session = view.store().read().await.selected().cloned().unwrap();
        assert_eq!(session.messages.len(), replied * 2);
        for pair in session.messages.chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1], Message::assistant("ack"));
        }
        assert!(!view.is_loading());
    }

    #[test]
    fn test_render() {
        assert_eq!(render(None, false), "Select or create a new chat\n");

        let mut session = Session::new("1".into());
        session.messages.push(Message::user("Hello"));
        session.messages.push(Message::assistant("Hi there"));
        assert_eq!(
            render(Some(&session), false),
            "== New Chat ==\nYou: Hello\nAssistant: Hi there\n"
        );
        assert!(render(Some(&session), true).ends_with("thinking...\n"));
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("  Greeting Exchange \n").as_deref(), Some("Greeting Exchange"));
        assert_eq!(clean_title("\"Quoted\"").as_deref(), Some("Quoted"));
        assert_eq!(clean_title("  \"\" "), None);
    }
}
