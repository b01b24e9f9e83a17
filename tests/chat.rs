use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dreamroom::chat::backend::parse_completion;
use dreamroom::chat::conversation::{
    analysis_prompt, FALLBACK_RESPONSE, GREETING, KEEP_RECENT, MAX_HISTORY, RESET_GREETING, SYSTEM_PROMPT,
};
use dreamroom::chat::{ChatBackend, ChatEvent, ChatMessage, ChatWorker, DreamConversation, GroqBackend, Role};
use dreamroom::config::ChatConfig;
use dreamroom::error::ChatError;

/// Replays canned results and records every history it was sent.
#[derive(Clone, Default)]
struct Scripted {
    replies: Arc<Mutex<VecDeque<Result<Option<String>, ChatError>>>>,
    seen: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl Scripted {
    fn with(replies: Vec<Result<Option<String>, ChatError>>) -> Self {
        Self { replies: Arc::new(Mutex::new(replies.into())), ..Self::default() }
    }

    fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

impl ChatBackend for Scripted {
    fn complete(&self, messages: &[ChatMessage]) -> Result<Option<String>, ChatError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.replies.lock().unwrap().pop_front().unwrap_or(Ok(Some("...".into())))
    }
}

fn ready() -> DreamConversation {
    let mut c = DreamConversation::new();
    c.initialize();
    c
}

// ── Conversation ─────────────────────────────────────────────────────────────

#[test]
fn initialize_seeds_prompt_and_greeting() {
    let c = ready();
    assert!(c.is_initialized());
    assert_eq!(c.messages()[0], ChatMessage::system(SYSTEM_PROMPT));
    assert_eq!(c.history(), vec![&ChatMessage::assistant(GREETING)]);
}

#[test]
fn uninitialized_conversation_refuses_to_send() {
    let backend = Scripted::default();
    let mut c = DreamConversation::new();
    let err = c.send_message(&backend, "hello").unwrap_err();
    assert!(matches!(err, ChatError::NotInitialized));
    assert_eq!(err.user_message(), "Connection error: AI system not initialized.");
    assert!(backend.requests().is_empty());
}

#[test]
fn send_message_records_both_turns() {
    let backend = Scripted::with(vec![Ok(Some("Tell me more about the river.".into()))]);
    let mut c = ready();
    let reply = c.send_message(&backend, "I dreamt of a river").unwrap();
    assert_eq!(reply.response, "Tell me more about the river.");
    assert!(reply.timestamp > 0);

    let sent = &backend.requests()[0];
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[2], ChatMessage::user("I dreamt of a river"));
    assert_eq!(c.history().len(), 3);
    assert_eq!(c.history()[2].role, Role::Assistant);
}

#[test]
fn empty_completion_uses_fallback() {
    let backend = Scripted::with(vec![Ok(None), Ok(Some("   ".into()))]);
    let mut c = ready();
    assert_eq!(c.send_message(&backend, "one").unwrap().response, FALLBACK_RESPONSE);
    assert_eq!(c.send_message(&backend, "two").unwrap().response, FALLBACK_RESPONSE);
}

#[test]
fn failed_request_keeps_the_user_turn() {
    let backend = Scripted::with(vec![Err(ChatError::Status { status: 500, body: "boom".into() })]);
    let mut c = ready();
    assert!(c.send_message(&backend, "hello").is_err());
    assert_eq!(c.history().last().map(|m| m.role), Some(Role::User));
}

#[test]
fn second_turn_waits_for_the_first_reply() {
    let mut c = ready();
    c.begin("u1").unwrap();
    assert!(c.is_awaiting_reply());
    assert!(matches!(c.begin("u2"), Err(ChatError::Busy)));

    c.finish(Some("a1".into()));
    assert!(!c.is_awaiting_reply());
    c.begin("u2").unwrap();
    c.finish(Some("a2".into()));

    let texts: Vec<&str> = c.history().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(texts, vec![GREETING, "u1", "a1", "u2", "a2"]);
}

#[test]
fn abandoned_turn_reopens_the_conversation() {
    let mut c = ready();
    c.begin("lost").unwrap();
    c.abandon();
    assert!(!c.is_awaiting_reply());
    assert!(c.begin("retry").is_ok());

    let backend = Scripted::with(vec![Err(ChatError::Transport("offline".into())), Ok(Some("back".into()))]);
    let mut c = ready();
    assert!(c.send_message(&backend, "one").is_err());
    assert_eq!(c.send_message(&backend, "two").unwrap().response, "back");
}

#[test]
fn reset_closes_an_open_turn() {
    let mut c = ready();
    c.begin("u1").unwrap();
    c.reset();
    assert!(!c.is_awaiting_reply());
    assert!(c.begin("fresh").is_ok());
}

#[test]
fn history_is_trimmed_to_system_plus_recent() {
    let backend = Scripted::default();
    let mut c = ready();
    for i in 0..15 {
        c.send_message(&backend, &format!("turn {i}")).unwrap();
    }
    let messages = c.messages();
    assert_eq!(messages.len(), KEEP_RECENT + 1);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages.last().map(|m| m.role), Some(Role::Assistant));
    assert!(messages[1..].iter().all(|m| m.role != Role::System));
    assert!(messages.iter().any(|m| m.content == "turn 14"));
    assert!(!messages.iter().any(|m| m.content == "turn 0"));
}

#[test]
fn trimming_exact_boundary() {
    let mut c = ready();
    // 2 seeded + 10 turns of 2 = 22: still at the cap.
    for i in 0..10 {
        c.begin(&format!("q{i}")).unwrap();
        c.finish(Some(format!("a{i}")));
    }
    assert_eq!(c.messages().len(), MAX_HISTORY);
    c.begin("q10").unwrap();
    c.finish(Some("a10".into()));
    assert_eq!(c.messages().len(), KEEP_RECENT + 1);
    assert_eq!(c.messages()[0].role, Role::System);
    assert_eq!(c.messages()[1].content, "q1");
}

#[test]
fn analyze_dream_wraps_the_text() {
    let backend = Scripted::default();
    let mut c = ready();
    c.analyze_dream(&backend, "flying over a city").unwrap();
    let sent = backend.requests();
    assert_eq!(sent[0].last().map(|m| m.content.clone()), Some(analysis_prompt("flying over a city")));
    assert!(analysis_prompt("x").contains("\"x\""));
}

#[test]
fn reset_keeps_prompt_and_new_greeting() {
    let backend = Scripted::default();
    let mut c = ready();
    c.send_message(&backend, "hi").unwrap();
    c.reset();
    assert_eq!(c.messages().len(), 2);
    assert_eq!(c.history(), vec![&ChatMessage::assistant(RESET_GREETING)]);
}

#[test]
fn export_skips_system_prompt() {
    let c = ready();
    let json = serde_json::to_value(c.export()).unwrap();
    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "assistant");
    assert!(json["timestamp"].as_u64().unwrap() > 0);
}

// ── Errors ───────────────────────────────────────────────────────────────────

#[test]
fn user_messages_map_known_failures() {
    assert_eq!(
        ChatError::Status { status: 401, body: "invalid".into() }.user_message(),
        "Authentication failed. Please try again."
    );
    assert_eq!(ChatError::MissingApiKey.user_message(), "Authentication failed. Please try again.");
    assert_eq!(
        ChatError::Status { status: 429, body: "slow down".into() }.user_message(),
        "Too many requests. Please wait a moment and try again."
    );
    assert_eq!(
        ChatError::Transport("dns failure".into()).user_message(),
        "Connection error: dns failure"
    );
}

// ── Groq backend ─────────────────────────────────────────────────────────────

#[test]
fn groq_needs_a_key() {
    let config = ChatConfig { api_key: Some("   ".into()), ..ChatConfig::default() };
    assert!(matches!(GroqBackend::new(&config), Err(ChatError::MissingApiKey)));
    assert!(matches!(GroqBackend::new(&ChatConfig::default()), Err(ChatError::MissingApiKey)));
}

#[test]
fn groq_request_body_carries_sampling_settings() {
    let config = ChatConfig { api_key: Some("test-key".into()), ..ChatConfig::default() };
    let backend = GroqBackend::new(&config).unwrap();
    let messages = [ChatMessage::system("sys"), ChatMessage::user("hi")];
    let body = serde_json::to_value(backend.request(&messages)).unwrap();
    assert_eq!(body["model"], "llama-3.3-70b-versatile");
    assert_eq!(body["max_tokens"], 300);
    assert_eq!(body["stream"], false);
    assert_eq!(body["messages"][1]["role"], "user");
    assert!((body["temperature"].as_f64().unwrap() - 0.8).abs() < 1e-6);
    assert!((body["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
}

#[test]
fn completion_parsing() {
    let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hello dreamer"}}]}"#;
    assert_eq!(parse_completion(body).unwrap().as_deref(), Some("Hello dreamer"));
    assert_eq!(parse_completion(r#"{"choices":[]}"#).unwrap(), None);
    assert_eq!(parse_completion(r#"{"choices":[{"message":{"content":""}}]}"#).unwrap(), None);
    assert_eq!(parse_completion("{}").unwrap(), None);
    assert!(matches!(parse_completion("<html>"), Err(ChatError::Malformed(_))));
}

// ── Worker ───────────────────────────────────────────────────────────────────

fn wait_for_events(worker: &mut ChatWorker, count: usize) -> Vec<ChatEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut events = Vec::new();
    while events.len() < count && Instant::now() < deadline {
        events.extend(worker.poll());
        std::thread::sleep(Duration::from_millis(5));
    }
    events
}

#[test]
fn worker_delivers_replies_in_order() {
    let backend = Scripted::with(vec![Ok(Some("first".into())), Ok(Some("second".into()))]);
    let mut worker = ChatWorker::spawn(Box::new(backend));
    let a = worker.submit(vec![ChatMessage::user("a")]).unwrap();
    let b = worker.submit(vec![ChatMessage::user("b")]).unwrap();
    assert_ne!(a, b);
    assert!(worker.is_busy());

    let events = wait_for_events(&mut worker, 2);
    assert_eq!(events.len(), 2);
    match (&events[0], &events[1]) {
        (ChatEvent::Reply { id: ia, content: ca }, ChatEvent::Reply { id: ib, content: cb }) => {
            assert_eq!((*ia, ca.as_deref()), (a, Some("first")));
            assert_eq!((*ib, cb.as_deref()), (b, Some("second")));
        }
        other => panic!("unexpected events {other:?}"),
    }
    assert!(!worker.is_busy());
}

#[test]
fn worker_reports_failures() {
    let backend = Scripted::with(vec![Err(ChatError::Status { status: 429, body: "rate_limit".into() })]);
    let mut worker = ChatWorker::spawn(Box::new(backend));
    let id = worker.submit(vec![ChatMessage::user("a")]).unwrap();
    let events = wait_for_events(&mut worker, 1);
    match events.as_slice() {
        [ChatEvent::Failed { id: got, error }] => {
            assert_eq!(*got, id);
            assert_eq!(error.user_message(), "Too many requests. Please wait a moment and try again.");
        }
        other => panic!("unexpected events {other:?}"),
    }
}

#[test]
fn worker_feeds_a_conversation() {
    let backend = Scripted::with(vec![Ok(Some("How did the water feel?".into()))]);
    let mut worker = ChatWorker::spawn(Box::new(backend.clone()));
    let mut c = ready();
    worker.submit(c.begin("I was swimming").unwrap()).unwrap();
    let events = wait_for_events(&mut worker, 1);
    let Some(ChatEvent::Reply { content, .. }) = events.into_iter().next() else {
        panic!("no reply");
    };
    let reply = c.finish(content);
    assert_eq!(reply.response, "How did the water feel?");
    assert_eq!(c.history().len(), 3);
    assert_eq!(backend.requests()[0].len(), 3);
}

#[test]
fn poll_without_requests_is_empty() {
    let mut worker = ChatWorker::spawn(Box::new(Scripted::default()));
    assert!(worker.poll().is_empty());
    assert!(!worker.is_busy());
}

#[test]
fn worker_turns_stay_paired() {
    let backend = Scripted::with(vec![Ok(Some("a1".into())), Ok(Some("a2".into()))]);
    let mut worker = ChatWorker::spawn(Box::new(backend.clone()));
    let mut c = ready();

    worker.submit(c.begin("u1").unwrap()).unwrap();
    assert!(c.begin("u2").is_err());
    for event in wait_for_events(&mut worker, 1) {
        if let ChatEvent::Reply { content, .. } = event {
            c.finish(content);
        }
    }

    worker.submit(c.begin("u2").unwrap()).unwrap();
    for event in wait_for_events(&mut worker, 1) {
        if let ChatEvent::Reply { content, .. } = event {
            c.finish(content);
        }
    }

    let texts: Vec<&str> = c.history().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(texts, vec![GREETING, "u1", "a1", "u2", "a2"]);
    let requests = backend.requests();
    let second: Vec<&str> = requests[1].iter().map(|m| m.content.as_str()).collect();
    assert_eq!(second, vec![SYSTEM_PROMPT, GREETING, "u1", "a1", "u2"]);
}
