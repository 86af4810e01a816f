//! End-to-end tests for the Palaver conversation pipeline.
//!
//! These drive the registry, sessions and orchestrator together against a
//! scripted model, covering what a dashboard user or terminal user does:
//! chat, switch persona, start a new topic, hit a rate limit, clear history.

use std::sync::{Arc, Mutex};

use palaver_chat::{Orchestrator, SessionRegistry, SessionSettings};
use palaver_core::{
    ChatModel, Error, ModelErrorKind, Persona, Provider, ProviderError, ProviderRequest,
    ProviderResponse, Usage,
};

// ── Mock Provider ────────────────────────────────────────────────────────

/// Replies `reply-{n}` in call order, failing on the calls it is told to.
struct ScriptedProvider {
    fail_on: Vec<(usize, ProviderError)>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new() -> Arc<Self> {
        Self::failing(vec![])
    }

    fn failing(fail_on: Vec<(usize, ProviderError)>) -> Arc<Self> {
        Arc::new(Self {
            fail_on,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn last_prompt(&self) -> String {
        self.prompts().last().cloned().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(request.messages[0].content.clone());
            prompts.len()
        };
        if let Some((_, e)) = self.fail_on.iter().find(|(n, _)| *n == call) {
            return Err(e.clone());
        }
        Ok(ProviderResponse {
            content: format!("reply-{call}"),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 2,
                total_tokens: 12,
            }),
            model: request.model,
        })
    }
}

fn settings(persona: Persona, memory_turns: usize) -> SessionSettings {
    SessionSettings::new(persona, memory_turns, ChatModel::default()).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn conversation_replays_only_the_memory_window() {
    let provider = ScriptedProvider::new();
    let orchestrator = Orchestrator::new(provider.clone(), 0.7);
    let registry = SessionRegistry::new();

    let (_, session) = registry.create(settings(Persona::Default, 2)).await.unwrap();
    let mut session = session.lock().await;

    for msg in ["first", "second", "third"] {
        orchestrator.respond(&mut session, msg).await.unwrap();
    }
    orchestrator.respond(&mut session, "fourth").await.unwrap();

    assert_eq!(session.history().len(), 4);
    let prompt = provider.last_prompt();
    assert!(prompt.starts_with("You are a helpful AI assistant."));
    assert!(prompt.contains("Human: second\nAI: reply-2"));
    assert!(prompt.contains("Human: third\nAI: reply-3"));
    assert!(!prompt.contains("Human: first"));
    assert!(prompt.ends_with("Human: fourth\nAI:"));
}

#[tokio::test]
async fn persona_switch_mid_conversation_keeps_memory() {
    let provider = ScriptedProvider::new();
    let orchestrator = Orchestrator::new(provider.clone(), 0.7);
    let registry = SessionRegistry::new();

    let (_, session) = registry.create(settings(Persona::Default, 5)).await.unwrap();
    let mut session = session.lock().await;
    orchestrator.respond(&mut session, "hello").await.unwrap();

    let expert = SessionSettings {
        persona: Persona::Expert,
        ..session.settings()
    };
    session.update_settings(expert).unwrap();
    orchestrator.respond(&mut session, "explain tcp").await.unwrap();

    let prompt = provider.last_prompt();
    assert!(prompt.starts_with("You are an expert consultant"));
    assert!(prompt.contains("Human: hello\nAI: reply-1"));
    assert!(prompt.ends_with("Human: explain tcp\nExpert:"));
}

#[tokio::test]
async fn rate_limit_leaves_session_usable() {
    let provider = ScriptedProvider::failing(vec![(
        2,
        ProviderError::RateLimited {
            retry_after_secs: 5,
        },
    )]);
    let orchestrator = Orchestrator::new(provider.clone(), 0.7);
    let registry = SessionRegistry::new();

    let (_, session) = registry.create(settings(Persona::Creative, 3)).await.unwrap();
    let mut session = session.lock().await;

    orchestrator.respond(&mut session, "one").await.unwrap();
    let err = orchestrator.respond(&mut session, "two").await.unwrap_err();
    match &err {
        Error::Provider(p) => assert_eq!(p.kind(), ModelErrorKind::RateLimit),
        other => panic!("expected provider error, got {other:?}"),
    }
    assert!(err.user_message().contains("rate limiting"));
    assert_eq!(session.history().len(), 1);

    let turn = orchestrator.respond(&mut session, "two again").await.unwrap();
    assert_eq!(turn.human(), "two again");
    assert_eq!(session.history().len(), 2);
    assert!(provider.last_prompt().contains("Human: one\nAI: reply-1"));
    assert!(!provider.last_prompt().contains("Human: two\n"));
}

#[tokio::test]
async fn new_topic_then_clear_history() {
    let provider = ScriptedProvider::new();
    let orchestrator = Orchestrator::new(provider.clone(), 0.7);
    let registry = SessionRegistry::new();

    let (id, _) = registry.create(settings(Persona::Default, 5)).await.unwrap();
    let session = registry.get(&id).await.unwrap();
    let mut session = session.lock().await;

    orchestrator.respond(&mut session, "old topic").await.unwrap();
    session.new_topic();
    orchestrator.respond(&mut session, "new topic").await.unwrap();

    assert_eq!(session.history().len(), 2);
    let prompt = provider.last_prompt();
    assert!(!prompt.contains("old topic"));
    assert!(prompt.contains("Current conversation:\n\nHuman: new topic"));

    assert!(session.started_at().is_some());
    session.clear_history();
    let stats = session.stats(chrono::Utc::now());
    assert_eq!(stats.message_count, 0);
    assert!(stats.elapsed.is_none());
}

#[tokio::test]
async fn concurrent_sessions_do_not_share_history() {
    let provider = ScriptedProvider::new();
    let orchestrator = Arc::new(Orchestrator::new(provider.clone(), 0.7));
    let registry = Arc::new(SessionRegistry::new());

    let (a_id, _) = registry.create(settings(Persona::Default, 5)).await.unwrap();
    let (b_id, _) = registry.create(settings(Persona::Expert, 5)).await.unwrap();

    let run = |id: String, words: [&'static str; 3]| {
        let registry = registry.clone();
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            let session = registry.get(&id).await.unwrap();
            for word in words {
                let mut session = session.lock().await;
                orchestrator.respond(&mut session, word).await.unwrap();
            }
        })
    };

    let a = run(a_id.clone(), ["apple", "apricot", "avocado"]);
    let b = run(b_id.clone(), ["banana", "blueberry", "blackberry"]);
    a.await.unwrap();
    b.await.unwrap();

    let a = registry.get(&a_id).await.unwrap();
    let a = a.lock().await;
    assert!(a.history().iter().all(|t| t.human().starts_with('a')));
    assert_eq!(a.history().len(), 3);

    let b = registry.get(&b_id).await.unwrap();
    let b = b.lock().await;
    assert!(b.history().iter().all(|t| t.human().starts_with('b')));
    assert_eq!(provider.prompts().len(), 6);
}
