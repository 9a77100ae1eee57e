//! End-to-end behaviour of the conversation core through its public API

mod common;

use async_trait::async_trait;
use chat_memory::config::MemoryConfig;
use chat_memory::context::{
    CompactionPolicy, PromptAssembler, Role, SummarizationEngine, TokenEstimator, Turn,
    WhitespaceEstimator,
};
use chat_memory::llm::{CompletionClient, CompletionError};
use chat_memory::{ChatError, ConversationService, ConversationStore};
use common::{words, ScriptedClient};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn service(client: Arc<ScriptedClient>) -> ConversationService {
    ConversationService::new(
        Arc::new(ConversationStore::new()),
        client,
        &MemoryConfig::default(),
    )
    .unwrap()
}

async fn seed(service: &ConversationService, session_id: &str, word_counts: &[usize]) {
    let handle = service.store().get_or_create(session_id);
    let mut state = handle.lock().await;
    for (i, &n) in word_counts.iter().enumerate() {
        state.push(if i % 2 == 0 { Turn::user(words(n)) } else { Turn::assistant(words(n)) });
    }
}

#[tokio::test]
async fn first_message_reports_tokens_of_prompt_sent() {
    let client = Arc::new(ScriptedClient::new("<think>\nThe user greets me.\n</think>\nHello! How can I help?"));
    let service = service(client.clone());

    let reply = assert_ok!(service.process_message("s1", "Hello").await);

    let prompts = client.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(!prompts[0].contains("Previous conversation summary:"));
    assert_eq!(reply.token_count, WhitespaceEstimator.estimate(&prompts[0]));
    assert_eq!(reply.response, "Hello! How can I help?");
}

#[tokio::test]
async fn token_count_matches_assembled_prompt_at_call_time() {
    let client = Arc::new(ScriptedClient::new("ok"));
    let service = service(client);
    service.process_message("s1", "first question").await.unwrap();

    let mut expected_state = service.store().snapshot("s1").await.unwrap();
    expected_state.push(Turn::user("second question here"));
    let expected_prompt = PromptAssembler::new(Arc::new(WhitespaceEstimator)).build(&expected_state);

    let reply = service.process_message("s1", "second question here").await.unwrap();
    assert_eq!(reply.token_count, WhitespaceEstimator.estimate(&expected_prompt));
}

#[tokio::test]
async fn history_is_chronological() {
    let client = Arc::new(ScriptedClient::new("ack"));
    let service = service(client);

    for i in 0..4 {
        service.process_message("s1", &format!("message {}", i)).await.unwrap();
    }

    let state = service.store().snapshot("s1").await.unwrap();
    let expected: Vec<Turn> = (0..4)
        .flat_map(|i| [Turn::user(format!("message {}", i)), Turn::assistant("ack")])
        .collect();
    assert_eq!(state.history(), expected.as_slice());
}

#[tokio::test]
async fn six_turns_over_limit_compact() {
    let client = Arc::new(ScriptedClient::new("reply").reply("summary of five turns"));
    let service = service(client.clone());
    seed(&service, "s1", &[1600, 1600, 1600, 1600, 1600]).await;

    service.process_message("s1", "next").await.unwrap();

    let state = service.store().snapshot("s1").await.unwrap();
    assert_eq!(state.summary(), Some("summary of five turns"));
    assert_eq!(state.history(), &[Turn::user("next"), Turn::assistant("reply")]);
    assert!(client.prompts()[1].starts_with("Previous conversation summary:\nsummary of five turns\n\n"));
}

#[tokio::test]
async fn six_turns_under_limit_do_not_compact() {
    let client = Arc::new(ScriptedClient::new("reply"));
    let service = service(client.clone());
    seed(&service, "s1", &[20, 20, 20, 20, 19]).await;

    service.process_message("s1", "next").await.unwrap();

    let state = service.store().snapshot("s1").await.unwrap();
    assert!(state.summary().is_none());
    assert_eq!(state.len(), 7);
    assert_eq!(client.prompts().len(), 1);
}

#[tokio::test]
async fn four_turns_over_limit_do_not_compact() {
    let client = Arc::new(ScriptedClient::new("reply"));
    let service = service(client.clone());
    seed(&service, "s1", &[3000, 3000, 2999]).await;

    service.process_message("s1", "next").await.unwrap();

    let state = service.store().snapshot("s1").await.unwrap();
    assert!(state.summary().is_none());
    assert_eq!(state.len(), 5);
    assert_eq!(client.prompts().len(), 1);
}

#[tokio::test]
async fn twelve_turn_compaction_retains_five() {
    let client = Arc::new(ScriptedClient::new("condensed"));
    let engine = SummarizationEngine::new(client.clone(), Arc::new(WhitespaceEstimator), CompactionPolicy::default());
    let store = ConversationStore::new();
    let handle = store.get_or_create("s1");
    let mut state = handle.lock().await;
    for i in 0..12 {
        state.push(Turn::user(format!("turn {}", i)));
    }

    let outcome = engine.compact(&mut state).await.unwrap();

    assert_eq!(state.len(), 12 - 7);
    assert_eq!(state.history()[0].content(), "turn 7");
    assert!(!state.summary().unwrap_or_default().is_empty());
    assert_eq!(outcome.chunks, 2);
    assert_eq!(client.prompts().len(), 2);
}

#[tokio::test]
async fn failed_chunk_rolls_back_compaction() {
    let client = Arc::new(ScriptedClient::new("unused").reply("chunk one").fail().reply("chunk three"));
    let engine = SummarizationEngine::new(client.clone(), Arc::new(WhitespaceEstimator), CompactionPolicy::default());
    let store = ConversationStore::new();
    let handle = store.get_or_create("s1");
    let mut state = handle.lock().await;
    for i in 0..16 {
        state.push(Turn::user(format!("turn {}", i)));
    }
    let before = state.clone();

    assert_err!(engine.compact(&mut state).await);

    assert_eq!(state.summary(), before.summary());
    assert_eq!(state.history(), before.history());
}

#[tokio::test]
async fn compaction_failure_propagates_and_keeps_user_turn() {
    let client = Arc::new(ScriptedClient::new("reply").fail());
    let service = service(client.clone());
    seed(&service, "s1", &[1600, 1600, 1600, 1600, 1600]).await;

    let result = service.process_message("s1", "next").await;

    assert!(matches!(result, Err(ChatError::Completion(CompletionError::RequestFailed(_)))));
    let state = service.store().snapshot("s1").await.unwrap();
    assert!(state.summary().is_none());
    assert_eq!(state.len(), 6);
    assert_eq!(state.history()[5], Turn::user("next"));
    // Only the summarization request went out
    assert_eq!(client.prompts().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_touch_shares_one_session() {
    let client = Arc::new(ScriptedClient::new("ok"));
    let service = Arc::new(service(client));
    let n = 24;

    let tasks: Vec<_> = (0..n)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move { service.process_message("same-id", &format!("msg {}", i)).await })
        })
        .collect();

    for result in futures::future::join_all(tasks).await {
        assert_ok!(result.unwrap());
    }

    assert_eq!(service.store().len(), 1);
    let state = service.store().snapshot("same-id").await.unwrap();
    assert_eq!(state.len(), 2 * n);

    let user_turns: Vec<&str> = state
        .history()
        .iter()
        .filter(|t| t.role() == Role::User)
        .map(|t| t.content())
        .collect();
    let unique: HashSet<&str> = user_turns.iter().copied().collect();
    assert_eq!(user_turns.len(), n);
    assert_eq!(unique.len(), n);

    // Each request's assistant turn directly follows its own user turn
    for pair in state.history().chunks(2) {
        assert_eq!(pair[0].role(), Role::User);
        assert_eq!(pair[1].role(), Role::Assistant);
    }
}

#[tokio::test]
async fn sessions_are_isolated() {
    let client = Arc::new(ScriptedClient::new("ok"));
    let service = service(client);

    service.process_message("alice", "hi from alice").await.unwrap();
    service.process_message("bob", "hi from bob").await.unwrap();

    let alice = service.store().snapshot("alice").await.unwrap();
    assert_eq!(alice.len(), 2);
    assert_eq!(alice.history()[0].content(), "hi from alice");
    assert_eq!(service.store().len(), 2);
}

struct StalledClient;

#[async_trait]
impl CompletionClient for StalledClient {
    async fn complete(&self, _prompt: &str) -> Result<Option<String>, CompletionError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Some("too late".to_string()))
    }
}

#[tokio::test]
async fn configured_deadline_times_out_completion() {
    let config = MemoryConfig {
        completion_timeout_ms: Some(50),
        ..MemoryConfig::default()
    };
    let service = ConversationService::new(
        Arc::new(ConversationStore::new()),
        Arc::new(StalledClient),
        &config,
    )
    .unwrap();

    let err = service.process_message("s1", "hello").await.unwrap_err();
    assert!(err.is_timeout());
}
