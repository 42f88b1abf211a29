//! Integration tests for the knowledge engine over file-backed storage.

use knowledge_responder::config::ResponderConfig;
use knowledge_responder::engine::{FallbackPolicy, KnowledgeEngine, DEFAULT_FALLBACKS};
use knowledge_responder::store::NewEntry;
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> ResponderConfig {
    let mut config = ResponderConfig::default();
    config.storage.path = dir.path().join("knowledge.db");
    config.fallback.policy = FallbackPolicy::RoundRobin;
    config
}

fn is_fallback(reply: &str) -> bool {
    DEFAULT_FALLBACKS.contains(&reply)
}

/// Learn, answer, forget, then fall back.
#[tokio::test]
async fn test_learn_respond_forget_cycle() {
    let dir = TempDir::new().unwrap();
    let engine = KnowledgeEngine::open(&config_in(&dir)).await.unwrap();

    engine
        .add(NewEntry::new("2+2 kya hai?", "2+2 equals 4!"))
        .await
        .unwrap();
    assert_eq!(
        engine.respond("2+2 kya hai", Some("u1")).await.unwrap(),
        "2+2 equals 4!"
    );

    assert!(engine.forget("2+2 kya hai?").await.unwrap());
    let reply = engine.respond("2+2 kya hai", Some("u1")).await.unwrap();
    assert_ne!(reply, "2+2 equals 4!");
    assert!(is_fallback(&reply));

    let stats = engine.statistics().await.unwrap();
    assert_eq!(stats.knowledge_count, 0);
    assert_eq!(stats.conversation_count, 2);
}

/// Re-adding an equivalent question replaces the answer in place.
#[tokio::test]
async fn test_upsert_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let engine = KnowledgeEngine::open(&config_in(&dir)).await.unwrap();

    let first = engine
        .add(NewEntry::new("What is your name?", "Priyanka"))
        .await
        .unwrap();
    let second = engine
        .add(NewEntry::new("what is your name", "Priya"))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    let all = engine.list_all().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].answer, "Priya");
    assert_eq!(
        engine.respond("WHAT is your name??", None).await.unwrap(),
        "Priya"
    );
}

/// Forgetting twice reports a miss the second time.
#[tokio::test]
async fn test_forget_missing_is_false() {
    let dir = TempDir::new().unwrap();
    let engine = KnowledgeEngine::open(&config_in(&dir)).await.unwrap();

    engine.add(NewEntry::new("hello", "namaste")).await.unwrap();
    assert!(engine.forget("Hello!").await.unwrap());
    assert!(!engine.forget("hello").await.unwrap());
    assert!(!engine.forget("").await.unwrap());
}

/// Every respond call logs one turn, hit or miss.
#[tokio::test]
async fn test_statistics_track_turns() {
    let dir = TempDir::new().unwrap();
    let engine = KnowledgeEngine::open(&config_in(&dir)).await.unwrap();

    let stats = engine.statistics().await.unwrap();
    assert_eq!(stats.knowledge_count, 0);
    assert_eq!(stats.conversation_count, 0);
    assert!(stats.last_updated.is_none());
    assert_eq!(stats.last_updated_display(), "never");

    engine.add(NewEntry::new("kaise ho", "theek hoon")).await.unwrap();
    for message in ["kaise ho", "unknown thing", "?!"] {
        engine.respond(message, Some("u2")).await.unwrap();
    }

    let stats = engine.statistics().await.unwrap();
    assert_eq!(stats.knowledge_count, 1);
    assert_eq!(stats.conversation_count, 3);
    assert!(stats.last_updated.is_some());

    let turns = engine.recent_turns(Some("u2"), 10).await.unwrap();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[0].input_text, "?!");
    assert_eq!(turns[2].output_text, "theek hoon");
}

/// Learn rejects blank input without touching the store.
#[tokio::test]
async fn test_learn_rejects_blank() {
    let dir = TempDir::new().unwrap();
    let engine = KnowledgeEngine::open(&config_in(&dir)).await.unwrap();

    let outcome = engine.learn_new_response("   ", "answer").await.unwrap();
    assert!(!outcome.success);
    assert!(outcome.error.is_some());

    let outcome = engine.learn_new_response("question", "").await.unwrap();
    assert!(!outcome.success);

    assert!(engine.list_all().await.is_empty());
}

/// Search never returns more than ten entries.
#[tokio::test]
async fn test_search_is_capped() {
    let dir = TempDir::new().unwrap();
    let engine = KnowledgeEngine::open(&config_in(&dir)).await.unwrap();

    for i in 0..15 {
        engine
            .add(NewEntry::new(format!("movie number {i}"), "film"))
            .await
            .unwrap();
    }
    assert_eq!(engine.search("movie").await.len(), 10);
    assert!(engine.search("cricket").await.is_empty());
}

/// Entries and turns survive reopening the database.
#[tokio::test]
async fn test_reopen_persists() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    {
        let engine = KnowledgeEngine::open(&config).await.unwrap();
        engine
            .add(NewEntry::new("tum kaun ho?", "Main ek bot hoon").category("identity"))
            .await
            .unwrap();
        engine.respond("tum kaun ho", Some("u3")).await.unwrap();
    }

    let engine = KnowledgeEngine::open(&config).await.unwrap();
    let all = engine.list_all().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].category, "identity");
    assert_eq!(all[0].language, "hindi");
    assert_eq!(
        engine.respond("Tum kaun ho?", Some("u3")).await.unwrap(),
        "Main ek bot hoon"
    );
    assert_eq!(engine.statistics().await.unwrap().conversation_count, 2);
}

/// Concurrent learners on one engine never duplicate a normalized key.
#[tokio::test]
async fn test_concurrent_learning_keeps_keys_unique() {
    let dir = TempDir::new().unwrap();
    let engine = KnowledgeEngine::open(&config_in(&dir)).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .learn_new_response("Shared question?", &format!("answer {i}"))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().success);
    }

    let all = engine.list_all().await;
    assert_eq!(all.len(), 1);
    assert!(all[0].answer.starts_with("answer "));
}

/// A query that is a substring of a stored question answers from it.
#[tokio::test]
async fn test_substring_query_answers_and_searches() {
    let dir = TempDir::new().unwrap();
    let engine = KnowledgeEngine::open(&config_in(&dir)).await.unwrap();

    engine
        .add(NewEntry::new("kya haal hai", "Sab badhiya!"))
        .await
        .unwrap();
    engine
        .add(NewEntry::new("movie recommendations", "Sholay dekho"))
        .await
        .unwrap();

    assert_eq!(
        engine.respond("aal hai", Some("u4")).await.unwrap(),
        "Sab badhiya!"
    );

    let found = engine.search("mov").await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].answer, "Sholay dekho");
}

/// A second process learning into the same database is seen without restart.
#[tokio::test]
async fn test_engines_sharing_a_database_see_each_other() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let server = KnowledgeEngine::open(&config).await.unwrap();
    let cli = KnowledgeEngine::open(&config).await.unwrap();

    cli.add(NewEntry::new("tum kaun ho?", "Main ek bot hoon"))
        .await
        .unwrap();
    assert_eq!(
        server.respond("tum kaun ho", None).await.unwrap(),
        "Main ek bot hoon"
    );
    assert_eq!(server.statistics().await.unwrap().knowledge_count, 1);

    assert!(cli.forget("tum kaun ho").await.unwrap());
    assert!(server.list_all().await.is_empty());
}
