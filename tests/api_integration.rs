//! Integration tests for the HTTP API against a live listener.

use std::time::Duration;

use knowledge_responder::api::{ApiServer, ChatResponse, ForgetResponse};
use knowledge_responder::config::ResponderConfig;
use knowledge_responder::engine::{KnowledgeEngine, LearnOutcome, Statistics};
use knowledge_responder::store::KnowledgeEntry;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::time::timeout;

async fn spawn_server() -> (String, tokio_util::sync::CancellationToken, tokio::task::JoinHandle<()>) {
    let engine = KnowledgeEngine::open_in_memory(&ResponderConfig::default())
        .await
        .unwrap();
    let server = ApiServer::new(engine);
    let cancel = server.cancel_token();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        server.serve(listener).await.unwrap();
    });

    (format!("http://{addr}"), cancel, handle)
}

#[tokio::test]
async fn test_http_learn_chat_forget() {
    let (base, cancel, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let outcome: LearnOutcome = client
        .post(format!("{base}/api/learn"))
        .json(&json!({"question": "2+2 kya hai?", "answer": "2+2 equals 4!"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.entry.unwrap().normalized_question, "2+2 kya hai");

    let reply: ChatResponse = client
        .post(format!("{base}/api/chat"))
        .json(&json!({"message": "2+2 kya hai", "actor_id": "web"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reply.response, "2+2 equals 4!");

    let forgot: ForgetResponse = client
        .delete(format!("{base}/api/knowledge"))
        .json(&json!({"question": "2+2 KYA hai"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(forgot.deleted);

    let stats: Statistics = client
        .get(format!("{base}/api/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats.knowledge_count, 0);
    assert_eq!(stats.conversation_count, 1);

    cancel.cancel();
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not shut down")
        .unwrap();
}

#[tokio::test]
async fn test_http_knowledge_and_search() {
    let (base, cancel, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    for (question, answer) in [
        ("weather today", "sunny"),
        ("what is the weather like in delhi", "hot"),
        ("favourite food", "pizza"),
    ] {
        let response = client
            .post(format!("{base}/api/knowledge"))
            .json(&json!({"question": question, "answer": answer}))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    let all: Vec<KnowledgeEntry> = client
        .get(format!("{base}/api/knowledge"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let found: Vec<KnowledgeEntry> = client
        .get(format!("{base}/api/search"))
        .query(&[("q", "weather today")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].answer, "sunny");

    cancel.cancel();
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not shut down")
        .unwrap();
}

#[tokio::test]
async fn test_http_invalid_entry_is_unprocessable() {
    let (base, cancel, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/knowledge"))
        .json(&json!({"question": "  ", "answer": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Question"));

    cancel.cancel();
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not shut down")
        .unwrap();
}
