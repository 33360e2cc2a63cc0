//! Concurrent calls on one client stay independent.

use game_rpc::GameClient;
use serde_json::json;

use super::test_helpers::{client, spawn_echo_server};

#[tokio::test]
async fn concurrent_calls_settle_their_own_outcomes() {
    let (endpoint, server) = spawn_echo_server(2).await;
    let client = client(endpoint, 2000);

    // The first call is answered last.
    let (slow, fast) = tokio::join!(
        client.call("list_craft", json!({ "delay_ms": 150 }).as_object().cloned()),
        client.call("select_craft", json!({ "id": 3 }).as_object().cloned()),
    );

    let slow = slow.expect("slow call");
    let fast = fast.expect("fast call");
    assert_eq!(slow["action"], "list_craft");
    assert_eq!(fast["action"], "select_craft");
    assert_eq!(fast["params"]["id"], 3);

    server.await.expect("echo server");
}

#[tokio::test]
async fn identical_actions_on_spawned_tasks_do_not_mix() {
    let (endpoint, server) = spawn_echo_server(4).await;
    let client = client(endpoint, 2000);

    let mut handles = Vec::new();
    for id in 0..4_u64 {
        let client: GameClient = client.clone();
        handles.push(tokio::spawn(async move {
            let params = json!({ "id": id, "delay_ms": 40 * (4 - id) });
            let data = client
                .call("select_craft", params.as_object().cloned())
                .await
                .expect("call must succeed");
            (id, data)
        }));
    }

    for handle in handles {
        let (id, data) = handle.await.expect("task");
        assert_eq!(data["params"]["id"], id, "call {id} got another call's reply");
    }

    server.await.expect("echo server");
}
