//! Unit tests for the connection wrapper over an in-memory duplex stream.

use game_rpc::rpc::transport::Connection;
use game_rpc::ErrorKind;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn send_and_receive_over_wrapped_stream() {
    let (client, mut server) = tokio::io::duplex(256);
    let mut conn = Connection::from_stream(Box::new(client), "test");
    assert_eq!(conn.peer(), "test");
    assert!(!conn.is_closed());

    conn.send(b"{\"action\":\"ping\"}\n").await.expect("send");
    let mut request = [0_u8; 18];
    server.read_exact(&mut request).await.expect("read request");
    assert_eq!(&request, b"{\"action\":\"ping\"}\n");

    server
        .write_all(b"{\"success\":true}\n")
        .await
        .expect("write response");
    let frame = conn.receive().await.expect("frame");
    assert_eq!(frame, "{\"success\":true}");
}

#[tokio::test]
async fn second_close_is_a_no_op() {
    let mut conn = Connection::from_stream(Box::new(tokio::io::duplex(64).0), "test");

    assert!(conn.close().await, "first close shuts the stream down");
    assert!(!conn.close().await, "second close does nothing");
    assert!(conn.is_closed());
}

#[tokio::test]
async fn closed_connection_rejects_io() {
    let mut conn = Connection::from_stream(Box::new(tokio::io::duplex(64).0), "test");
    conn.close().await;

    let err = conn.send(b"{}\n").await.expect_err("send after close");
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("already closed"), "{err}");

    let err = conn.receive().await.expect_err("receive after close");
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn peer_hangup_before_frame_is_protocol_error() {
    let (client, server) = tokio::io::duplex(64);
    let mut conn = Connection::from_stream(Box::new(client), "test");
    drop(server);

    let err = conn.receive().await.expect_err("no frame");
    assert_eq!(err.kind(), ErrorKind::Protocol);
}
