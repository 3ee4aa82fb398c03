//! WebSocket signal fan-out
//!
//! Verifies the wire contract real clients see: the connect ack, role
//! filtering, payload-less signal frames, and the ping/pong keepalive.

use futures_util::{SinkExt, StreamExt};
use sentinellink_channel::{LocalChannel, Signal, SignalServer, WireMessage};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::Message};

type WsClient = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn start_server(channel: LocalChannel) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    let server = Arc::new(SignalServer::new(addr, channel));
    tokio::spawn(server.serve(listener));
    addr
}

async fn connect_client(addr: SocketAddr, path: &str) -> WsClient {
    let url = format!("ws://{addr}{path}");
    let (client, _) = connect_async(url).await.expect("Failed to connect client");
    client
}

async fn next_wire_message(client: &mut WsClient) -> WireMessage {
    let frame = tokio::time::timeout(Duration::from_secs(2), client.next())
        .await
        .expect("Timed out waiting for frame")
        .expect("Stream ended")
        .expect("Frame error");
    match frame {
        Message::Text(text) => serde_json::from_str(&text).expect("Unparseable wire message"),
        other => panic!("Unexpected frame: {other:?}"),
    }
}

#[tokio::test]
async fn test_ack_then_signal_delivery() {
    let channel = LocalChannel::new(32);
    let addr = start_server(channel.clone()).await;

    let mut dispatch = connect_client(addr, "/ws/dispatch/console-1").await;
    assert!(matches!(
        next_wire_message(&mut dispatch).await,
        WireMessage::Ack { .. }
    ));

    // Give the server-side subscription a beat to register
    tokio::time::sleep(Duration::from_millis(50)).await;

    channel.publish(Signal::officer_response("officer-001"));
    assert_eq!(
        next_wire_message(&mut dispatch).await,
        WireMessage::OfficerResponse
    );
}

#[tokio::test]
async fn test_role_filtering_on_the_wire() {
    let channel = LocalChannel::new(32);
    let addr = start_server(channel.clone()).await;

    let mut officer = connect_client(addr, "/ws/officer/officer-001").await;
    assert!(matches!(
        next_wire_message(&mut officer).await,
        WireMessage::Ack { .. }
    ));
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Addressed to a different officer: must not arrive
    channel.publish(Signal::message_received("officer-002"));
    // Addressed to this officer: arrives
    channel.publish(Signal::message_received("officer-001"));

    assert_eq!(
        next_wire_message(&mut officer).await,
        WireMessage::MessageReceived
    );
}

#[tokio::test]
async fn test_ping_pong_keepalive() {
    let channel = LocalChannel::new(32);
    let addr = start_server(channel).await;

    let mut client = connect_client(addr, "/ws/dispatch/console-1").await;
    assert!(matches!(
        next_wire_message(&mut client).await,
        WireMessage::Ack { .. }
    ));

    let ping = serde_json::to_string(&WireMessage::Ping).expect("Failed to serialize ping");
    client
        .send(Message::Text(ping))
        .await
        .expect("Failed to send ping");

    assert_eq!(next_wire_message(&mut client).await, WireMessage::Pong);
}
