//! WebSocket signal server
//!
//! Fans payload-less change signals out to connected dispatch consoles and
//! officer clients. Clients identify themselves by path,
//! `/ws/{role}/{participant_id}`, and receive only the signal categories
//! relevant to their role. Keepalive follows the client-ping/server-pong
//! convention.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::{accept_hdr_async, tungstenite::Message};
use tracing::{error, info, warn};

use sentinellink_core::{ChannelConfig, Role};

use crate::local::LocalChannel;
use crate::signal::{ChannelEvent, WireMessage};
use crate::{ChannelError, NotificationChannel};

/// WebSocket signal fan-out server
pub struct SignalServer {
    /// Shared signal source
    channel: LocalChannel,
    /// Server address
    addr: SocketAddr,
}

impl SignalServer {
    /// Create a new signal server over an existing channel
    pub fn new(addr: SocketAddr, channel: LocalChannel) -> Self {
        Self { channel, addr }
    }

    /// Create a server bound to the configured address over an existing channel
    pub fn from_config(config: &ChannelConfig, channel: LocalChannel) -> Result<Self, ChannelError> {
        let addr = config.ws_bind_addr.parse().map_err(|e| {
            ChannelError::Connection(format!(
                "invalid ws bind address {:?}: {e}",
                config.ws_bind_addr
            ))
        })?;
        Ok(Self::new(addr, channel))
    }

    /// Underlying signal channel, for publishing
    pub fn channel(&self) -> &LocalChannel {
        &self.channel
    }

    /// Start the WebSocket server on the configured address
    pub async fn run(self: Arc<Self>) -> Result<(), ChannelError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| ChannelError::Connection(e.to_string()))?;
        info!("Signal server listening on {}", self.addr);
        self.serve(listener).await
    }

    /// Accept connections on an already-bound listener
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> Result<(), ChannelError> {
        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    info!("New signal connection from {}", peer_addr);
                    let server = Arc::clone(&self);

                    tokio::spawn(async move {
                        if let Err(e) = server.handle_connection(stream, peer_addr).await {
                            error!("Signal connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    /// Handle an individual client connection
    async fn handle_connection(
        &self,
        stream: TcpStream,
        peer_addr: SocketAddr,
    ) -> Result<(), ChannelError> {
        let mut path = String::new();
        let ws_stream = accept_hdr_async(stream, |req: &Request, resp: Response| {
            path = req.uri().path().to_string();
            Ok(resp)
        })
        .await
        .map_err(|e| ChannelError::Connection(e.to_string()))?;

        let (role, participant_id) = parse_client_path(&path)?;
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        // Acknowledge the subscription
        let ack = WireMessage::Ack {
            message: "Connected to SentinelLink signal feed".to_string(),
        };
        let ack_json =
            serde_json::to_string(&ack).map_err(|e| ChannelError::Serialization(e.to_string()))?;
        ws_sender
            .send(Message::Text(ack_json))
            .await
            .map_err(|e| ChannelError::Connection(e.to_string()))?;

        let mut subscription = self.channel.subscribe(role, &participant_id).await?;

        loop {
            tokio::select! {
                // Receive messages from client
                Some(msg) = ws_receiver.next() => {
                    match msg {
                        Ok(Message::Text(text)) => {
                            match serde_json::from_str::<WireMessage>(&text) {
                                Ok(WireMessage::Ping) => {
                                    let pong = serde_json::to_string(&WireMessage::Pong)
                                        .map_err(|e| ChannelError::Serialization(e.to_string()))?;
                                    if ws_sender.send(Message::Text(pong)).await.is_err() {
                                        break;
                                    }
                                }
                                Ok(other) => {
                                    warn!("Unexpected message from {}: {:?}", peer_addr, other);
                                }
                                Err(e) => {
                                    warn!("Unparseable message from {}: {}", peer_addr, e);
                                }
                            }
                        }
                        Ok(Message::Close(_)) => {
                            info!("Client {} disconnected", peer_addr);
                            break;
                        }
                        Err(e) => {
                            warn!("Error receiving from {}: {}", peer_addr, e);
                            break;
                        }
                        _ => {}
                    }
                }

                // Forward signals to client
                event = subscription.recv() => {
                    match event {
                        Some(ChannelEvent::Signal(category)) => {
                            let wire = WireMessage::from(category);
                            let json = serde_json::to_string(&wire)
                                .map_err(|e| ChannelError::Serialization(e.to_string()))?;
                            if let Err(e) = ws_sender.send(Message::Text(json)).await {
                                warn!("Error sending to {}: {}", peer_addr, e);
                                break;
                            }
                        }
                        Some(ChannelEvent::Opened) => {}
                        Some(ChannelEvent::Closed) | Some(ChannelEvent::Errored(_)) | None => {
                            let _ = ws_sender.send(Message::Close(None)).await;
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Parse `/ws/{role}/{participant_id}` into a subscriber identity
fn parse_client_path(path: &str) -> Result<(Role, String), ChannelError> {
    let parts: Vec<&str> = path.trim_matches('/').split('/').collect();

    match parts.as_slice() {
        ["ws", "dispatch", id] if !id.is_empty() => Ok((Role::Dispatch, id.to_string())),
        ["ws", "officer", id] if !id.is_empty() => {
            Ok((Role::Officer(id.to_string()), id.to_string()))
        }
        _ => Err(ChannelError::Connection(format!(
            "unrecognized client path: {path}"
        ))),
    }
}
