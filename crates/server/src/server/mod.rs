//! Room runtime: websocket rooms and the HTTP listing.

use crate::config::Config;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinSet;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};

pub mod client;
pub mod listing;
pub mod pid;
pub mod room;

pub use client::{Client, ClientState};
pub use listing::ListedRoom;
pub use pid::PidManager;
pub use room::{GameRoom, run_room_loop};

/// Run every configured room plus the listing endpoint.
///
/// Returns when any of them fails.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let settings = config.world_settings();
    let mut tasks: JoinSet<anyhow::Result<()>> = JoinSet::new();
    let mut listed = Vec::with_capacity(config.rooms.len());

    for room_config in &config.rooms {
        let addr: SocketAddr = format!("{}:{}", config.server.bind, room_config.port).parse()?;
        let listener = TcpListener::bind(&addr).await?;
        info!(
            "Room {:?} ({}) on ws://{} - {} slots, {}ms ticks",
            room_config.name, room_config.region, addr, room_config.capacity, room_config.tick_interval_ms
        );

        let room = Arc::new(RwLock::new(GameRoom::new(room_config, settings.clone(), config.view.size)));
        listed.push(ListedRoom {
            url: format!("ws://{}:{}", config.server.public_host, room_config.port),
            room: Arc::clone(&room),
        });

        let tick_interval = room_config.tick_interval_ms;
        let loop_room = Arc::clone(&room);
        tasks.spawn(async move {
            run_room_loop(loop_room, tick_interval).await;
            Ok(())
        });
        tasks.spawn(accept_loop(listener, room));
    }

    let listing_addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.listing_port).parse()?;
    tasks.spawn(listing::serve(listing_addr, listed));

    while let Some(result) = tasks.join_next().await {
        result??;
    }
    Ok(())
}

/// Accept websocket connections for one room.
async fn accept_loop(listener: TcpListener, room: Arc<RwLock<GameRoom>>) -> anyhow::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        let room = Arc::clone(&room);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, addr, room).await {
                error!("Connection error from {}: {}", addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(stream: TcpStream, addr: SocketAddr, room: Arc<RwLock<GameRoom>>) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Bytes>();

    let Some(pid) = room.write().await.connect(addr, tx) else {
        write.send(Message::Close(None)).await?;
        return Ok(());
    };

    // Message loop - incoming packets and outbound frames
    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Binary(data))) => {
                        let mut room = room.write().await;
                        if let Err(e) = room.handle_packet(pid, &data) {
                            warn!("Packet error from player {} ({}): {}", pid, addr, e);
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!("WebSocket error from {}: {}", addr, e);
                        break;
                    }
                    _ => {}
                }
            }
            frame = rx.recv() => {
                let Some(frame) = frame else {
                    break;
                };
                if let Err(e) = write.send(Message::binary(frame)).await {
                    warn!("Failed to send to player {} ({}): {}", pid, addr, e);
                    break;
                }
            }
        }
    }

    room.write().await.disconnect(pid);
    Ok(())
}
