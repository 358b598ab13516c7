//! HTTP room listing (`GET /gameservers.json`).

use super::room::GameRoom;
use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Regions always present in the listing, even when empty.
const REGIONS: [&str; 3] = ["na", "eu", "as"];

/// Listing entry for one room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomStatus {
    pub players: usize,
    pub slots: usize,
    pub url: String,
}

/// `region -> room name -> status`.
pub type Listing = BTreeMap<String, BTreeMap<String, RoomStatus>>;

/// A room as advertised by the listing.
#[derive(Clone)]
pub struct ListedRoom {
    pub url: String,
    pub room: Arc<RwLock<GameRoom>>,
}

/// Group room statuses by region.
pub fn build_listing<'a>(rooms: impl IntoIterator<Item = (&'a str, &'a str, RoomStatus)>) -> Listing {
    let mut listing: Listing = REGIONS.iter().map(|r| (r.to_string(), BTreeMap::new())).collect();
    for (region, name, status) in rooms {
        listing
            .entry(region.to_string())
            .or_default()
            .insert(name.to_string(), status);
    }
    listing
}

async fn game_servers(State(rooms): State<Arc<Vec<ListedRoom>>>) -> Json<Listing> {
    let mut snapshot = Vec::with_capacity(rooms.len());
    for listed in rooms.iter() {
        let room = listed.room.read().await;
        snapshot.push((
            room.region().to_string(),
            room.name().to_string(),
            RoomStatus {
                players: room.player_count(),
                slots: room.capacity(),
                url: listed.url.clone(),
            },
        ));
    }

    Json(build_listing(
        snapshot
            .iter()
            .map(|(region, name, status)| (region.as_str(), name.as_str(), status.clone())),
    ))
}

/// Serve the listing until the process exits.
pub async fn serve(addr: SocketAddr, rooms: Vec<ListedRoom>) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/gameservers.json", get(game_servers))
        .with_state(Arc::new(rooms))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Room listing on http://{}/gameservers.json", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
