use std::sync::Arc;

use crate::auth::Authenticator;
use crate::config::ServerConfig;
use crate::queue::QueueCoordinator;
use crate::records::RecordStore;
use crate::rooms::RoomRegistry;
use crate::signaling::SignalingRelay;

/// Application state shared across handlers
///
/// Owns the room registry, queue coordinator and signaling relay. No
/// module-level statics: everything real-time lives here and dies with the
/// process.
pub struct AppState {
    pub config: ServerConfig,
    pub rooms: Arc<RoomRegistry>,
    pub queues: Arc<QueueCoordinator>,
    pub relay: SignalingRelay,
    pub auth: Arc<Authenticator>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let rooms = Arc::new(RoomRegistry::new());

        // Durable record store is optional; live coordination works without it.
        let records = match &config.record_store_url {
            Some(url) => match RecordStore::new(url, config.record_timeout_seconds) {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    tracing::warn!("Failed to initialize record store client: {:?}", e);
                    None
                }
            },
            None => None,
        };

        let auth = match Authenticator::from_config(&config) {
            Ok(auth) => Arc::new(auth),
            Err(e) => {
                tracing::warn!("Failed to initialize auth client: {:?}", e);
                Arc::new(Authenticator::unconfigured())
            }
        };

        let queues = Arc::new(QueueCoordinator::new(
            rooms.clone(),
            records,
            config.wait_minutes_per_position,
        ));
        let relay = SignalingRelay::new(rooms.clone());

        Arc::new(Self {
            config,
            rooms,
            queues,
            relay,
            auth,
        })
    }
}
