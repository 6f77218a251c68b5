//! Durable queue-record collaborator
//!
//! Pushes queue snapshots to an external record store over HTTP. The
//! in-memory queue store stays authoritative for live coordination; this is
//! an asynchronous, best-effort projection. Delivery failures are logged and
//! never surfaced to the operation that produced the snapshot.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::queue::{QueueKey, QueueSnapshot};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordPayload<'a> {
    doctor_id: &'a str,
    hospital_id: &'a str,
    #[serde(flatten)]
    snapshot: &'a QueueSnapshot,
}

/// HTTP client for the external queue-record store
pub struct RecordStore {
    client: reqwest::Client,
    base_url: String,
}

impl RecordStore {
    /// Build a client for the given store endpoint
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Ship a snapshot without blocking the caller
    ///
    /// Spawned onto the runtime; the coordinator has already released its
    /// queue lock by the time the request is on the wire.
    pub fn publish(self: Arc<Self>, key: QueueKey, snapshot: QueueSnapshot) {
        tokio::spawn(async move {
            if let Err(err) = self.put_snapshot(&key, &snapshot).await {
                warn!(queue = %key, error = %err, "queue record write failed");
            }
        });
    }

    async fn put_snapshot(&self, key: &QueueKey, snapshot: &QueueSnapshot) -> anyhow::Result<()> {
        let url = format!(
            "{}/queues/{}/{}",
            self.base_url, key.doctor_id, key.hospital_id
        );
        let response = self
            .client
            .put(&url)
            .json(&RecordPayload {
                doctor_id: &key.doctor_id,
                hospital_id: &key.hospital_id,
                snapshot,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("record store returned {}", response.status());
        }
        debug!(queue = %key, "queue record written");
        Ok(())
    }
}
