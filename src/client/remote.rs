//! Remote guestbook client
//!
//! HTTP client for a guestbook server. Implements both service traits, so a
//! synchronizer can run against a server exactly as it runs in-process.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::{header, Client, Response, StatusCode};
use std::time::Duration;

use crate::api::dto::{
    CreateEntryRequest, CreateEntryResponse, EntryListResponse, SessionRequest, SessionResponse,
    ERROR_EVENT, SESSION_HEADER, SNAPSHOT_EVENT,
};
use crate::api::ErrorResponse;
use crate::identity::{IdentityError, IdentityService, SessionIdentity};
use crate::store::{
    GuestbookEntry, GuestbookStore, NewEntry, SnapshotStream, StoreError, StoreResult,
};

/// Configuration for the remote client
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Server root, e.g. "http://localhost:8082"
    pub base_url: String,
    /// Timeout for ordinary requests
    pub request_timeout_ms: u64,
    /// Connect timeout for the live stream, which has no overall timeout
    pub connect_timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8082".to_string(),
            request_timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
        }
    }
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// Guestbook server client
pub struct RemoteGuestbook {
    client: Client,
    stream_client: Client,
    config: RemoteConfig,
}

impl RemoteGuestbook {
    pub fn new(config: RemoteConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| StoreError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;
        let stream_client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|e| StoreError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            stream_client,
            config,
        })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

fn transport_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Unavailable("request timed out".to_string())
    } else if e.is_connect() {
        StoreError::Unavailable(format!("cannot connect to server: {}", e))
    } else {
        StoreError::Unavailable(e.to_string())
    }
}

/// Error text from the server's envelope, or the status reason
async fn error_message(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };
    (status, message)
}

/// Map a non-2xx response; `subject` names the entry for 403/404
async fn store_error(response: Response, subject: &str) -> StoreError {
    let (status, message) = error_message(response).await;
    match status {
        StatusCode::FORBIDDEN => StoreError::Forbidden(subject.to_string()),
        StatusCode::NOT_FOUND => StoreError::NotFound(subject.to_string()),
        _ => StoreError::Remote {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl GuestbookStore for RemoteGuestbook {
    async fn create_entry(&self, entry: NewEntry) -> StoreResult<String> {
        let body = CreateEntryRequest {
            author_name: entry.author_name,
            attendance: Some(entry.attendance.as_str().to_string()),
            message: entry.message,
        };

        let response = self
            .client
            .post(self.url("/entries"))
            .header(SESSION_HEADER, entry.submitter_identity.as_str())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(store_error(response, "new entry").await);
        }

        let created: CreateEntryResponse = response.json().await.map_err(transport_error)?;
        Ok(created.id)
    }

    async fn delete_entry(&self, id: &str, requester: &SessionIdentity) -> StoreResult<()> {
        let url = self.url(&format!("/entries/{}", urlencoding::encode(id)));
        let response = self
            .client
            .delete(url)
            .header(SESSION_HEADER, requester.as_str())
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(store_error(response, id).await);
        }
        Ok(())
    }

    async fn list_entries(&self) -> StoreResult<Vec<GuestbookEntry>> {
        let response = self
            .client
            .get(self.url("/entries"))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(store_error(response, "entries").await);
        }

        let list: EntryListResponse = response.json().await.map_err(transport_error)?;
        Ok(list.entries)
    }

    async fn subscribe(&self) -> StoreResult<SnapshotStream> {
        let response = self
            .stream_client
            .get(self.url("/entries/stream"))
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(store_error(response, "stream").await);
        }

        let snapshots = response
            .bytes_stream()
            .eventsource()
            .filter_map(|result| async move {
                match result {
                    Ok(event) if event.event == SNAPSHOT_EVENT => Some(
                        serde_json::from_str::<Vec<GuestbookEntry>>(&event.data)
                            .map_err(StoreError::from),
                    ),
                    Ok(event) if event.event == ERROR_EVENT => {
                        Some(Err(StoreError::Unavailable(event.data)))
                    }
                    Ok(_) => None,
                    Err(e) => Some(Err(StoreError::Unavailable(e.to_string()))),
                }
            });

        Ok(snapshots.boxed())
    }
}

#[async_trait]
impl IdentityService for RemoteGuestbook {
    async fn establish_anonymous_session(
        &self,
        existing: Option<&SessionIdentity>,
    ) -> Result<SessionIdentity, IdentityError> {
        let body = SessionRequest {
            existing: existing.cloned(),
        };
        let response = self
            .client
            .post(self.url("/session"))
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(transport_error(e).to_string()))?;

        if !response.status().is_success() {
            let (status, message) = error_message(response).await;
            return Err(if status.is_client_error() {
                IdentityError::Rejected(message)
            } else {
                IdentityError::Unavailable(message)
            });
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        Ok(session.identity)
    }
}
