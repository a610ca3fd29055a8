//! QR e-ticket for an invited guest
//!
//! The ticket is a short text payload rendered to an image by an external
//! URL-templated QR endpoint. Image failures fall back to a static
//! placeholder; nothing here is fatal.

use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::guest::GuestName;
use super::profile::InvitationProfile;

/// Fixed middle segment of every ticket id
pub const TICKET_TAG: &str = "MLNSTRY";

pub const DEFAULT_QR_TEMPLATE: &str =
    "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data={data}";

/// Shown when the QR endpoint cannot produce an image
pub const BLOCKED_PLACEHOLDER_URL: &str =
    "https://placehold.co/200x200/ff6b6b/ffffff?text=QR+BLOKIR";

/// Shown when the link carries no guest name
pub const MISSING_NAME_PLACEHOLDER_URL: &str =
    "https://placehold.co/200x200/414C3D/ffffff?text=Masukkan+Nama";

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// QR endpoint settings
#[derive(Debug, Clone, Deserialize)]
pub struct QrConfig {
    /// Image URL with `{data}` where the encoded payload goes
    #[serde(default = "default_template")]
    pub template: String,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_template() -> String {
    DEFAULT_QR_TEMPLATE.to_string()
}

fn default_fetch_timeout() -> u64 {
    5
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

#[derive(Debug, Error)]
pub enum QrError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A guest's e-ticket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QrTicket {
    /// `None` for the placeholder ticket
    pub ticket_id: Option<String>,
    pub payload: Option<String>,
    pub image_url: String,
    pub title: String,
    pub caption: String,
}

impl QrTicket {
    /// Issue a ticket for `guest_name`; a blank name yields the placeholder
    pub fn issue(guest_name: &str, profile: &InvitationProfile, template: &str) -> Self {
        let name = guest_name.trim();
        let Some(ticket_id) = ticket_id(name, &mut rand::thread_rng()) else {
            return Self::placeholder();
        };

        let payload = ticket_payload(name, &profile.couple_tag(), &ticket_id);
        Self {
            image_url: render_url(template, &payload),
            ticket_id: Some(ticket_id),
            payload: Some(payload),
            title: "E-TICKET TAMU UNDANGAN".to_string(),
            caption: format!(
                "E-Ticket ini dibuat khusus untuk {}. Tunjukkan kode ini saat kedatangan.",
                name
            ),
        }
    }

    /// Ticket for the guest named by the invitation link
    pub fn for_guest(guest: &GuestName, profile: &InvitationProfile, template: &str) -> Self {
        if guest.is_default() {
            Self::placeholder()
        } else {
            Self::issue(guest.as_str(), profile, template)
        }
    }

    pub fn placeholder() -> Self {
        Self {
            ticket_id: None,
            payload: None,
            image_url: MISSING_NAME_PLACEHOLDER_URL.to_string(),
            title: "SCAN E-TICKET/LOKASI".to_string(),
            caption: "E-Ticket belum dimuat. Mohon pastikan link undangan benar.".to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.ticket_id.is_none()
    }
}

/// `PREFIX-MLNSTRY-XXXX`: up to 8 alphanumerics of the name, upper-cased,
/// then 4 random base-36 characters. `None` when the name has none.
pub fn ticket_id<R: Rng>(name: &str, rng: &mut R) -> Option<String> {
    let prefix: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(8)
        .collect::<String>()
        .to_ascii_uppercase();
    if prefix.is_empty() {
        return None;
    }

    let suffix: String = (0..4)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    Some(format!("{}-{}-{}", prefix, TICKET_TAG, suffix))
}

/// Text encoded in the QR image
pub fn ticket_payload(name: &str, couple_tag: &str, ticket_id: &str) -> String {
    let scan_name: String = name
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    format!(
        "Nama tamu: {} , Undangan Wedding: {}, ID: {}",
        scan_name, couple_tag, ticket_id
    )
}

/// Substitute the percent-encoded payload into `template`
pub fn render_url(template: &str, payload: &str) -> String {
    template.replace("{data}", &urlencoding::encode(payload))
}

/// Result of fetching a ticket image
#[derive(Debug, Clone, PartialEq)]
pub enum QrImage {
    Image { content_type: String, bytes: Vec<u8> },
    /// Static image to use instead
    Placeholder(String),
}

/// Fetches QR images from the configured endpoint
pub struct QrRenderer {
    client: Client,
    template: String,
}

impl QrRenderer {
    pub fn new(config: &QrConfig) -> Result<Self, QrError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            template: config.template.clone(),
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Fetch the ticket image, or the placeholder to show instead
    pub async fn fetch(&self, ticket: &QrTicket) -> QrImage {
        if ticket.is_placeholder() {
            return QrImage::Placeholder(ticket.image_url.clone());
        }

        match self.try_fetch(&ticket.image_url).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(url = %ticket.image_url, error = %e, "QR image unavailable");
                QrImage::Placeholder(BLOCKED_PLACEHOLDER_URL.to_string())
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<QrImage, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    "timed out".to_string()
                } else if e.is_connect() {
                    "endpoint unreachable".to_string()
                } else {
                    e.to_string()
                }
            })?;

        if !response.status().is_success() {
            return Err(format!("endpoint returned {}", response.status()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let bytes = response.bytes().await.map_err(|e| e.to_string())?;

        Ok(QrImage::Image {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}
