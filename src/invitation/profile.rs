//! Invitation profile: the couple, the date, the gift details

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Everything the invitation page shows besides the guestbook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationProfile {
    #[serde(default = "default_bride")]
    pub bride: String,

    #[serde(default = "default_groom")]
    pub groom: String,

    /// Countdown target
    #[serde(default = "default_wedding_at")]
    pub wedding_at: DateTime<Utc>,

    #[serde(default = "default_rsvp_deadline")]
    pub rsvp_deadline: String,

    #[serde(default = "default_events")]
    pub events: Vec<WeddingEvent>,

    #[serde(default = "default_gift_accounts")]
    pub gift_accounts: Vec<GiftAccount>,

    #[serde(default)]
    pub gift_address: Option<GiftAddress>,
}

/// One ceremony on the schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeddingEvent {
    pub name: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub map_link: Option<String>,
}

/// Account for cashless gifts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftAccount {
    pub bank: String,
    pub number: String,
    pub holder: String,
}

/// Address for sending physical gifts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftAddress {
    pub title: String,
    pub detail: String,
}

fn default_bride() -> String {
    "Pacar".to_string()
}

fn default_groom() -> String {
    "Yudhistira".to_string()
}

fn default_wedding_at() -> DateTime<Utc> {
    // 2026-02-02 00:00 WIB
    Utc.with_ymd_and_hms(2026, 2, 1, 17, 0, 0)
        .single()
        .unwrap_or_default()
}

fn default_rsvp_deadline() -> String {
    "Mohon konfirmasi kehadiran sebelum 25 Januari 2026".to_string()
}

fn default_events() -> Vec<WeddingEvent> {
    vec![
        WeddingEvent {
            name: "Akad Nikah".to_string(),
            date: "02.02.2026".to_string(),
            time: "08.00 - Selesai".to_string(),
            venue: None,
            map_link: None,
        },
        WeddingEvent {
            name: "Resepsi".to_string(),
            date: "03.02.2026".to_string(),
            time: "08.00 - Selesai".to_string(),
            venue: None,
            map_link: None,
        },
    ]
}

fn default_gift_accounts() -> Vec<GiftAccount> {
    vec![GiftAccount {
        bank: "Bank BCA".to_string(),
        number: "1234567890".to_string(),
        holder: "Yudhistira".to_string(),
    }]
}

impl Default for InvitationProfile {
    fn default() -> Self {
        Self {
            bride: default_bride(),
            groom: default_groom(),
            wedding_at: default_wedding_at(),
            rsvp_deadline: default_rsvp_deadline(),
            events: default_events(),
            gift_accounts: default_gift_accounts(),
            gift_address: None,
        }
    }
}

impl InvitationProfile {
    /// `Bride_Groom`, as embedded in QR payloads
    pub fn couple_tag(&self) -> String {
        format!("{}_{}", self.bride, self.groom)
    }

    /// "Bride & Groom"
    pub fn couple_display(&self) -> String {
        format!("{} & {}", self.bride, self.groom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let profile = InvitationProfile::default();
        assert_eq!(profile.couple_tag(), "Pacar_Yudhistira");
        assert_eq!(profile.events.len(), 2);
        assert_eq!(
            profile.wedding_at,
            Utc.with_ymd_and_hms(2026, 2, 1, 17, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let profile: InvitationProfile = toml::from_str(
            r#"
            bride = "Sari"
            groom = "Adi"

            [[gift_accounts]]
            bank = "Mandiri"
            number = "987"
            holder = "Sari"
            "#,
        )
        .unwrap();
        assert_eq!(profile.couple_display(), "Sari & Adi");
        assert_eq!(profile.gift_accounts[0].bank, "Mandiri");
        assert_eq!(profile.rsvp_deadline, default_rsvp_deadline());
    }
}
