//! Invitation helpers
//!
//! Pure helpers around the invitation page: who the link is for, how long
//! until the wedding, the guest's e-ticket, and the couple's profile.

pub mod countdown;
pub mod guest;
pub mod profile;
pub mod qr;

pub use countdown::{ticking, TimeLeft};
pub use guest::{title_case, GuestName, DEFAULT_GUEST_NAME, GUEST_PARAM};
pub use profile::{GiftAccount, GiftAddress, InvitationProfile, WeddingEvent};
pub use qr::{
    render_url, ticket_id, ticket_payload, QrConfig, QrError, QrImage, QrRenderer, QrTicket,
    BLOCKED_PLACEHOLDER_URL, DEFAULT_QR_TEMPLATE, MISSING_NAME_PLACEHOLDER_URL, TICKET_TAG,
};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything the invitation page renders for one guest
#[derive(Debug, Clone, Serialize)]
pub struct InvitationView {
    pub guest: GuestName,
    pub time_left: TimeLeft,
    pub countdown: String,
    pub ticket: QrTicket,
    pub profile: InvitationProfile,
}

impl InvitationView {
    pub fn build(
        guest: GuestName,
        profile: &InvitationProfile,
        qr_template: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let time_left = TimeLeft::between(now, profile.wedding_at);
        Self {
            ticket: QrTicket::for_guest(&guest, profile, qr_template),
            countdown: time_left.to_string(),
            time_left,
            guest,
            profile: profile.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_view_for_named_guest() {
        let profile = InvitationProfile::default();
        let now = Utc.with_ymd_and_hms(2026, 1, 31, 17, 0, 0).unwrap();
        let view = InvitationView::build(
            GuestName::from_query("to=dewi"),
            &profile,
            DEFAULT_QR_TEMPLATE,
            now,
        );
        assert_eq!(view.guest.as_str(), "Dewi");
        assert_eq!(view.time_left.days, 1);
        assert!(!view.ticket.is_placeholder());
    }
}
