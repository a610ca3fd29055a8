//! Core data types for the guestbook collection
//!
//! - `GuestbookEntry`: one RSVP / well-wish record as stored
//! - `NewEntry`: the fields a guest submits
//! - `Attendance`: whether the guest will come
//! - `ValidationError`: why a submission was rejected before any write

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

use crate::identity::{OwnerKey, SessionIdentity};

/// Maximum length of a guest name, in characters
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of a message, in characters
pub const MAX_MESSAGE_LEN: usize = 1000;

/// Placeholder shown for entries whose server timestamp has not arrived yet
pub const JUST_NOW: &str = "just now";

/// Attendance answer recorded with an entry
///
/// Stored as `"yes"`, `"no"` or `"maybe"`. Anything else found in storage
/// decodes as `Undecided`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Attendance {
    #[serde(rename = "yes")]
    Attending,
    #[serde(rename = "no")]
    NotAttending,
    #[serde(rename = "maybe", other)]
    Undecided,
}

impl Attendance {
    /// Human-readable label for rendering
    pub fn label(&self) -> &'static str {
        match self {
            Attendance::Attending => "Attending",
            Attendance::NotAttending => "Not attending",
            Attendance::Undecided => "Undecided",
        }
    }

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Attendance::Attending => "yes",
            Attendance::NotAttending => "no",
            Attendance::Undecided => "maybe",
        }
    }
}

impl std::fmt::Display for Attendance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Attendance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "y" | "attending" | "hadir" => Ok(Attendance::Attending),
            "no" | "n" | "not-attending" | "tidak" => Ok(Attendance::NotAttending),
            "maybe" | "undecided" => Ok(Attendance::Undecided),
            other => Err(format!("Unknown attendance '{}' (expected yes or no)", other)),
        }
    }
}

/// A stored guestbook entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuestbookEntry {
    /// Assigned by the store on creation
    pub id: String,
    pub author_name: String,
    pub attendance: Attendance,
    pub message: String,
    /// Server-assigned; `None` until the write has round-tripped
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    /// Derived from the submitter's session identity, which is never stored
    pub owner_key: OwnerKey,
}

impl GuestbookEntry {
    /// Whether `identity` created this entry
    pub fn is_owned_by(&self, identity: &SessionIdentity) -> bool {
        self.owner_key == identity.owner_key()
    }

    /// Timestamp label, or the placeholder while it is still pending
    pub fn submitted_label(&self) -> String {
        match self.submitted_at {
            Some(ts) => ts.format("%d %b %Y %H:%M").to_string(),
            None => JUST_NOW.to_string(),
        }
    }
}

/// Display ordering: newest first, pending timestamps before everything
/// else, ties broken by id.
pub fn display_order(a: &GuestbookEntry, b: &GuestbookEntry) -> Ordering {
    match (a.submitted_at, b.submitted_at) {
        (None, None) => a.id.cmp(&b.id),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| a.id.cmp(&b.id)),
    }
}

/// Sort entries in place into display order
pub fn sort_for_display(entries: &mut [GuestbookEntry]) {
    entries.sort_by(display_order);
}

/// Fields a guest submits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewEntry {
    pub author_name: String,
    pub attendance: Attendance,
    pub message: String,
    pub submitter_identity: SessionIdentity,
}

impl NewEntry {
    pub fn new(
        author_name: impl Into<String>,
        attendance: Attendance,
        message: impl Into<String>,
        submitter_identity: SessionIdentity,
    ) -> Self {
        Self {
            author_name: author_name.into(),
            attendance,
            message: message.into(),
            submitter_identity,
        }
    }

    /// Check the submission without touching any store
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(
            &self.author_name,
            Some(self.attendance),
            &self.message,
        )?;
        if self.submitter_identity.as_str().trim().is_empty() {
            return Err(ValidationError::MissingIdentity);
        }
        Ok(())
    }

    /// Trimmed copy of the submission
    pub fn normalized(self) -> Self {
        Self {
            author_name: self.author_name.trim().to_string(),
            attendance: self.attendance,
            message: self.message.trim().to_string(),
            submitter_identity: self.submitter_identity,
        }
    }

    /// Build the stored entry
    pub fn into_entry(self, id: String, submitted_at: Option<DateTime<Utc>>) -> GuestbookEntry {
        GuestbookEntry {
            id,
            author_name: self.author_name,
            attendance: self.attendance,
            message: self.message,
            submitted_at,
            owner_key: self.submitter_identity.owner_key(),
        }
    }
}

/// Field checks shared by the form (before any network call) and the store
pub fn validate_fields(
    author_name: &str,
    attendance: Option<Attendance>,
    message: &str,
) -> Result<(), ValidationError> {
    let name = author_name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    match attendance {
        None | Some(Attendance::Undecided) => return Err(ValidationError::MissingAttendance),
        Some(_) => {}
    }
    let message = message.trim();
    if message.is_empty() {
        return Err(ValidationError::MissingMessage);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong(MAX_NAME_LEN));
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(ValidationError::MessageTooLong(MAX_MESSAGE_LEN));
    }
    Ok(())
}

/// Reasons a submission is rejected before it reaches storage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in your name")]
    MissingName,

    #[error("Please tell us whether you will attend")]
    MissingAttendance,

    #[error("Please write a message")]
    MissingMessage,

    #[error("Name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),

    #[error("Submission is missing a session identity")]
    MissingIdentity,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(id: &str, ts: Option<i64>) -> GuestbookEntry {
        GuestbookEntry {
            id: id.to_string(),
            author_name: "Budi".to_string(),
            attendance: Attendance::Attending,
            message: "Selamat!".to_string(),
            submitted_at: ts.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
            owner_key: SessionIdentity::new("s-1").owner_key(),
        }
    }

    #[test]
    fn test_attendance_wire_values() {
        let json = serde_json::to_string(&Attendance::Attending).unwrap();
        assert_eq!(json, "\"yes\"");

        let a: Attendance = serde_json::from_str("\"no\"").unwrap();
        assert_eq!(a, Attendance::NotAttending);

        let a: Attendance = serde_json::from_str("\"maybe\"").unwrap();
        assert_eq!(a, Attendance::Undecided);
    }

    #[test]
    fn test_attendance_malformed_value_is_undecided() {
        let a: Attendance = serde_json::from_str("\"perhaps-later\"").unwrap();
        assert_eq!(a, Attendance::Undecided);
    }

    #[test]
    fn test_attendance_from_str() {
        assert_eq!("yes".parse::<Attendance>().unwrap(), Attendance::Attending);
        assert_eq!("No".parse::<Attendance>().unwrap(), Attendance::NotAttending);
        assert!("sometimes".parse::<Attendance>().is_err());
    }

    #[test]
    fn test_display_order_newest_first() {
        let mut entries = vec![entry("a", Some(100)), entry("b", Some(300)), entry("c", Some(200))];
        sort_for_display(&mut entries);
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_display_order_pending_timestamp_first() {
        let mut entries = vec![entry("a", Some(100)), entry("pending", None), entry("b", Some(300))];
        sort_for_display(&mut entries);
        assert_eq!(entries[0].id, "pending");
        assert_eq!(entries[1].id, "b");
        assert_eq!(entries[2].id, "a");
    }

    #[test]
    fn test_submitted_label_placeholder() {
        assert_eq!(entry("a", None).submitted_label(), JUST_NOW);
        assert_ne!(entry("a", Some(1_700_000_000)).submitted_label(), JUST_NOW);
    }

    #[test]
    fn test_missing_timestamp_deserializes() {
        let json = r#"{"id":"x","author_name":"Ani","attendance":"yes","message":"Hi","owner_key":"k-9"}"#;
        let e: GuestbookEntry = serde_json::from_str(json).unwrap();
        assert!(e.submitted_at.is_none());
        assert_eq!(e.owner_key.as_str(), "k-9");
    }

    #[test]
    fn test_validate_fields() {
        assert!(validate_fields("Budi", Some(Attendance::Attending), "Selamat").is_ok());
        assert_eq!(
            validate_fields("  ", Some(Attendance::Attending), "Selamat"),
            Err(ValidationError::MissingName)
        );
        assert_eq!(
            validate_fields("Budi", None, "Selamat"),
            Err(ValidationError::MissingAttendance)
        );
        assert_eq!(
            validate_fields("Budi", Some(Attendance::Undecided), "Selamat"),
            Err(ValidationError::MissingAttendance)
        );
        assert_eq!(
            validate_fields("Budi", Some(Attendance::NotAttending), "\n"),
            Err(ValidationError::MissingMessage)
        );
    }

    #[test]
    fn test_validate_lengths() {
        let long_name = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            validate_fields(&long_name, Some(Attendance::Attending), "Hi"),
            Err(ValidationError::NameTooLong(MAX_NAME_LEN))
        );
    }

    #[test]
    fn test_normalized_trims() {
        let e = NewEntry::new("  Ani ", Attendance::Attending, " Selamat ", SessionIdentity::new("s"))
            .normalized();
        assert_eq!(e.author_name, "Ani");
        assert_eq!(e.message, "Selamat");
    }

    #[test]
    fn test_stored_entry_carries_owner_key_only() {
        let secret = SessionIdentity::new("3f0c1e9a-1111-4000-8000-000000000000");
        let entry = NewEntry::new("Ani", Attendance::Attending, "Selamat", secret.clone())
            .into_entry("e1".to_string(), None);

        assert!(entry.is_owned_by(&secret));
        assert!(!entry.is_owned_by(&SessionIdentity::new(entry.owner_key.as_str())));

        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains(secret.as_str()));
        assert!(!json.contains("submitter_identity"));
    }
}
