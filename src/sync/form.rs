//! RSVP form state

use crate::identity::SessionIdentity;
use crate::invitation::GuestName;
use crate::store::{validate_fields, Attendance, NewEntry, ValidationError};

/// The guest's in-progress submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuestForm {
    name: String,
    attendance: Option<Attendance>,
    message: String,
    name_locked: bool,
}

impl GuestForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form with a read-only name taken from the invitation link
    pub fn prefilled(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            name_locked: true,
            ..Default::default()
        }
    }

    /// Prefill from the invitation link unless it resolved to the default
    pub fn for_guest(guest: &GuestName) -> Self {
        if guest.is_default() {
            Self::new()
        } else {
            Self::prefilled(guest.as_str())
        }
    }

    /// Returns false when the name is locked by the invitation link
    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        if self.name_locked {
            return false;
        }
        self.name = name.into();
        true
    }

    pub fn set_attendance(&mut self, attendance: Attendance) {
        self.attendance = Some(attendance);
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attendance(&self) -> Option<Attendance> {
        self.attendance
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_name_locked(&self) -> bool {
        self.name_locked
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.attendance, &self.message)
    }

    /// Build the submission for `identity`, checking fields first
    pub fn to_new_entry(&self, identity: &SessionIdentity) -> Result<NewEntry, ValidationError> {
        self.validate()?;
        let attendance = self.attendance.ok_or(ValidationError::MissingAttendance)?;
        Ok(NewEntry::new(
            self.name.trim(),
            attendance,
            self.message.trim(),
            identity.clone(),
        ))
    }

    /// Reset after a successful submit; a locked name stays
    pub fn clear(&mut self) {
        if !self.name_locked {
            self.name.clear();
        }
        self.attendance = None;
        self.message.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_name_survives_clear() {
        let mut form = GuestForm::prefilled("Budi Santoso");
        assert!(!form.set_name("Someone Else"));
        form.set_attendance(Attendance::Attending);
        form.set_message("Selamat");

        form.clear();
        assert_eq!(form.name(), "Budi Santoso");
        assert!(form.attendance().is_none());
        assert!(form.message().is_empty());
    }

    #[test]
    fn test_unlocked_name_is_cleared() {
        let mut form = GuestForm::new();
        assert!(form.set_name("Ani"));
        form.clear();
        assert!(form.name().is_empty());
    }

    #[test]
    fn test_for_guest_default_is_editable() {
        let form = GuestForm::for_guest(&GuestName::from_query(""));
        assert!(!form.is_name_locked());

        let form = GuestForm::for_guest(&GuestName::from_query("to=budi+santoso"));
        assert!(form.is_name_locked());
        assert_eq!(form.name(), "Budi Santoso");
    }

    #[test]
    fn test_to_new_entry_trims_and_tags_identity() {
        let mut form = GuestForm::new();
        form.set_name("  Ani ");
        form.set_attendance(Attendance::NotAttending);
        form.set_message(" Maaf tidak bisa hadir ");

        let entry = form.to_new_entry(&SessionIdentity::new("s-7")).unwrap();
        assert_eq!(entry.author_name, "Ani");
        assert_eq!(entry.message, "Maaf tidak bisa hadir");
        assert_eq!(entry.submitter_identity.as_str(), "s-7");
    }

    #[test]
    fn test_to_new_entry_requires_attendance() {
        let mut form = GuestForm::new();
        form.set_name("Ani");
        form.set_message("Hi");
        assert_eq!(
            form.to_new_entry(&SessionIdentity::new("s")),
            Err(ValidationError::MissingAttendance)
        );
    }
}
