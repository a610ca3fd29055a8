//! Guest name from the invitation link

use serde::Serialize;

/// Shown when the link carries no guest name
pub const DEFAULT_GUEST_NAME: &str = "Tamu Undangan";

/// Query parameter holding the guest name
pub const GUEST_PARAM: &str = "to";

/// Display name of the invited guest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuestName {
    name: String,
    is_default: bool,
}

impl GuestName {
    /// Parse from a raw query string such as `to=budi+santoso&x=1`
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let value = query
            .split('&')
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .find(|(key, _)| *key == GUEST_PARAM)
            .map(|(_, value)| decode_component(value));
        Self::from_param(value.as_deref())
    }

    /// Build from an already-decoded parameter value
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(title_case) {
            Some(name) if !name.is_empty() => Self {
                name,
                is_default: false,
            },
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// True when no name came with the link
    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

impl Default for GuestName {
    fn default() -> Self {
        Self {
            name: DEFAULT_GUEST_NAME.to_string(),
            is_default: true,
        }
    }
}

impl std::fmt::Display for GuestName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

fn decode_component(value: &str) -> String {
    let spaced = value.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Collapse whitespace and capitalise each word
pub fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_as_space_and_title_case() {
        let guest = GuestName::from_query("to=budi+santoso");
        assert_eq!(guest.as_str(), "Budi Santoso");
        assert!(!guest.is_default());
    }

    #[test]
    fn test_percent_encoded() {
        let guest = GuestName::from_query("?x=1&to=ANI%20%26%20keluarga");
        assert_eq!(guest.as_str(), "Ani & Keluarga");
    }

    #[test]
    fn test_missing_or_blank_is_default() {
        assert_eq!(GuestName::from_query("").as_str(), DEFAULT_GUEST_NAME);
        assert!(GuestName::from_query("to=").is_default());
        assert!(GuestName::from_query("to=+++").is_default());
        assert!(GuestName::from_param(None).is_default());
    }

    #[test]
    fn test_title_case_normalises_whitespace() {
        assert_eq!(title_case("  dEWI   lestari \t"), "Dewi Lestari");
        assert_eq!(title_case(""), "");
    }
}
