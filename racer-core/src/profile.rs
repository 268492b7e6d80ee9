use serde::{Deserialize, Serialize};

use crate::constants::{HANDLE_MAX_CHARS, PLAYER_NAME_MAX_CHARS};
use crate::error::ProfileError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    /// Stored without the leading `@`.
    pub handle: String,
}

impl PlayerProfile {
    pub fn new(name: &str, handle: &str) -> Result<Self, ProfileError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfileError::MissingName);
        }
        let chars = name.chars().count();
        if chars > PLAYER_NAME_MAX_CHARS {
            return Err(ProfileError::NameTooLong {
                chars,
                max: PLAYER_NAME_MAX_CHARS,
            });
        }

        let handle = handle.trim();
        let handle = handle.strip_prefix('@').unwrap_or(handle);
        validate_handle(handle)?;

        Ok(Self {
            name: name.to_string(),
            handle: handle.to_string(),
        })
    }
}

/// Letters and digits, with hyphens allowed only between them; at least two
/// characters and at most 39.
pub fn validate_handle(handle: &str) -> Result<(), ProfileError> {
    if handle.is_empty() {
        return Err(ProfileError::MissingHandle);
    }
    let chars = handle.chars().count();
    if chars > HANDLE_MAX_CHARS {
        return Err(ProfileError::HandleTooLong {
            chars,
            max: HANDLE_MAX_CHARS,
        });
    }

    let bytes = handle.as_bytes();
    let valid = bytes.len() >= 2
        && bytes[0].is_ascii_alphanumeric()
        && bytes[bytes.len() - 1].is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'-');
    if !valid {
        return Err(ProfileError::InvalidHandle);
    }
    Ok(())
}

/// Canonical stored form: always one leading `@`.
pub fn normalize_handle(handle: &str) -> String {
    if handle.starts_with('@') {
        handle.to_string()
    } else {
        format!("@{handle}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_at_prefix_before_validation() {
        let profile = PlayerProfile::new("  Ada  ", "@ada-lovelace").unwrap();
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.handle, "ada-lovelace");
    }

    #[test]
    fn rejects_edge_hyphens_and_symbols() {
        assert_eq!(validate_handle("-ada"), Err(ProfileError::InvalidHandle));
        assert_eq!(validate_handle("ada-"), Err(ProfileError::InvalidHandle));
        assert_eq!(validate_handle("ad_a"), Err(ProfileError::InvalidHandle));
        assert_eq!(validate_handle("a"), Err(ProfileError::InvalidHandle));
        assert_eq!(validate_handle("@ada"), Err(ProfileError::InvalidHandle));
        assert!(validate_handle("a1").is_ok());
        assert!(validate_handle("a--b").is_ok());
    }

    #[test]
    fn enforces_length_limits() {
        let long = "a".repeat(40);
        assert_eq!(
            validate_handle(&long),
            Err(ProfileError::HandleTooLong { chars: 40, max: 39 })
        );
        assert!(validate_handle(&"a".repeat(39)).is_ok());
        assert_eq!(
            PlayerProfile::new("", "ada"),
            Err(ProfileError::MissingName)
        );
        assert_eq!(
            PlayerProfile::new("Ada", "  "),
            Err(ProfileError::MissingHandle)
        );
    }

    #[test]
    fn normalize_adds_single_prefix() {
        assert_eq!(normalize_handle("ada"), "@ada");
        assert_eq!(normalize_handle("@ada"), "@ada");
    }
}
