//! Value objects: equality by value, validated on construction.
//!
//! Each type here trims its input, normalizes it where the backend expects a
//! canonical form, and rejects anything the identity provider or profile store
//! would refuse. Once constructed, a value object is known-good.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

const EMAIL_MAX_LEN: usize = 254;
const USERNAME_MIN_LEN: usize = 3;
const USERNAME_MAX_LEN: usize = 20;
const DISPLAY_NAME_MIN_LEN: usize = 2;
const DISPLAY_NAME_MAX_LEN: usize = 50;

/// An email address, trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let value = raw.trim().to_lowercase();
        if value.is_empty() {
            return Err(DomainError::validation("Email is required"));
        }
        if !looks_like_email(&value) {
            return Err(DomainError::validation("Please enter a valid email address"));
        }
        if value.len() > EMAIL_MAX_LEN {
            return Err(DomainError::validation("Email is too long"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}


impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `local@domain.tld`, no whitespace, exactly one `@`, no empty labels.
fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

/// A public username, trimmed and lowercased. Unique across the profile store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(DomainError::validation("Username is required"));
        }
        let len = value.chars().count();
        if len < USERNAME_MIN_LEN {
            return Err(DomainError::validation("Username must be at least 3 characters"));
        }
        if len > USERNAME_MAX_LEN {
            return Err(DomainError::validation("Username must be less than 20 characters"));
        }
        if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DomainError::validation(
                "Username can only contain letters, numbers, and underscores",
            ));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}


impl core::fmt::Display for Username {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The name shown to other users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(DomainError::validation("Display name is required"));
        }
        let len = value.chars().count();
        if len < DISPLAY_NAME_MIN_LEN {
            return Err(DomainError::validation("Display name must be at least 2 characters"));
        }
        if len > DISPLAY_NAME_MAX_LEN {
            return Err(DomainError::validation("Display name must be less than 50 characters"));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}


impl core::fmt::Display for DisplayName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
