//! Identity (who signed in) and profile (what we store about them).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crownchat_core::{DisplayName, Email, UserId, Username};

/// Signed-in identity as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: UserId,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

/// User profile document, keyed by uid in the profile store.
///
/// Serialized in the store's camelCase field layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: UserId,
    pub email: Email,
    pub display_name: DisplayName,
    pub username: Username,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(identity: &Identity, data: &SignUpData, now: DateTime<Utc>) -> Self {
        Self {
            uid: identity.uid.clone(),
            email: data.email.clone(),
            display_name: data.display_name.clone(),
            username: data.username.clone(),
            profile_picture: data.profile_picture.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated registration input.
#[derive(Clone, PartialEq, Eq)]
pub struct SignUpData {
    pub email: Email,
    pub password: String,
    pub display_name: DisplayName,
    pub username: Username,
    pub profile_picture: Option<String>,
}

impl core::fmt::Debug for SignUpData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SignUpData")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("display_name", &self.display_name)
            .field("username", &self.username)
            .field("profile_picture", &self.profile_picture)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_document_uses_camel_case_fields() {
        let now = Utc::now();
        let profile = UserProfile {
            uid: UserId::parse("u1").unwrap(),
            email: Email::parse("a@b.co").unwrap(),
            display_name: DisplayName::parse("Ada").unwrap(),
            username: Username::parse("ada").unwrap(),
            profile_picture: None,
            created_at: now,
            updated_at: now,
        };

        let doc = serde_json::to_value(&profile).unwrap();
        assert_eq!(doc["displayName"], "Ada");
        assert_eq!(doc["username"], "ada");
        assert!(doc.get("profilePicture").is_none());
        assert!(doc.get("createdAt").is_some());

        let back: UserProfile = serde_json::from_value(doc).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn sign_up_debug_redacts_password() {
        let data = SignUpData {
            email: Email::parse("a@b.co").unwrap(),
            password: "hunter22".to_string(),
            display_name: DisplayName::parse("Ada").unwrap(),
            username: Username::parse("ada").unwrap(),
            profile_picture: None,
        };
        let rendered = format!("{data:?}");
        assert!(!rendered.contains("hunter22"));
        assert!(rendered.contains("<redacted>"));
    }
}
