use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::users::models::UserProfile;
use crate::shared::validation::normalize_line;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfileResponseDto {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub contact_info: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<UserProfile> for UserProfileResponseDto {
    fn from(p: UserProfile) -> Self {
        Self {
            uid: p.uid,
            email: p.email,
            display_name: p.display_name,
            photo_url: p.photo_url,
            contact_info: p.contact_info,
            bio: p.bio,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Partial profile update
///
/// Omitted fields stay as they are. An empty `contact_info` or `bio` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[validate(length(max = 200, message = "Contact info must not exceed 200 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,

    #[validate(length(max = 500, message = "Bio must not exceed 500 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl UpdateProfileDto {
    pub fn normalized(self) -> Self {
        Self {
            display_name: self.display_name.map(|n| normalize_line(&n)),
            contact_info: self.contact_info.map(|c| c.trim().to_string()),
            bio: self.bio.map(|b| b.trim().to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.contact_info.is_none() && self.bio.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_display_name_is_invalid() {
        let dto = UpdateProfileDto {
            display_name: Some("   ".to_string()),
            ..Default::default()
        }
        .normalized();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_blank_bio_is_allowed_and_clears() {
        let dto = UpdateProfileDto {
            bio: Some("  ".to_string()),
            ..Default::default()
        }
        .normalized();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.bio.as_deref(), Some(""));
        assert!(!dto.is_empty());
    }

    #[test]
    fn test_display_name_is_collapsed() {
        let dto = UpdateProfileDto {
            display_name: Some("  Sari   Wulandari ".to_string()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(dto.display_name.as_deref(), Some("Sari Wulandari"));
    }
}
