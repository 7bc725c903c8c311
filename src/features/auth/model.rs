use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity taken from a verified Google ID token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Stable Google account id (`sub` claim), used as the owner id on reports
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl AuthenticatedUser {
    /// Name shown next to reports and comments
    ///
    /// Falls back to the local part of the email, then to "Anonymous".
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }

        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| "Anonymous".to_string())
    }

    pub fn owns(&self, owner_id: Option<&str>) -> bool {
        owner_id == Some(self.sub.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: Option<&str>, email: Option<&str>) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1234567890".to_string(),
            email: email.map(str::to_string),
            name: name.map(str::to_string),
            picture: None,
        }
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(
            user(Some("Sari Wulandari"), Some("sari@example.com")).display_name(),
            "Sari Wulandari"
        );
        assert_eq!(user(Some("  "), Some("sari@example.com")).display_name(), "sari");
        assert_eq!(user(None, None).display_name(), "Anonymous");
    }

    #[test]
    fn test_owns() {
        let u = user(None, None);
        assert!(u.owns(Some("1234567890")));
        assert!(!u.owns(Some("someone-else")));
        assert!(!u.owns(None));
    }
}
