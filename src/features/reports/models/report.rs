use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[cfg(test)]
use fake::Dummy;

/// Report lifecycle status matching the `report_status` database enum
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema,
)]
#[cfg_attr(test, derive(Dummy))]
#[sqlx(type_name = "report_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Still looking (lost) or still waiting for the owner (found)
    #[default]
    Active,
    /// The cat has been reunited
    Found,
    Closed,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Active => write!(f, "active"),
            ReportStatus::Found => write!(f, "found"),
            ReportStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(ReportStatus::Active),
            "found" => Ok(ReportStatus::Found),
            "closed" => Ok(ReportStatus::Closed),
            other => Err(format!(
                "Unknown status '{}'. Expected one of: active, found, closed",
                other
            )),
        }
    }
}

/// Cat gender matching the `cat_gender` database enum
///
/// Older clients send `Male`/`Female`/`Unknown`; both spellings are accepted.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema,
)]
#[cfg_attr(test, derive(Dummy))]
#[sqlx(type_name = "cat_gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CatGender {
    #[serde(alias = "Male")]
    Male,
    #[serde(alias = "Female")]
    Female,
    #[default]
    #[serde(alias = "Unknown")]
    Unknown,
}

impl std::fmt::Display for CatGender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatGender::Male => write!(f, "male"),
            CatGender::Female => write!(f, "female"),
            CatGender::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for CatGender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(CatGender::Male),
            "female" => Ok(CatGender::Female),
            "unknown" => Ok(CatGender::Unknown),
            other => Err(format!(
                "Unknown gender '{}'. Expected one of: male, female, unknown",
                other
            )),
        }
    }
}

/// Database model for a lost/found cat report
#[derive(Debug, Clone, FromRow)]
#[cfg_attr(test, derive(Dummy))]
pub struct Report {
    pub id: Uuid,
    pub name: String,
    pub gender: CatGender,
    /// Free text, conventionally "Hilang" (lost) or "Ditemukan" (found)
    pub report_type: String,
    pub breed: String,
    pub image_urls: Vec<String>,
    pub location_text: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: ReportStatus,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub user_photo_url: Option<String>,
    pub contact_info: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Data for inserting a new report
#[derive(Debug)]
pub struct CreateReport {
    pub name: String,
    pub gender: CatGender,
    pub report_type: String,
    pub breed: String,
    pub image_urls: Vec<String>,
    pub location_text: String,
    pub latitude: f64,
    pub longitude: f64,
    pub user_id: String,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub user_photo_url: Option<String>,
    pub contact_info: Option<String>,
}
