use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::UpdateProfileDto;
use crate::features::users::models::UserProfile;

const PROFILE_COLUMNS: &str =
    "uid, email, display_name, photo_url, contact_info, bio, created_at, updated_at";

/// Service for locally stored user profiles
pub struct UserProfileService {
    pool: PgPool,
}

impl UserProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the caller's profile, creating it from the token claims on first access
    ///
    /// Email and photo follow the identity provider on every call; the display
    /// name is only seeded once.
    pub async fn get_or_create(&self, user: &AuthenticatedUser) -> Result<UserProfile> {
        let sql = format!(
            r#"
            INSERT INTO user_profiles (uid, email, display_name, photo_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (uid) DO UPDATE
            SET email = COALESCE(EXCLUDED.email, user_profiles.email),
                photo_url = COALESCE(EXCLUDED.photo_url, user_profiles.photo_url)
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(&user.sub)
            .bind(&user.email)
            .bind(user.display_name())
            .bind(&user.picture)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load profile for {}: {:?}", user.sub, e);
                AppError::Database(e)
            })
    }

    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        dto: &UpdateProfileDto,
    ) -> Result<UserProfile> {
        // Make sure the row exists before patching it
        self.get_or_create(user).await?;

        let sql = format!(
            r#"
            UPDATE user_profiles
            SET display_name = COALESCE($2, display_name),
                contact_info = CASE WHEN $3::TEXT IS NULL THEN contact_info
                                    ELSE NULLIF($3, '') END,
                bio = CASE WHEN $4::TEXT IS NULL THEN bio ELSE NULLIF($4, '') END,
                updated_at = NOW()
            WHERE uid = $1
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );

        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(&user.sub)
            .bind(&dto.display_name)
            .bind(&dto.contact_info)
            .bind(&dto.bio)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update profile for {}: {:?}", user.sub, e);
                AppError::Database(e)
            })?;

        tracing::info!("Updated profile for {}", user.sub);
        Ok(profile)
    }
}
