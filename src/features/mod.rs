pub mod auth;
pub mod breeds;
pub mod comments;
pub mod geocoding;
pub mod reports;
pub mod users;
