//! Local user profiles.
//!
//! A profile row is created from the token claims the first time a user opens
//! their profile and can then be edited.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/users/me` | Get (and lazily create) the profile |
//! | PATCH | `/api/users/me` | Update display name, contact info, bio |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::UserProfileService;
