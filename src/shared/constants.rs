/// Maximum photos attached to a single report
pub const MAX_REPORT_IMAGES: usize = 5;

/// Maximum size of a single uploaded photo (5MB)
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// Accepted photo MIME types
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Maximum length of a comment body
pub const MAX_COMMENT_LENGTH: u64 = 500;

/// Storage folder for report photos
pub const REPORT_IMAGE_FOLDER: &str = "cats";

/// Conventional report types shown in the UI
pub const REPORT_TYPE_LOST: &str = "Hilang";
pub const REPORT_TYPE_FOUND: &str = "Ditemukan";
