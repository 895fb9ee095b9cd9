//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "Showcase";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory name used under the platform data/config directories.
pub const APP_DIR_NAME: &str = "Showcase";

/// REST API version prefix shared by all backend surfaces.
pub const API_VERSION: &str = "v1";

/// Default API timeout in milliseconds.
pub const DEFAULT_API_TIMEOUT_MS: u64 = 15_000;

/// Default timeout for object uploads in milliseconds.
pub const DEFAULT_UPLOAD_TIMEOUT_MS: u64 = 120_000;

/// Column every listing is ordered by.
pub const CREATED_AT_COLUMN: &str = "created_at";

/// Price label shown when an offering has no price text.
pub const FALLBACK_PRICE_LABEL: &str = "Contact for pricing";

/// Message surfaced for every sign-in failure, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Default collection and bucket names used by the site.
pub mod collections {
    pub const OFFERINGS: &str = "services";
    pub const MEDIA_ITEMS: &str = "gallery";
    pub const CONTACT_MESSAGES: &str = "contacts";
    pub const MEDIA_BUCKET: &str = "images";
}

/// Map a lower-cased file extension to the content type sent with uploads.
pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}
