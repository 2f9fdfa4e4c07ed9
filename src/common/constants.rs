/// Endpoint and policy constants shared across the crate.
/// These are the defaults; `Config` may override the endpoints and HTTP limits.

// Upstream catalog (Google Fonts helper API)
pub const CATALOG_URL: &str = "https://gwfh.mranftl.com/api/fonts";
pub const DETAIL_BASE_URL: &str = "https://gwfh.mranftl.com/api/fonts";

// Consumer-facing stylesheet link
pub const STYLESHEET_BASE_URL: &str = "https://fonts.googleapis.com/css?family=";

// Local application directories
pub const APP_DIR_NAME: &str = "webfont-dl";
pub const CACHE_FILE_NAME: &str = "cache.json";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOG_DIR_NAME: &str = "logs";

// Cache time-to-live: 24 hours, in milliseconds
pub const CACHE_TTL_MS: i64 = 86_400_000;

// Transport limits
pub const HTTP_TIMEOUT_SECS: u64 = 10;
pub const MAX_REDIRECTS: u8 = 3;
pub const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

// Font file acceptance
pub const MIME_FONT_SFNT: &str = "application/font-sfnt";
pub const MIME_FONT_WOFF2: &str = "font/woff2";
pub const MIME_FONT_WOFF: &str = "font/woff";
pub const ACCEPTED_FONT_MIMES: [&str; 2] = [MIME_FONT_SFNT, MIME_FONT_WOFF2];
pub const ACCEPTED_FONT_EXTENSIONS: [&str; 2] = ["ttf", "woff2"];

/// Message recorded for a staged file that fails validation
pub const CORRUPTED_FILE_MESSAGE: &str = "downloaded file is corrupted";
