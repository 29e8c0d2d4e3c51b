pub const APP_NAME: &str = "redseed";

/// Base address of the remote target.
pub const URL_ENV: &str = "REDMICA_URL";

/// Admin API key for the remote target.
pub const API_KEY_ENV: &str = "REDMICA_ADMIN_API_KEY";

/// Overrides the default location of the direct data store.
pub const STORE_ENV: &str = "REDSEED_STORE";

pub const DEFAULT_URL: &str = "http://localhost:3000";

/// Header carrying the API key on every remote request.
pub const API_KEY_HEADER: &str = "X-Redmine-API-Key";
