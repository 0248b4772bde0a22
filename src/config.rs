//! Fixed configuration values that are not tunable at runtime.

use std::time::Duration;

/// The default port the server listens on.
pub const DEFAULT_PORT: u16 = 9000;

/// The default canonical timezone name used to decide calendar days.
pub const DEFAULT_TIMEZONE: &str = "Etc/UTC";

/// The origin allowed to make cross-origin requests when none are configured.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// The base URL of the identity provider's backend API.
pub const DEFAULT_IDENTITY_PROVIDER_URL: &str = "https://api.clerk.com/v1";

/// How long a store operation waits on a locked database before giving up.
pub const DB_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The total time allowed for a single request to the identity provider.
pub const IDENTITY_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// The time allowed for establishing a connection to the identity provider.
pub const IDENTITY_PROVIDER_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// The bcrypt cost used for the local copy of a user's password.
pub const PASSWORD_HASH_COST: u32 = 10;
