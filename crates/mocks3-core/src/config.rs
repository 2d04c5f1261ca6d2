//! Service configuration.
//!
//! [`MockS3Config`] is built once at startup, usually from the environment,
//! and handed by reference to the router, dispatcher and store.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// MockS3 configuration.
///
/// # Examples
///
/// ```
/// use mocks3_core::config::MockS3Config;
///
/// let config = MockS3Config::default();
/// assert_eq!(config.gateway_listen, "0.0.0.0:4567");
/// assert!(config.auto_create_buckets);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct MockS3Config {
    /// Bind address (e.g. `"0.0.0.0:4567"`).
    #[builder(default = String::from("0.0.0.0:4567"))]
    pub gateway_listen: String,

    /// The service's own hostname. Requests addressed to it, `localhost`,
    /// `s3.amazonaws.com` or `s3.localhost` use path-style addressing; any
    /// other host is treated as `<bucket>.<domain>`.
    #[builder(default = String::from("s3.amazonaws.com"))]
    pub hostname: String,

    /// Create the destination bucket on PUT/copy when it does not exist.
    #[builder(default = true)]
    pub auto_create_buckets: bool,

    /// Object bodies larger than this many bytes are spilled to disk.
    #[builder(default = 524_288)]
    pub max_memory_object_size: usize,

    /// Directory for spilled object bodies.
    #[builder(default = default_data_dir())]
    pub data_dir: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for MockS3Config {
    fn default() -> Self {
        Self {
            gateway_listen: String::from("0.0.0.0:4567"),
            hostname: String::from("s3.amazonaws.com"),
            auto_create_buckets: true,
            max_memory_object_size: 524_288,
            data_dir: default_data_dir(),
            log_level: String::from("info"),
        }
    }
}

impl MockS3Config {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GATEWAY_LISTEN` | `0.0.0.0:4567` |
    /// | `S3_HOSTNAME` | `s3.amazonaws.com` |
    /// | `S3_AUTO_CREATE_BUCKETS` | `true` |
    /// | `S3_MAX_MEMORY_OBJECT_SIZE` | `524288` |
    /// | `DATA_DIR` | OS temp dir |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Ok(v) = std::env::var("S3_HOSTNAME") {
            if !v.trim().is_empty() {
                config.hostname = v.trim().to_ascii_lowercase();
            }
        }
        if let Ok(v) = std::env::var("S3_AUTO_CREATE_BUCKETS") {
            config.auto_create_buckets = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("S3_MAX_MEMORY_OBJECT_SIZE") {
            if let Ok(n) = v.parse::<usize>() {
                config.max_memory_object_size = n;
            }
        }
        if let Ok(v) = std::env::var("DATA_DIR") {
            config.data_dir = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }
}

fn default_data_dir() -> String {
    std::env::temp_dir().to_string_lossy().into_owned()
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
