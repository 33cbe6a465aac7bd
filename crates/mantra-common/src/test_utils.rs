//! Test utilities and shared test helpers for Mantra.
//!
//! Enabled for unit tests and, through the `testing` feature, for the
//! integration tests of the other workspace crates.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Test fixture for creating a mock timestamp.
pub fn mock_timestamp(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .unwrap()
}

/// A fixed instant `seconds` after 2024-01-01T00:00:00Z.
pub fn at_second(seconds: i64) -> DateTime<Utc> {
    mock_timestamp(2024, 1, 1, 0, 0, 0) + chrono::Duration::seconds(seconds)
}

/// Discord-related test utilities.
pub mod discord_fixtures {
    use crate::GuildId;

    /// Create a test guild ID.
    pub fn test_guild_id() -> GuildId {
        GuildId(123_456_789_012_345_678)
    }
}

/// Configuration-related test utilities.
pub mod config_fixtures {
    /// A minimal valid configuration as YAML string.
    pub fn minimal_config_yaml() -> &'static str {
        r#"
discord:
  token: "test_token"
"#
    }

    /// A full configuration as YAML string.
    pub fn full_config_yaml() -> &'static str {
        concat!(
            "discord:\n",
            "  token: \"test_token_full\"\n",
            "  default_prefix: \"!\"\n",
            "  test_guilds: [123456789012345678]\n",
            "\n",
            "database:\n",
            "  url: \"sqlite::memory:\"\n",
            "  max_connections: 1\n",
            "  acquire_timeout_seconds: 5\n",
            "\n",
            "reddit:\n",
            "  base_url: \"https://www.reddit.com\"\n",
            "  user_agent: \"mantra-test/0.1\"\n",
            "  topics: [\"memes\", \"r/Cats\"]\n",
            "  default_topic: \"memes\"\n",
            "  fetch_limit: 25\n",
            "  requests_per_minute: 30\n",
            "\n",
            "ingestion:\n",
            "  refresh_interval_seconds: 300\n",
            "  fetch_timeout_seconds: 10\n",
            "  capacity: 50\n",
            "  backoff_initial_seconds: 5\n",
            "  backoff_max_seconds: 600\n",
            "  backoff_multiplier: 2.0\n",
            "\n",
            "logging:\n",
            "  level: \"debug\"\n",
            "  json: true\n",
        )
    }
}

/// Property-based testing utilities using proptest.
#[cfg(any(test, feature = "proptest"))]
pub mod property_testing {
    use crate::Topic;
    use proptest::prelude::*;

    /// Strategy for generating subreddit-like topics.
    pub fn topic_strategy() -> impl Strategy<Value = Topic> {
        r"[a-z][a-z0-9_]{2,20}".prop_map(Topic::new)
    }
}
