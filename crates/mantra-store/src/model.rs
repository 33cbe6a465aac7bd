//! Persisted guild record.

use mantra_common::GuildId;
use serde::{Deserialize, Serialize};

/// Configuration persisted for a single guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildConfig {
    /// Guild the record belongs to.
    pub id: GuildId,
    /// Command prefix used in that guild.
    pub prefix: String,
}

impl GuildConfig {
    /// Creates a guild record.
    pub fn new(id: GuildId, prefix: impl Into<String>) -> Self {
        Self {
            id,
            prefix: prefix.into(),
        }
    }
}
