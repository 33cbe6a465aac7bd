//! Tests for the core type definitions in mantra-common.
//!
//! This test suite covers:
//! - Newtype wrappers implementing expected traits (Display, Hash, Serialize, Deserialize)
//! - Topic normalization surviving serialization
//! - Error conversions

use std::collections::HashMap;
use mantra_common::{GuildId, MantraError, Topic};

#[test]
fn test_guild_id_implements_expected_traits() {
    let guild_id = GuildId(123_456_789);

    assert_eq!(format!("{guild_id:?}"), "GuildId(123456789)");
    assert_eq!(guild_id.to_string(), "123456789");

    let mut map = HashMap::new();
    map.insert(guild_id, "test_guild");
    assert_eq!(map.get(&GuildId(123_456_789)), Some(&"test_guild"));
}

#[test]
fn test_guild_id_serialization() {
    let serialized = serde_json::to_string(&GuildId(42)).unwrap();
    assert_eq!(serialized, "42");

    let deserialized: GuildId = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized, GuildId(42));
}

#[test]
fn test_topic_deserialization_normalizes() {
    let topic: Topic = serde_json::from_str("\"r/AwwNice\"").unwrap();
    assert_eq!(topic.as_str(), "awwnice");
    assert_eq!(serde_json::to_string(&topic).unwrap(), "\"awwnice\"");

    let topics: Vec<Topic> = serde_yaml::from_str("[memes, r/Cats]").unwrap();
    assert_eq!(topics, vec![Topic::new("memes"), Topic::new("cats")]);
}

#[test]
fn test_topics_share_hash_after_normalization() {
    let mut map = HashMap::new();
    map.insert(Topic::new("r/Cats"), 1);
    assert_eq!(map.get(&Topic::new("cats")), Some(&1));
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: MantraError = io.into();
    assert!(matches!(err, MantraError::Io(_)));
    assert!(err.to_string().starts_with("I/O error"));
}
