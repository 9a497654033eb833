//! Athena Persistence
//!
//! Backends for the [`Persistence`](athena_ports::Persistence) port:
//!
//! - **Memory**: process-local, DashMap backed, the default
//! - **Json**: one pretty-printed JSON file per namespace in a directory
//! - **Redis**: one string key per namespace on a Redis server
//!
//! [`PersistenceFacade`] picks the most durable configured backend.

mod facade;
mod json;
mod memory;
mod redis_store;

pub use facade::PersistenceFacade;
pub use json::{JsonPersistence, JsonStore};
pub use memory::{MemoryPersistence, MemoryStore};
pub use redis_store::{RedisConfig, RedisPersistence, RedisStore};

/// Join namespace segments into a single store key.
///
/// Segments are percent-encoded with `-` escaped as well, so the separator
/// never occurs inside a segment and path separators never reach a file name.
pub(crate) fn namespace_key(namespace: &[&str]) -> String {
    namespace
        .iter()
        .map(|segment| urlencoding::encode(segment).replace('-', "%2D"))
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::namespace_key;

    #[test]
    fn test_plain_segments_are_readable() {
        assert_eq!(namespace_key(&["athena", "telegram", "123"]), "athena-telegram-123");
    }

    #[test]
    fn test_segments_containing_separator_do_not_alias() {
        let first = namespace_key(&["athena", "telegram-1", "x"]);
        let second = namespace_key(&["athena", "telegram", "1-x"]);
        assert_ne!(first, second);
        assert_eq!(first, "athena-telegram%2D1-x");
    }

    #[test]
    fn test_path_characters_are_escaped() {
        let key = namespace_key(&["..", "a/b", "c\\d"]);
        assert!(!key.contains('/'));
        assert!(!key.contains('\\'));
        assert_eq!(key, "..-a%2Fb-c%5Cd");
    }
}
