//! Serde helpers for the field encodings used by DNS-over-HTTPS JSON resolvers.

use serde::{Deserialize, Deserializer};

/// Decodes a field that the resolver may send as `null`, falling back to the zero value.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// TTLs arrive as an integer number of seconds and are kept as a [`Duration`].
///
/// The conversion happens exactly once, here, so a `TTL` of `300` in the body is
/// `Duration::from_secs(300)` in the decoded record.
///
/// [`Duration`]: std::time::Duration
pub(crate) mod ttl {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?.unwrap_or_default();
        Ok(Duration::from_secs(secs))
    }

    pub fn serialize<S>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(ttl.as_secs())
    }
}
