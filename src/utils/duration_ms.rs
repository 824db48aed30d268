//! Serialise a `Duration` as whole milliseconds, matching the `*_ms` keys
//! accepted by the config loader.

use std::time::Duration;

use serde::Serializer;

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    serializer.serialize_u64(millis)
}
