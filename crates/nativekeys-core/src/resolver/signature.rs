//! Normalization of native signature results

use std::collections::HashMap;

use crate::native::NativeValue;

/// Signing attributes of an installed artifact, attribute name to value
pub type SignatureMap = HashMap<String, String>;

/// Narrow a native signature result to a `SignatureMap`
///
/// - `Null` (the native call produced nothing) → `None`
/// - `Map` → the entries whose key and value are both strings; other entries
///   are dropped, so a map with no string pairs yields an empty map
/// - anything else → `None`
///
/// Later duplicates of a key replace earlier ones.
pub fn normalize_signature(value: NativeValue) -> Option<SignatureMap> {
    match value {
        NativeValue::Map(entries) => Some(
            entries
                .into_iter()
                .filter_map(|entry| match entry {
                    (NativeValue::Str(key), NativeValue::Str(value)) => Some((key, value)),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}
