//! Cache key construction.

/// Separator placed between key parts.
pub const KEY_SEPARATOR: char = ':';

/// Joins ordered parts into a cache key, e.g. `["classifiers", "list", "1", "20"]`
/// becomes `classifiers:list:1:20`.
///
/// The same parts in the same order always produce the same key.
pub fn make_cache_key<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut key = String::with_capacity(64);
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(part.as_ref());
    }
    key
}
