//! Single-pass duplicate filters.
//!
//! Each call builds a fresh seen-set owned by the returned closure, so two
//! filters never observe each other's keys.

use rustc_hash::FxHashSet;
use std::hash::Hash;

/// Returns a predicate that is `true` the first time a value is seen.
///
/// ```
/// use pkgbuild_core::dedupe::dedupe;
///
/// let unique: Vec<i32> = [1, 2, 3, 1, 2, 3].into_iter().filter(dedupe()).collect();
/// assert_eq!(unique, [1, 2, 3]);
/// ```
pub fn dedupe<T>() -> impl FnMut(&T) -> bool
where
    T: Eq + Hash + Clone,
{
    dedupe_by(T::clone)
}

/// Returns a predicate that is `true` the first time a key is seen, where the
/// key is computed by `key`.
pub fn dedupe_by<T, K, F>(key: F) -> impl FnMut(&T) -> bool
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = FxHashSet::default();
    move |value: &T| seen.insert(key(value))
}
