//! Operator name filtering.
//!
//! A stage's structural tag carries an arity prefix and a fusability suffix
//! (`MultiMapFusable`). Name filters compare against the bare operator name.

use once_cell::sync::Lazy;
use regex::Regex;

/// Arity and fusability tokens removed before comparing names.
static DECORATION_TOKENS: Lazy<Regex> = Lazy::new(|| Regex::new("Multi|Single|Fusable").unwrap());

/// Operator name of a tag, e.g. `MultiMapFusable` → `Map`.
pub fn operator_name(tag: &str) -> String {
    DECORATION_TOKENS.replace_all(tag, "").into_owned()
}

/// Case-insensitive equality against the operator name.
pub fn name_matches(tag: &str, name: &str) -> bool {
    operator_name(tag).to_lowercase() == name.to_lowercase()
}

/// Case-insensitive containment within the operator name.
pub fn name_contains(tag: &str, fragment: &str) -> bool {
    operator_name(tag)
        .to_lowercase()
        .contains(&fragment.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefix_and_suffix() {
        assert_eq!(operator_name("MultiMapFusable"), "Map");
        assert_eq!(operator_name("SingleJust"), "Just");
        assert_eq!(operator_name("SwapCache"), "SwapCache");
    }

    #[test]
    fn exact_name_ignores_case() {
        assert!(name_matches("MultiMap", "map"));
        assert!(name_matches("MultiMapFusable", "MAP"));
        assert!(!name_matches("MultiFlatMap", "map"));
        assert!(!name_matches("SwapCache", "map"));
    }

    #[test]
    fn contains_ignores_case() {
        assert!(name_contains("MultiMap", "ap"));
        assert!(name_contains("MultiMapFusable", "AP"));
        assert!(name_contains("SwapCache", "ap"));
        assert!(!name_contains("MultiFilter", "ap"));
    }
}
