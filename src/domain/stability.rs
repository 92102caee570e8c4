//! Version stability classification
//!
//! Decides whether a dependency version looks like a release build or a
//! pre-release/candidate build. Used to gate upgrade suggestions.
//!
//! A version is stable when either:
//! - it contains one of the keywords `RELEASE`, `FINAL` or `GA` (any case), or
//! - it consists only of digits, `,`, `.`, `v` and `-`, optionally ending in `-r`
//!
//! The keyword check wins over the pattern check, so `1.0-alpha-RELEASE`
//! counts as stable.

use regex::Regex;
use std::sync::LazyLock;

const STABLE_KEYWORDS: [&str; 3] = ["RELEASE", "FINAL", "GA"];

static STABLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9,.v-]+(-r)?$").expect("Invalid regex"));

/// Returns true if the version string looks like a release build
pub fn is_stable(version: &str) -> bool {
    let upper = version.to_uppercase();
    let has_keyword = STABLE_KEYWORDS.iter().any(|k| upper.contains(k));

    has_keyword || STABLE_PATTERN.is_match(version)
}

/// Returns true if the version string is a pre-release or candidate build
pub fn is_non_stable(version: &str) -> bool {
    !is_stable(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn numeric_versions_are_stable() {
        assert!(is_stable("2.1.0"));
        assert!(is_stable("2.3.1"));
        assert!(is_stable("2.3.1-r"));
        assert!(is_stable("v1.2"));
        assert!(is_stable("1,2"));
    }

    #[test]
    fn keyword_versions_are_stable() {
        assert!(is_stable("1.0.0.FINAL"));
        assert!(is_stable("5.3.9.RELEASE"));
        assert!(is_stable("1.0.Final"));
        assert!(is_stable("2.0-ga"));
    }

    #[test]
    fn candidate_versions_are_unstable() {
        assert!(!is_stable("1.0-RC1"));
        assert!(!is_stable("2.3.1-rc1"));
        assert!(!is_stable("3.0.0-M2"));
        assert!(!is_stable("1.0.0-SNAPSHOT"));
        assert!(!is_stable("2.0.0-beta"));
    }

    #[test]
    fn empty_version_is_unstable() {
        assert!(!is_stable(""));
        assert!(is_non_stable(""));
    }

    #[test]
    fn keyword_short_circuits_pattern() {
        // Looks like a pre-release but carries a keyword
        assert!(is_stable("1.0-alpha-RELEASE"));
    }

    #[test]
    fn r_suffix_only_at_end() {
        assert!(is_stable("1.0-r"));
        assert!(!is_stable("1.0-r2"));
        assert!(!is_stable("1.0-rx"));
    }

    proptest! {
        #[test]
        fn any_release_keyword_is_stable(
            prefix in "[a-zA-Z0-9.-]{0,8}",
            keyword in prop::sample::select(vec!["RELEASE", "Release", "release", "FINAL", "final", "GA"]),
            suffix in "[a-zA-Z0-9.-]{0,8}",
        ) {
            let version = format!("{}{}{}", prefix, keyword, suffix);
            prop_assert!(is_stable(&version));
        }

        #[test]
        fn numeric_dotted_is_stable(parts in prop::collection::vec(0u32..1000, 1..5)) {
            let version = parts
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(".");
            prop_assert!(is_stable(&version));
        }

        #[test]
        fn non_stable_is_negation(version in ".{0,16}") {
            prop_assert_eq!(is_non_stable(&version), !is_stable(&version));
        }
    }
}
