//! Property-based tests for path manipulation functions.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{
        from_portable, master_copy_name, normalize, relative_path, resolve_from, to_portable,
    };
    use proptest::prelude::*;
    use std::path::{Component, Path, PathBuf};

    fn segment() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_.-]{1,8}".prop_filter("no dot segments", |s| s != "." && s != "..")
    }

    fn segments(max: usize) -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(segment(), 0..max)
    }

    fn absolute(parts: &[String]) -> PathBuf {
        let mut path = PathBuf::from("/");
        path.extend(parts);
        path
    }

    // ============================================================================
    // master_copy_name property tests
    // ============================================================================

    proptest! {
        /// Property: the identifier never contains a path separator
        #[test]
        fn master_copy_name_is_single_entry(module in "[a-z]{1,8}", file in ".*") {
            let name = master_copy_name(&module, &file);
            prop_assert!(!name.contains('/'));
            prop_assert!(!name.contains('\\'));
        }

        /// Property: the identifier is prefixed by the module name
        #[test]
        fn master_copy_name_starts_with_module(module in "[a-z]{1,8}", file in ".*") {
            let name = master_copy_name(&module, &file);
            let prefix = format!("{}__", module);
            prop_assert!(name.starts_with(&prefix));
        }

        /// Property: separators are replaced 1:1, so character counts line up
        #[test]
        fn master_copy_name_preserves_char_count(module in "[a-z]{1,8}", file in ".*") {
            let name = master_copy_name(&module, &file);
            prop_assert_eq!(
                name.chars().count(),
                module.chars().count() + 2 + file.chars().count()
            );
        }
    }

    // ============================================================================
    // normalize / resolve property tests
    // ============================================================================

    proptest! {
        /// Property: normalized absolute paths contain no `.` or `..`
        #[test]
        fn normalize_removes_dot_components(
            parts in prop::collection::vec(
                prop_oneof![segment(), Just(".".to_string()), Just("..".to_string())],
                0..10,
            )
        ) {
            let normalized = normalize(&absolute(&parts));
            for component in normalized.components() {
                prop_assert!(!matches!(component, Component::CurDir | Component::ParentDir));
            }
        }

        /// Property: normalize is idempotent
        #[test]
        fn normalize_is_idempotent(parts in segments(8)) {
            let once = normalize(&absolute(&parts));
            prop_assert_eq!(normalize(&once), once);
        }

        /// Property: resolving an absolute path ignores the base
        #[test]
        fn resolve_from_ignores_base_for_absolute(base in segments(4), parts in segments(6)) {
            let target = absolute(&parts);
            prop_assert_eq!(resolve_from(&absolute(&base), &target), normalize(&target));
        }
    }

    // ============================================================================
    // relative_path / portable form property tests
    // ============================================================================

    proptest! {
        /// Property: joining base and the relative path gets back the target
        #[test]
        fn relative_path_round_trips(base in segments(5), target in segments(5)) {
            let base = absolute(&base);
            let target = absolute(&target);
            let relative = relative_path(&base, &target);
            prop_assert_eq!(normalize(&base.join(&relative)), target);
        }

        /// Property: a descendant's relative path never climbs out
        #[test]
        fn relative_path_of_descendant_has_no_parent_dirs(
            base in segments(4),
            below in segments(4),
        ) {
            let base = absolute(&base);
            let mut target = base.clone();
            target.extend(&below);
            let relative = relative_path(&base, &target);
            prop_assert!(!relative.components().any(|c| c == Component::ParentDir));
        }

        /// Property: portable form uses `/` and converts back unchanged
        #[test]
        fn portable_round_trip(parts in segments(6)) {
            let native: PathBuf = parts.iter().collect();
            let portable = to_portable(&native);
            prop_assert!(!portable.contains('\\'));
            prop_assert_eq!(from_portable(&portable), native);
        }

        /// Property: an absolute path always has a relative form against `/`
        #[test]
        fn relative_to_filesystem_root(parts in segments(6)) {
            let target = absolute(&parts);
            let relative = relative_path(Path::new("/"), &target);
            prop_assert_eq!(relative, parts.iter().collect::<PathBuf>());
        }
    }
}
