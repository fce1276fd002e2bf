//! Property tests for lexical path normalization.

use std::path::{Component, Path, PathBuf};

use proptest::prelude::*;

use kiln::paths::{absolutize, normalize};

fn path_string() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        Just(".".to_string()),
        Just("..".to_string()),
        proptest::string::string_regex("[A-Za-z0-9._-]{1,12}").unwrap(),
    ];
    proptest::collection::vec(segment, 0..=8).prop_map(|segments| segments.join("/"))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Normalization never panics on arbitrary input.
    #[test]
    fn property_normalize_never_panics(s in "(?s).{0,256}") {
        let _ = normalize(Path::new(&s));
    }

    /// PROPERTY: Normalization is idempotent.
    #[test]
    fn property_normalize_is_idempotent(s in path_string()) {
        let once = normalize(Path::new(&s));
        prop_assert_eq!(normalize(&once), once.clone());
    }

    /// PROPERTY: Absolute inputs stay absolute and lose every `.`/`..`
    /// component (parents above the root saturate).
    #[test]
    fn property_normalized_absolute_paths_are_clean(s in path_string()) {
        let absolute = PathBuf::from(format!("/{}", s));
        let normalized = normalize(&absolute);

        prop_assert!(normalized.is_absolute());
        for component in normalized.components() {
            prop_assert!(!matches!(
                component,
                Component::CurDir | Component::ParentDir
            ));
        }
    }

    /// PROPERTY: Absolutizing against an absolute base yields an absolute
    /// path, whatever the input.
    #[test]
    fn property_absolutize_returns_absolute(s in path_string()) {
        let resolved = absolutize(Path::new("/srv/styles"), Path::new(&s));
        prop_assert!(resolved.is_absolute());
    }

    /// PROPERTY: An already-absolute path ignores the base entirely.
    #[test]
    fn property_absolutize_ignores_base_for_absolute_input(s in path_string()) {
        let absolute = PathBuf::from(format!("/{}", s));
        let via_one = absolutize(Path::new("/srv/a"), &absolute);
        let via_two = absolutize(Path::new("/srv/b"), &absolute);
        prop_assert_eq!(via_one, via_two);
    }
}
