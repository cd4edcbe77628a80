//! Identity key determinism and synthetic path round trips

use proptest::prelude::*;
use reqctx::identity::{
    build_synthetic_path, compute_hash, compute_key, is_synthetic_path, strip_synthetic_path,
    HASH_LEN,
};
use reqctx::{ContextCriteria, ContextFilter, ContextMode};

fn mode_strategy() -> impl Strategy<Value = ContextMode> {
    prop_oneof![
        Just(ContextMode::Sync),
        Just(ContextMode::Eager),
        Just(ContextMode::Lazy),
        Just(ContextMode::LazyOnce),
    ]
}

fn criteria_strategy() -> impl Strategy<Value = ContextCriteria> {
    (
        prop::collection::vec("[a-z0-9_]{1,8}", 1..4),
        any::<bool>(),
        "[a-z.*$^]{0,8}",
        "[gimsuy]{0,3}",
        mode_strategy(),
    )
        .prop_map(|(segments, recursive, pattern, flags, mode)| {
            let root = format!("/{}", segments.join("/"));
            ContextCriteria::new(root, recursive, ContextFilter::new(pattern, flags), mode)
                .expect("generated roots are absolute")
        })
}

/// Same criteria always produce the same key and hash
#[test]
fn test_identity_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&criteria_strategy(), |criteria| {
            // regex-invalid generated patterns are out of scope here
            let Ok(key1) = compute_key(&criteria) else {
                return Ok(());
            };
            let key2 = compute_key(&criteria.clone()).unwrap();
            prop_assert_eq!(&key1, &key2);

            let hash = compute_hash(&key1);
            prop_assert_eq!(hash.len(), HASH_LEN * 2);
            prop_assert_eq!(hash, compute_hash(&key2));
            Ok(())
        })
        .unwrap();
}

/// Criteria differing in any field produce different keys
#[test]
fn test_identity_sensitivity_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(criteria_strategy(), criteria_strategy()), |(a, b)| {
            let (Ok(key_a), Ok(key_b)) = (compute_key(&a), compute_key(&b)) else {
                return Ok(());
            };
            let same_filter = a.filter.canonical().ok() == b.filter.canonical().ok();
            let same = a.root == b.root && a.recursive == b.recursive && a.mode == b.mode && same_filter;
            prop_assert_eq!(key_a == key_b, same);
            Ok(())
        })
        .unwrap();
}

proptest! {
    /// Stripping a synthetic path recovers the directory it was built from
    #[test]
    fn synthetic_path_round_trip(criteria in criteria_strategy()) {
        let dir = criteria.root.to_string_lossy().into_owned();
        if let Ok(synthetic) = build_synthetic_path(&dir, &criteria) {
            prop_assert!(is_synthetic_path(&synthetic));
            prop_assert_eq!(strip_synthetic_path(&synthetic), dir.as_str());
        }
    }
}
