//! Property-based tests for object ids and the identity cache.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use gitteh::cache::IdentityCache;
use gitteh::core::types::{Oid, RepositoryId};

/// Strategy for generating 40-character hex strings in mixed case.
fn sha1_hex() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            prop::char::range('0', '9'),
            prop::char::range('a', 'f'),
            prop::char::range('A', 'F'),
        ],
        40,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// One step against the cache: look a key up (and maybe keep the result),
/// or drop every reference we hold for a key.
#[derive(Debug, Clone)]
enum Step {
    Lookup { key: u8, keep: bool },
    Release { key: u8 },
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0u8..6, any::<bool>()).prop_map(|(key, keep)| Step::Lookup { key, keep }),
        (0u8..6).prop_map(|key| Step::Release { key }),
    ]
}

fn key_oid(key: u8) -> Oid {
    Oid::new(format!("{:040x}", key)).unwrap()
}

proptest! {
    #[test]
    fn oid_normalization_is_case_insensitive(hex in sha1_hex()) {
        let mixed = Oid::new(hex.clone()).unwrap();
        let lower = Oid::new(hex.to_ascii_lowercase()).unwrap();
        let upper = Oid::new(hex.to_ascii_uppercase()).unwrap();

        prop_assert_eq!(&mixed, &lower);
        prop_assert_eq!(&mixed, &upper);
        prop_assert_eq!(mixed.as_str(), hex.to_ascii_lowercase());
    }

    #[test]
    fn oid_short_is_a_prefix(hex in sha1_hex(), len in 0usize..64) {
        let oid = Oid::new(hex).unwrap();
        prop_assert!(oid.as_str().starts_with(oid.short(len)));
        prop_assert_eq!(oid.short(len).len(), len.min(40));
    }

    #[test]
    fn wrong_length_is_rejected(len in 0usize..100) {
        prop_assume!(len != 40 && len != 64);
        prop_assert!(Oid::new("a".repeat(len)).is_err());
    }

    #[test]
    fn cache_returns_the_held_instance(steps in prop::collection::vec(step(), 1..60)) {
        let cache: IdentityCache<u8> = IdentityCache::new(RepositoryId::new());
        let mut held: HashMap<u8, Vec<Arc<u8>>> = HashMap::new();

        for step in steps {
            match step {
                Step::Lookup { key, keep } => {
                    let got = cache
                        .get_or_create(&key_oid(key), || Ok::<_, ()>(key))
                        .unwrap();
                    prop_assert_eq!(*got, key);

                    // Anything we still hold for this key must be the same instance.
                    if let Some(existing) = held.get(&key).and_then(|v| v.first()) {
                        prop_assert!(Arc::ptr_eq(existing, &got));
                    }
                    if keep {
                        held.entry(key).or_default().push(got);
                    }
                }
                Step::Release { key } => {
                    held.remove(&key);
                }
            }

            let live = held.values().filter(|v| !v.is_empty()).count();
            prop_assert_eq!(cache.live_count(), live);
        }
    }
}
