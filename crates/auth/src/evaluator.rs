//! Pure permission predicates.
//!
//! - No IO
//! - No panics
//! - Total over every input, including empty sets and empty name lists

use crate::{ALL, PermissionSet};

/// True if `name` is the `"all"` sentinel or is granted.
pub fn has(set: &PermissionSet, name: &str) -> bool {
    name == ALL || set.contains(name)
}

/// True if there is no restriction (`None` or empty), if `names` contains the
/// `"all"` sentinel, or if at least one name is granted.
pub fn has_any<P: AsRef<str>>(set: &PermissionSet, names: Option<&[P]>) -> bool {
    let Some(names) = names else {
        return true;
    };
    if names.is_empty() {
        return true;
    }
    names.iter().any(|n| {
        let n = n.as_ref();
        n == ALL || set.contains(n)
    })
}

/// True only if every name is granted.
///
/// Unlike [`has`] and [`has_any`], the `"all"` sentinel gets no special
/// treatment here: requiring `["all", "x"]` needs a literal `"all"` grant.
/// An empty list is vacuously satisfied.
pub fn has_all<P: AsRef<str>>(set: &PermissionSet, names: &[P]) -> bool {
    names.iter().all(|n| set.contains(n.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(names: &[&'static str]) -> PermissionSet {
        PermissionSet::from_names(names.iter().copied())
    }

    #[test]
    fn has_grants_sentinel_on_empty_set() {
        assert!(has(&PermissionSet::empty(), "all"));
        assert!(!has(&PermissionSet::empty(), "inventario.crear"));
    }

    #[test]
    fn has_checks_membership() {
        let s = set(&["inventario.crear"]);
        assert!(has(&s, "inventario.crear"));
        assert!(!has(&s, "inventario.eliminar"));
    }

    #[test]
    fn granted_all_is_not_a_wildcard_for_has() {
        let s = set(&["all"]);
        assert!(!has(&s, "compras.ver"));
    }

    #[test]
    fn has_any_treats_missing_and_empty_as_unrestricted() {
        let s = PermissionSet::empty();
        assert!(has_any::<&str>(&s, None));
        assert!(has_any::<&str>(&s, Some(&[][..])));
    }

    #[test]
    fn has_any_needs_one_match() {
        let s = set(&["b"]);
        assert!(has_any(&s, Some(&["a", "b"][..])));
        assert!(!has_any(&s, Some(&["a", "c"][..])));
    }

    #[test]
    fn has_all_does_not_unwind_sentinel() {
        let s = set(&["x"]);
        assert!(!has_all(&s, &["all", "x"]));
        let s = set(&["all", "x"]);
        assert!(has_all(&s, &["all", "x"]));
    }

    #[test]
    fn has_all_is_vacuous_on_empty() {
        assert!(has_all::<&str>(&PermissionSet::empty(), &[]));
    }

    fn perm_name() -> impl Strategy<Value = String> {
        "[a-z]{1,6}\\.[a-z]{1,6}"
    }

    proptest! {
        #[test]
        fn sentinel_always_granted(granted in prop::collection::vec(perm_name(), 0..8)) {
            let s = PermissionSet::from_names(granted);
            prop_assert!(has(&s, "all"));
        }

        #[test]
        fn any_with_sentinel_always_granted(
            granted in prop::collection::vec(perm_name(), 0..8),
            mut required in prop::collection::vec(perm_name(), 0..8),
            at in 0usize..8,
        ) {
            let s = PermissionSet::from_names(granted);
            let at = at.min(required.len());
            required.insert(at, "all".to_string());
            prop_assert!(has_any(&s, Some(required.as_slice())));
        }

        #[test]
        fn all_matches_membership(
            granted in prop::collection::vec(perm_name(), 0..8),
            required in prop::collection::vec(perm_name(), 0..8),
        ) {
            let s = PermissionSet::from_names(granted.clone());
            let expected = required.iter().all(|r| granted.contains(r));
            prop_assert_eq!(has_all(&s, &required), expected);
        }
    }
}
