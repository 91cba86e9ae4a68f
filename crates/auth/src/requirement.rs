//! Declarative permission requirement attached to navigation nodes and gates.

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::Permission;

/// Requirement carried by a node: none, any-of a set, or all-of a set.
///
/// `Unrestricted` is explicit so "intentionally public" is never confused
/// with "forgot to declare a requirement". An `AnyOf` with an empty list is
/// still satisfied by everyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PermissionSpec {
    #[default]
    Unrestricted,
    AnyOf(Vec<Permission>),
    AllOf(Vec<Permission>),
}

impl PermissionSpec {
    pub fn any_of<I, P>(names: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        Self::AnyOf(names.into_iter().map(Into::into).collect())
    }

    pub fn all_of<I, P>(names: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        Self::AllOf(names.into_iter().map(Into::into).collect())
    }

    pub fn single(name: impl Into<Permission>) -> Self {
        Self::AnyOf(vec![name.into()])
    }

    /// The permission names mentioned, in declaration order.
    pub fn names(&self) -> &[Permission] {
        match self {
            Self::Unrestricted => &[],
            Self::AnyOf(names) | Self::AllOf(names) => names,
        }
    }
}

impl core::fmt::Display for PermissionSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let join = |names: &[Permission]| {
            names
                .iter()
                .map(Permission::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            Self::Unrestricted => f.write_str("unrestricted"),
            Self::AnyOf(names) => write!(f, "any of [{}]", join(names)),
            Self::AllOf(names) => write!(f, "all of [{}]", join(names)),
        }
    }
}

/// Accepted config forms:
///
/// - `null` → unrestricted
/// - `"perm"` → any of `[perm]`
/// - `["a", "b"]` → any of `[a, b]`
/// - `{"any": [...]}` / `{"all": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSpec {
    Single(Permission),
    List(Vec<Permission>),
    Any { any: Vec<Permission> },
    All { all: Vec<Permission> },
}

impl<'de> Deserialize<'de> for PermissionSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawSpec>::deserialize(deserializer)?;
        Ok(match raw {
            None => Self::Unrestricted,
            Some(RawSpec::Single(p)) => Self::AnyOf(vec![p]),
            Some(RawSpec::List(names)) | Some(RawSpec::Any { any: names }) => Self::AnyOf(names),
            Some(RawSpec::All { all }) => Self::AllOf(all),
        })
    }
}

impl Serialize for PermissionSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unrestricted => serializer.serialize_none(),
            Self::AnyOf(names) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("any", names)?;
                map.end()
            }
            Self::AllOf(names) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("all", names)?;
                map.end()
            }
        }
    }
}
