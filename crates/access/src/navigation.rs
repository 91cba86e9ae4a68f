//! Navigation catalog and permission-based pruning.
//!
//! The catalog is static configuration: groups → items → optional children,
//! each carrying a [`PermissionSpec`]. Filtering never mutates the catalog; it
//! produces a new, pruned forest in the original order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use backoffice_auth::{PermissionSet, PermissionSpec};
use backoffice_core::{DomainError, NodeId};

/// Top-level menu section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavGroup {
    pub id: NodeId,

    /// Groups without a title render as an unlabeled section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub requires: PermissionSpec,

    pub items: Vec<NavItem>,
}

/// Selectable destination inside a group; may expand into children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub id: NodeId,
    pub label: String,
    pub target: String,

    #[serde(default)]
    pub requires: PermissionSpec,

    /// `None` means "not expandable". Filtering never yields `Some(vec![])`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NavChild>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavChild {
    pub id: NodeId,
    pub label: String,
    pub target: String,

    #[serde(default)]
    pub requires: PermissionSpec,
}

impl NavItem {
    pub fn is_expandable(&self) -> bool {
        self.children.as_ref().is_some_and(|c| !c.is_empty())
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid catalog: {0}")]
    Invalid(#[from] DomainError),
}

/// The full, validated navigation forest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NavigationCatalog {
    groups: Vec<NavGroup>,
}

impl NavigationCatalog {
    /// Build a catalog, rejecting duplicate node ids and blank labels.
    pub fn new(groups: Vec<NavGroup>) -> Result<Self, DomainError> {
        let catalog = Self { groups };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse and validate a JSON array of groups.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let groups: Vec<NavGroup> = serde_json::from_str(json)?;
        Ok(Self::new(groups)?)
    }

    pub fn groups(&self) -> &[NavGroup] {
        &self.groups
    }

    /// The subtree visible to an actor holding `permissions`.
    pub fn visible_to(&self, permissions: &PermissionSet) -> Vec<NavGroup> {
        filter_navigation(&self.groups, permissions)
    }

    fn validate(&self) -> Result<(), DomainError> {
        let mut seen: HashSet<&NodeId> = HashSet::new();

        for group in &self.groups {
            claim(&mut seen, &group.id)?;
            for item in &group.items {
                claim(&mut seen, &item.id)?;
                require_label(&item.id, &item.label)?;
                for child in item.children.iter().flatten() {
                    claim(&mut seen, &child.id)?;
                    require_label(&child.id, &child.label)?;
                }
            }
        }
        Ok(())
    }
}

fn claim<'a>(seen: &mut HashSet<&'a NodeId>, id: &'a NodeId) -> Result<(), DomainError> {
    if seen.insert(id) {
        Ok(())
    } else {
        Err(DomainError::duplicate(format!("navigation node '{id}'")))
    }
}

fn require_label(id: &NodeId, label: &str) -> Result<(), DomainError> {
    if label.trim().is_empty() {
        return Err(DomainError::validation(format!("node '{id}' has no label")));
    }
    Ok(())
}

/// Prune a navigation forest down to what `permissions` may see.
///
/// 1. A group whose own requirement fails is dropped with everything in it.
/// 2. Items whose requirement fails are dropped.
/// 3. Children are filtered likewise; an item left with no children loses its
///    expandable affordance (`children` becomes `None`) but keeps its link.
/// 4. A group left without items is dropped.
///
/// Relative order is preserved and the input is not modified, so filtering an
/// already-filtered forest with the same set returns it unchanged.
pub fn filter_navigation(groups: &[NavGroup], permissions: &PermissionSet) -> Vec<NavGroup> {
    groups
        .iter()
        .filter_map(|group| filter_group(group, permissions))
        .collect()
}

fn filter_group(group: &NavGroup, permissions: &PermissionSet) -> Option<NavGroup> {
    if !permissions.allows(&group.requires) {
        tracing::debug!(group = %group.id, requires = %group.requires, "navigation group hidden");
        return None;
    }

    let items: Vec<NavItem> = group
        .items
        .iter()
        .filter(|item| permissions.allows(&item.requires))
        .map(|item| filter_children(item, permissions))
        .collect();

    if items.is_empty() {
        return None;
    }

    Some(NavGroup {
        id: group.id.clone(),
        title: group.title.clone(),
        requires: group.requires.clone(),
        items,
    })
}

fn filter_children(item: &NavItem, permissions: &PermissionSet) -> NavItem {
    let children = item.children.as_ref().and_then(|children| {
        let kept: Vec<NavChild> = children
            .iter()
            .filter(|child| permissions.allows(&child.requires))
            .cloned()
            .collect();
        (!kept.is_empty()).then_some(kept)
    });

    NavItem {
        id: item.id.clone(),
        label: item.label.clone(),
        target: item.target.clone(),
        requires: item.requires.clone(),
        children,
    }
}
