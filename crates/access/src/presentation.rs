//! Render-time metadata for navigation nodes, kept apart from the
//! permission-bearing tree.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use backoffice_core::NodeId;

/// How a node looks. Nothing here influences visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

/// Node id → presentation, resolved only when rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresentationMap {
    entries: HashMap<NodeId, Presentation>,
}

static PLAIN: Presentation = Presentation {
    icon: None,
    badge: None,
    tooltip: None,
};

impl PresentationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn insert(&mut self, id: NodeId, presentation: Presentation) -> Option<Presentation> {
        self.entries.insert(id, presentation)
    }

    /// Presentation for a node; unknown ids render plain.
    pub fn resolve(&self, id: &NodeId) -> &Presentation {
        self.entries.get(id).unwrap_or(&PLAIN)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
