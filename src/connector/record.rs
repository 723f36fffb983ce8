use eframe::egui;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ChainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Chain endpoint, attached to a diagram shape.
    Anchor,
    /// Pure bend point strictly between the anchors.
    Intermediate,
}

impl NodeKind {
    pub fn as_tag(self) -> &'static str {
        match self {
            NodeKind::Anchor => "Termination",
            NodeKind::Intermediate => "Intermediate",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Unrecognised node kind tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownKindTag(pub String);

impl FromStr for NodeKind {
    type Err = UnknownKindTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Termination" => Ok(NodeKind::Anchor),
            "Intermediate" => Ok(NodeKind::Intermediate),
            other => Err(UnknownKindTag(other.to_string())),
        }
    }
}

/// Persisted form of a chain, nested from the start anchor onwards.
///
/// `next_type` names the kind of `next`, so the start node is always an anchor and a
/// record without `next` is the end anchor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub next: Option<Box<NodeRecord>>,
    #[serde(rename = "nextType", default, skip_serializing_if = "Option::is_none")]
    pub next_type: Option<String>,
}

impl Drop for NodeRecord {
    // Unlink iteratively; the default drop recurses once per node.
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

impl NodeRecord {
    pub fn position(&self) -> egui::Pos2 {
        egui::pos2(self.x, self.y)
    }

    /// Kind of the next node, if there is one.
    pub(crate) fn next_kind(&self, index: usize) -> Result<Option<NodeKind>, ChainError> {
        if self.next.is_none() {
            return Ok(None);
        }
        let Some(tag) = self.next_type.as_deref() else {
            return Err(ChainError::MissingKind { index });
        };
        tag.parse::<NodeKind>()
            .map(Some)
            .map_err(|UnknownKindTag(tag)| ChainError::UnknownKind { index, tag })
    }

    /// Builds the nested record from nodes in chain order.
    ///
    /// Built back to front so nesting depth never costs stack.
    pub(crate) fn from_nodes(nodes: &[(egui::Pos2, NodeKind)]) -> Option<Self> {
        let mut tail: Option<(Box<NodeRecord>, NodeKind)> = None;
        for &(pos, kind) in nodes.iter().rev() {
            let (next, next_type) = match tail.take() {
                Some((record, next_kind)) => (Some(record), Some(next_kind.as_tag().to_string())),
                None => (None, None),
            };
            let record = Box::new(NodeRecord {
                x: pos.x,
                y: pos.y,
                next,
                next_type,
            });
            tail = Some((record, kind));
        }
        tail.map(|(record, _)| *record)
    }
}
