use eframe::egui;

use super::record::{NodeKind, NodeRecord};
use crate::error::ChainError;

/// Stable handle to a node inside one [`WaypointChain`].
///
/// Ids are never reused by the chain that issued them, though
/// [`WaypointChain::compact`] renumbers them all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub position: egui::Pos2,
    kind: NodeKind,
    previous: Option<NodeId>,
    next: Option<NodeId>,
}

impl Waypoint {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_anchor(&self) -> bool {
        self.kind == NodeKind::Anchor
    }

    pub fn previous(&self) -> Option<NodeId> {
        self.previous
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }
}

/// One segment of the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

/// Doubly-linked run of waypoints from a start anchor to an end anchor.
///
/// Nodes live in an arena; deleted slots become tombstones until the next
/// [`compact`](Self::compact). Clones, undo snapshots included, copy the tombstones too.
#[derive(Clone, Debug, PartialEq)]
pub struct WaypointChain {
    slots: Vec<Option<Waypoint>>,
    start: NodeId,
    end: NodeId,
    live: usize,
}

impl WaypointChain {
    pub fn new(start: egui::Pos2, end: egui::Pos2) -> Self {
        let mut chain = Self {
            slots: Vec::new(),
            start: NodeId(0),
            end: NodeId(0),
            live: 0,
        };
        let s = chain.alloc(start, NodeKind::Anchor);
        let e = chain.alloc(end, NodeKind::Anchor);
        chain.link_to_next(s, e);
        chain.start = s;
        chain.end = e;
        chain
    }

    fn alloc(&mut self, position: egui::Pos2, kind: NodeKind) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Some(Waypoint {
            position,
            kind,
            previous: None,
            next: None,
        }));
        self.live += 1;
        id
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn end(&self) -> NodeId {
        self.end
    }

    /// Number of nodes in the chain, anchors included.
    pub fn node_count(&self) -> usize {
        self.live
    }

    pub fn intermediate_count(&self) -> usize {
        self.live - 2
    }

    /// Dead slots left behind by deletions.
    pub fn tombstones(&self) -> usize {
        self.slots.len() - self.live
    }

    /// Renumbers the live nodes densely, in chain order, once tombstones outnumber them.
    ///
    /// Every id handed out before a successful compaction is invalid afterwards.
    pub fn compact(&mut self) -> bool {
        if self.tombstones() <= self.live {
            return false;
        }
        let order: Vec<NodeId> = self.nodes().collect();
        let last = order.len().saturating_sub(1);
        let slots: Vec<Option<Waypoint>> = order
            .iter()
            .enumerate()
            .filter_map(|(i, id)| {
                self.get(*id).map(|node| {
                    Some(Waypoint {
                        position: node.position,
                        kind: node.kind,
                        previous: i.checked_sub(1).map(|p| NodeId(p as u32)),
                        next: (i < last).then_some(NodeId(i as u32 + 1)),
                    })
                })
            })
            .collect();
        tracing::trace!(tombstones = self.tombstones(), live = self.live, "compacting chain");
        self.start = NodeId(0);
        self.end = NodeId(last as u32);
        self.slots = slots;
        true
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Waypoint> {
        self.slots.get(id.index()).and_then(|s| s.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Waypoint> {
        self.slots.get_mut(id.index()).and_then(|s| s.as_mut())
    }

    pub fn position(&self, id: NodeId) -> Option<egui::Pos2> {
        self.get(id).map(|n| n.position)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(|n| n.kind)
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next)
    }

    pub fn previous(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.previous)
    }

    pub fn translate_node(&mut self, id: NodeId, delta: egui::Vec2) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.position += delta;
                true
            }
            None => false,
        }
    }

    pub fn translate(&mut self, delta: egui::Vec2) {
        for node in self.slots.iter_mut().flatten() {
            node.position += delta;
        }
    }

    /// Makes `next` the successor of `node`. Does nothing if they are the same node.
    ///
    /// Links are set unconditionally; callers keep the chain fully linked.
    pub fn link_to_next(&mut self, node: NodeId, next: NodeId) {
        if node == next || !self.contains(node) || !self.contains(next) {
            return;
        }
        if let Some(n) = self.get_mut(node) {
            n.next = Some(next);
        }
        if let Some(n) = self.get_mut(next) {
            n.previous = Some(node);
        }
    }

    /// Makes `previous` the predecessor of `node`. Does nothing if they are the same node.
    pub fn link_to_previous(&mut self, node: NodeId, previous: NodeId) {
        self.link_to_next(previous, node);
    }

    /// Splices a new intermediate node at `position` between two adjacent nodes.
    pub fn insert_between(
        &mut self,
        position: egui::Pos2,
        previous: NodeId,
        next: NodeId,
    ) -> Option<NodeId> {
        if self.next(previous) != Some(next) {
            tracing::warn!(?previous, ?next, "refusing insert between non-adjacent nodes");
            return None;
        }
        let id = self.alloc(position, NodeKind::Intermediate);
        self.link_to_next(id, next);
        self.link_to_previous(id, previous);
        Some(id)
    }

    /// Unlinks an intermediate node, joining its neighbours directly.
    ///
    /// Anchors go away only with the whole chain, so deleting one is refused.
    pub fn delete(&mut self, id: NodeId) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        if node.is_anchor() {
            tracing::warn!(?id, "refusing to delete an anchor node");
            return false;
        }
        let (previous, next) = (node.previous, node.next);
        if let (Some(p), Some(n)) = (previous, next) {
            self.link_to_next(p, n);
        }
        self.slots[id.index()] = None;
        self.live -= 1;
        true
    }

    pub fn nodes(&self) -> Nodes<'_> {
        Nodes {
            chain: self,
            cursor: Some(self.start),
            remaining: self.live,
        }
    }

    pub fn edges(&self) -> Edges<'_> {
        Edges {
            nodes: self.nodes(),
            previous: None,
        }
    }

    pub fn positions(&self) -> Vec<egui::Pos2> {
        self.nodes().filter_map(|id| self.position(id)).collect()
    }

    pub fn to_record(&self) -> NodeRecord {
        let nodes: Vec<(egui::Pos2, NodeKind)> = self
            .nodes()
            .filter_map(|id| self.get(id).map(|n| (n.position, n.kind)))
            .collect();
        // A chain always holds both anchors, so the record is never empty.
        NodeRecord::from_nodes(&nodes).unwrap_or(NodeRecord {
            x: 0.0,
            y: 0.0,
            next: None,
            next_type: None,
        })
    }

    pub fn from_record(record: &NodeRecord) -> Result<Self, ChainError> {
        let mut chain = Self {
            slots: Vec::new(),
            start: NodeId(0),
            end: NodeId(0),
            live: 0,
        };
        let start = chain.alloc(record.position(), NodeKind::Anchor);
        let mut last = start;
        let mut last_kind = NodeKind::Anchor;
        let mut cursor = record;
        let mut index = 0;
        while let Some(kind) = cursor.next_kind(index)? {
            let Some(next) = cursor.next.as_deref() else {
                break;
            };
            index += 1;
            if kind == NodeKind::Anchor && next.next.is_some() {
                return Err(ChainError::MisplacedTerminal { index });
            }
            let id = chain.alloc(next.position(), kind);
            chain.link_to_next(last, id);
            last = id;
            last_kind = kind;
            cursor = next;
        }
        if last == start {
            return Err(ChainError::MissingEnd);
        }
        if last_kind != NodeKind::Anchor {
            return Err(ChainError::Unterminated { index });
        }
        chain.start = start;
        chain.end = last;
        Ok(chain)
    }
}

/// Nodes from start to end inclusive.
pub struct Nodes<'a> {
    chain: &'a WaypointChain,
    cursor: Option<NodeId>,
    remaining: usize,
}

impl Iterator for Nodes<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.cursor?;
        self.remaining -= 1;
        self.cursor = if id == self.chain.end {
            None
        } else {
            self.chain.next(id)
        };
        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Adjacent node pairs, one per segment.
pub struct Edges<'a> {
    nodes: Nodes<'a>,
    previous: Option<NodeId>,
}

impl Iterator for Edges<'_> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        loop {
            let to = self.nodes.next()?;
            match self.previous.replace(to) {
                Some(from) => return Some(Edge { from, to }),
                None => continue,
            }
        }
    }
}
