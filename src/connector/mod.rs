//! Polyline associations between class boxes.

use eframe::egui;
use serde::{Deserialize, Serialize};

use crate::error::ChainError;
use crate::geometry::{SegmentProjection, nearest_point_on_segment, rect_around, segment_length};
use crate::render::Surface;
use crate::undo::UndoSink;

pub mod chain;
pub mod record;

pub use chain::{Edge, NodeId, Waypoint, WaypointChain};
pub use record::{NodeKind, NodeRecord};

/// Radius around a node inside which the pointer touches it.
pub const NODE_TOUCH_RADIUS: f32 = 15.0;

/// Glyph radius of a selected node. Unselected nodes draw as a 1-unit dot.
pub const NODE_NORMAL_RADIUS: f32 = 5.0;

/// An edge closer than this to the pointer can grow a new bend point.
pub const MIN_NODE_CREATE_DISTANCE: f32 = 25.0;

/// A bend point dropped closer than this to a neighbour is merged away.
pub const NODE_MERGE_DISTANCE: f32 = 5.0;

/// Horizontal offset of each anchor from the drop point of a new association.
pub const ANCHOR_HALF_SPAN: f32 = 50.0;

const LABEL_TEXT_SIZE: f32 = 12.0;
const LABEL_OFFSET: f32 = 12.0;

const DEBUG_BOUNDS_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(128, 0, 0, 128);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnchorEnd {
    Start,
    End,
}

/// Role name and multiplicity written at one end of an association.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndLabel {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub multiplicity: String,
}

impl EndLabel {
    pub fn is_empty(&self) -> bool {
        self.role.is_empty() && self.multiplicity.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
    chain: WaypointChain,
    start_attachment: Option<u64>,
    end_attachment: Option<u64>,
    start_label: EndLabel,
    end_label: EndLabel,
}

/// Persisted form of an association.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorRecord {
    pub node_data: NodeRecord,
    #[serde(default)]
    pub start_class: Option<u64>,
    #[serde(default)]
    pub end_class: Option<u64>,
    #[serde(default, skip_serializing_if = "EndLabel::is_empty")]
    pub start_label: EndLabel,
    #[serde(default, skip_serializing_if = "EndLabel::is_empty")]
    pub end_label: EndLabel,
}

impl Connector {
    pub fn new(center: egui::Pos2) -> Self {
        let span = egui::vec2(ANCHOR_HALF_SPAN, 0.0);
        Self {
            chain: WaypointChain::new(center - span, center + span),
            start_attachment: None,
            end_attachment: None,
            start_label: EndLabel::default(),
            end_label: EndLabel::default(),
        }
    }

    pub fn chain(&self) -> &WaypointChain {
        &self.chain
    }

    pub fn anchor(&self, end: AnchorEnd) -> NodeId {
        match end {
            AnchorEnd::Start => self.chain.start(),
            AnchorEnd::End => self.chain.end(),
        }
    }

    pub fn anchor_end(&self, node: NodeId) -> Option<AnchorEnd> {
        if node == self.chain.start() {
            Some(AnchorEnd::Start)
        } else if node == self.chain.end() {
            Some(AnchorEnd::End)
        } else {
            None
        }
    }

    pub fn attachment(&self, end: AnchorEnd) -> Option<u64> {
        match end {
            AnchorEnd::Start => self.start_attachment,
            AnchorEnd::End => self.end_attachment,
        }
    }

    pub fn set_attachment(&mut self, end: AnchorEnd, class_id: Option<u64>) {
        let slot = match end {
            AnchorEnd::Start => &mut self.start_attachment,
            AnchorEnd::End => &mut self.end_attachment,
        };
        if *slot != class_id {
            tracing::debug!(?end, from = ?*slot, to = ?class_id, "anchor attachment changed");
            *slot = class_id;
        }
    }

    pub fn label(&self, end: AnchorEnd) -> &EndLabel {
        match end {
            AnchorEnd::Start => &self.start_label,
            AnchorEnd::End => &self.end_label,
        }
    }

    pub fn label_mut(&mut self, end: AnchorEnd) -> &mut EndLabel {
        match end {
            AnchorEnd::Start => &mut self.start_label,
            AnchorEnd::End => &mut self.end_label,
        }
    }

    /// Anchors attached to `class_id`.
    pub fn anchors_attached_to(&self, class_id: u64) -> Vec<NodeId> {
        [AnchorEnd::Start, AnchorEnd::End]
            .into_iter()
            .filter(|end| self.attachment(*end) == Some(class_id))
            .map(|end| self.anchor(end))
            .collect()
    }

    pub fn detach_class(&mut self, class_id: u64) {
        for end in [AnchorEnd::Start, AnchorEnd::End] {
            if self.attachment(end) == Some(class_id) {
                self.set_attachment(end, None);
            }
        }
    }

    pub fn bounds(&self) -> egui::Rect {
        self.chain
            .nodes()
            .filter_map(|id| self.chain.position(id))
            .map(|p| rect_around(p, NODE_TOUCH_RADIUS))
            .fold(egui::Rect::NOTHING, |acc, r| acc.union(r))
    }

    /// First node, in chain order, within touch range of `at`.
    pub fn touch_node(&self, at: egui::Pos2) -> Option<NodeId> {
        self.chain.nodes().find(|&id| {
            self.chain
                .position(id)
                .is_some_and(|p| p.distance(at) <= NODE_TOUCH_RADIUS)
        })
    }

    /// Resolves a pointer press to a node, synthesizing a bend point on a nearby edge
    /// when no existing node is in range.
    pub fn hit_test(&mut self, at: egui::Pos2, undo: &mut dyn UndoSink) -> Option<NodeId> {
        if !self.bounds().contains(at) {
            return None;
        }
        if let Some(id) = self.touch_node(at) {
            return Some(id);
        }
        self.create_node_near(at, undo)
    }

    /// The edge nearest to `near` among those under the creation threshold.
    pub fn nearest_edge(&self, near: egui::Pos2) -> Option<(Edge, SegmentProjection)> {
        let mut best: Option<(Edge, SegmentProjection)> = None;
        for edge in self.chain.edges() {
            let (Some(a), Some(b)) = (self.chain.position(edge.from), self.chain.position(edge.to))
            else {
                continue;
            };
            let projection = nearest_point_on_segment(a, b, near);
            if projection.distance < MIN_NODE_CREATE_DISTANCE
                && best.is_none_or(|(_, p)| projection.distance < p.distance)
            {
                best = Some((edge, projection));
            }
        }
        best
    }

    pub fn create_node_near(&mut self, near: egui::Pos2, undo: &mut dyn UndoSink) -> Option<NodeId> {
        let (edge, projection) = self.nearest_edge(near)?;
        undo.request_checkpoint();
        let id = self
            .chain
            .insert_between(projection.position, edge.from, edge.to)?;
        tracing::debug!(
            ?id,
            x = projection.position.x,
            y = projection.position.y,
            "bend point created"
        );
        Some(id)
    }

    /// See [`WaypointChain::compact`].
    pub fn compact(&mut self) -> bool {
        self.chain.compact()
    }

    pub fn move_node(&mut self, node: NodeId, delta: egui::Vec2) -> bool {
        self.chain.translate_node(node, delta)
    }

    pub fn translate(&mut self, delta: egui::Vec2) {
        self.chain.translate(delta);
    }

    /// Merges a dropped bend point into its neighbour when it lands on top of it.
    pub fn release_node(&mut self, node: NodeId) -> bool {
        let Some(waypoint) = self.chain.get(node) else {
            return false;
        };
        if waypoint.is_anchor() {
            return false;
        }
        let at = waypoint.position;
        let lands_on = |other: Option<NodeId>| {
            other
                .and_then(|o| self.chain.position(o))
                .is_some_and(|p| p.distance(at) < NODE_MERGE_DISTANCE)
        };
        if lands_on(waypoint.next()) || lands_on(waypoint.previous()) {
            tracing::debug!(?node, "bend point merged into neighbour");
            return self.chain.delete(node);
        }
        false
    }

    pub fn delete_node(&mut self, node: NodeId, undo: &mut dyn UndoSink) -> bool {
        if self.chain.kind(node) != Some(NodeKind::Intermediate) {
            return false;
        }
        undo.request_checkpoint();
        self.chain.delete(node)
    }

    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        stroke: egui::Stroke,
        is_selected: &dyn Fn(NodeId) -> bool,
        show_touch_bounds: bool,
    ) {
        let start = self.chain.start();
        self.draw_node(surface, start, stroke.color, is_selected(start), show_touch_bounds);
        for edge in self.chain.edges() {
            if let (Some(a), Some(b)) = (self.chain.position(edge.from), self.chain.position(edge.to))
            {
                surface.line(a, b, stroke);
            }
            self.draw_node(surface, edge.to, stroke.color, is_selected(edge.to), show_touch_bounds);
        }
        for end in [AnchorEnd::Start, AnchorEnd::End] {
            self.draw_label(surface, end, stroke.color);
        }
    }

    /// Role above and multiplicity below the anchor, nudged along its edge.
    fn draw_label(&self, surface: &mut dyn Surface, end: AnchorEnd, color: egui::Color32) {
        let label = self.label(end);
        if label.is_empty() {
            return;
        }
        let anchor = self.anchor(end);
        let neighbour = match end {
            AnchorEnd::Start => self.chain.next(anchor),
            AnchorEnd::End => self.chain.previous(anchor),
        };
        let (Some(p), Some(q)) = (
            self.chain.position(anchor),
            neighbour.and_then(|n| self.chain.position(n)),
        ) else {
            return;
        };
        let length = segment_length(p, q);
        let dir = if length > 0.0 {
            (q - p) / length
        } else {
            egui::Vec2::X
        };
        let base = p + dir * LABEL_OFFSET;
        if !label.role.is_empty() {
            let at = base - egui::vec2(0.0, LABEL_TEXT_SIZE + 4.0);
            surface.text(at, &label.role, LABEL_TEXT_SIZE, color);
        }
        if !label.multiplicity.is_empty() {
            let at = base + egui::vec2(0.0, 4.0);
            surface.text(at, &label.multiplicity, LABEL_TEXT_SIZE, color);
        }
    }

    fn draw_node(
        &self,
        surface: &mut dyn Surface,
        node: NodeId,
        color: egui::Color32,
        selected: bool,
        show_touch_bounds: bool,
    ) {
        let Some(p) = self.chain.position(node) else {
            return;
        };
        let radius = if selected { NODE_NORMAL_RADIUS } else { 1.0 };
        surface.disc(p, radius, color);
        if show_touch_bounds {
            surface.rect(
                rect_around(p, NODE_TOUCH_RADIUS),
                Some(DEBUG_BOUNDS_FILL),
                egui::Stroke::NONE,
            );
        }
    }

    pub fn to_record(&self) -> ConnectorRecord {
        ConnectorRecord {
            node_data: self.chain.to_record(),
            start_class: self.start_attachment,
            end_class: self.end_attachment,
            start_label: self.start_label.clone(),
            end_label: self.end_label.clone(),
        }
    }

    pub fn from_record(record: &ConnectorRecord) -> Result<Self, ChainError> {
        Ok(Self {
            chain: WaypointChain::from_record(&record.node_data)?,
            start_attachment: record.start_class,
            end_attachment: record.end_class,
            start_label: record.start_label.clone(),
            end_label: record.end_label.clone(),
        })
    }
}
