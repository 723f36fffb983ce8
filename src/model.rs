use eframe::egui;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::connector::{AnchorEnd, Connector, ConnectorRecord, NodeId, NodeKind};
use crate::error::DocumentError;
use crate::render::{Surface, approx_text_size};
use crate::selection::Scene;
use crate::undo::UndoSink;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn from_pos2(p: egui::Pos2) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn to_pos2(self) -> egui::Pos2 {
        egui::pos2(self.x, self.y)
    }
}

pub const CLASS_FONT_HEIGHT: f32 = 14.0;
pub const CLASS_MIN_WIDTH: f32 = 200.0;

const CLASS_FILL: egui::Color32 = egui::Color32::from_rgb(0xe7, 0xe8, 0xb0);
const CLASS_STROKE: egui::Color32 = egui::Color32::from_rgb(30, 30, 30);
const SELECTED_STROKE: egui::Color32 = egui::Color32::from_rgb(90, 160, 255);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBox {
    /// Top-left corner.
    pub position: Point,
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub operations: Vec<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
}

impl ClassBox {
    /// A default class centred on `center`.
    pub fn new(name: impl Into<String>, center: egui::Pos2) -> Self {
        let mut class = Self {
            position: Point::default(),
            name: name.into(),
            attributes: vec!["+attribute1 : type".to_string()],
            operations: vec!["+operation1(param : type) : returnType".to_string()],
            is_abstract: false,
        };
        class.position = Point::from_pos2(center - class.size() * 0.5);
        class
    }

    pub fn line_height() -> f32 {
        CLASS_FONT_HEIGHT * 1.5
    }

    pub fn name_height() -> f32 {
        CLASS_FONT_HEIGHT * 2.5
    }

    fn compartment_height(lines: usize) -> f32 {
        lines.max(1) as f32 * Self::line_height()
    }

    pub fn width(&self) -> f32 {
        let widest = std::iter::once(&self.name)
            .chain(&self.attributes)
            .chain(&self.operations)
            .map(|s| approx_text_size(s, CLASS_FONT_HEIGHT).x)
            .fold(0.0, f32::max);
        CLASS_MIN_WIDTH.max(widest + 5.0)
    }

    pub fn height(&self) -> f32 {
        Self::name_height()
            + Self::compartment_height(self.attributes.len())
            + Self::compartment_height(self.operations.len())
    }

    pub fn size(&self) -> egui::Vec2 {
        egui::vec2(self.width(), self.height())
    }

    pub fn bounds(&self) -> egui::Rect {
        egui::Rect::from_min_size(self.position.to_pos2(), self.size())
    }

    pub fn name_bounds(&self) -> egui::Rect {
        egui::Rect::from_min_size(
            self.position.to_pos2(),
            egui::vec2(self.width(), Self::name_height()),
        )
    }

    pub fn attributes_bounds(&self) -> egui::Rect {
        let top = self.name_bounds().max.y;
        egui::Rect::from_min_size(
            egui::pos2(self.position.x, top),
            egui::vec2(self.width(), Self::compartment_height(self.attributes.len())),
        )
    }

    pub fn operations_bounds(&self) -> egui::Rect {
        let top = self.attributes_bounds().max.y;
        egui::Rect::from_min_size(
            egui::pos2(self.position.x, top),
            egui::vec2(self.width(), Self::compartment_height(self.operations.len())),
        )
    }

    pub fn translate(&mut self, delta: egui::Vec2) {
        self.position = Point::from_pos2(self.position.to_pos2() + delta);
    }

    /// Pulls the box back onto the canvas and returns how far it moved.
    pub fn clamp_to_canvas(&mut self) -> egui::Vec2 {
        let p = self.position.to_pos2();
        let delta = egui::vec2((-p.x).max(0.0), (-p.y).max(0.0));
        if delta != egui::Vec2::ZERO {
            self.translate(delta);
        }
        delta
    }

    pub fn draw(&self, surface: &mut dyn Surface, selected: bool) {
        let stroke_color = if selected { SELECTED_STROKE } else { CLASS_STROKE };
        let stroke = egui::Stroke::new(if selected { 2.0 } else { 1.0 }, stroke_color);
        let outline = egui::Stroke::new(1.0, CLASS_STROKE);

        surface.rect(self.name_bounds(), Some(CLASS_FILL), outline);
        surface.rect(self.attributes_bounds(), Some(CLASS_FILL), outline);
        surface.rect(self.operations_bounds(), Some(CLASS_FILL), outline);
        if selected {
            surface.rect(self.bounds(), None, stroke);
        }

        let name = if self.is_abstract {
            format!("«abstract» {}", self.name)
        } else {
            self.name.clone()
        };
        let name_size = surface.measure_text(&name, CLASS_FONT_HEIGHT);
        let nb = self.name_bounds();
        surface.text(
            nb.center() - name_size * 0.5,
            &name,
            CLASS_FONT_HEIGHT,
            CLASS_STROKE,
        );

        let pad = 5.0;
        for (bounds, lines) in [
            (self.attributes_bounds(), &self.attributes),
            (self.operations_bounds(), &self.operations),
        ] {
            for (i, line) in lines.iter().enumerate() {
                let y = bounds.min.y
                    + i as f32 * Self::line_height()
                    + (Self::line_height() - CLASS_FONT_HEIGHT) * 0.5;
                surface.text(
                    egui::pos2(bounds.min.x + pad, y),
                    line,
                    CLASS_FONT_HEIGHT,
                    CLASS_STROKE,
                );
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    Class(ClassBox),
    Association(Connector),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub id: u64,
    pub kind: ElementKind,
}

impl Element {
    pub fn bounds(&self) -> egui::Rect {
        match &self.kind {
            ElementKind::Class(class) => class.bounds(),
            ElementKind::Association(connector) => connector.bounds(),
        }
    }
}

/// Anything a pointer gesture can select.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Selectable {
    Class(u64),
    Association(u64),
    Waypoint { association: u64, node: NodeId },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRecord {
    pub elements: Vec<ElementRecord>,
    #[serde(default)]
    pub next_id: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: u64,
    pub kind: ElementKindRecord,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ElementKindRecord {
    Class(ClassBox),
    Association(ConnectorRecord),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Diagram {
    elements: Vec<Element>,
    next_id: u64,
}

impl Default for Diagram {
    fn default() -> Self {
        Self {
            elements: vec![],
            next_id: 1,
        }
    }
}

impl Diagram {
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, kind: ElementKind) -> u64 {
        let id = self.allocate_id();
        self.elements.push(Element { id, kind });
        id
    }

    pub fn add_class(&mut self, center: egui::Pos2) -> u64 {
        let n = self
            .elements
            .iter()
            .filter(|e| matches!(e.kind, ElementKind::Class(_)))
            .count();
        self.insert(ElementKind::Class(ClassBox::new(format!("Class{}", n + 1), center)))
    }

    pub fn add_association(&mut self, center: egui::Pos2) -> u64 {
        self.insert(ElementKind::Association(Connector::new(center)))
    }

    pub fn element(&self, id: u64) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_mut(&mut self, id: u64) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn class(&self, id: u64) -> Option<&ClassBox> {
        match &self.element(id)?.kind {
            ElementKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn connector(&self, id: u64) -> Option<&Connector> {
        match &self.element(id)?.kind {
            ElementKind::Association(connector) => Some(connector),
            _ => None,
        }
    }

    pub fn connector_mut(&mut self, id: u64) -> Option<&mut Connector> {
        match &mut self.element_mut(id)?.kind {
            ElementKind::Association(connector) => Some(connector),
            _ => None,
        }
    }

    /// Topmost class box containing `at`.
    pub fn class_at(&self, at: egui::Pos2) -> Option<u64> {
        self.elements.iter().rev().find_map(|e| match &e.kind {
            ElementKind::Class(class) if class.bounds().contains(at) => Some(e.id),
            _ => None,
        })
    }

    /// Hit-tests the diagram topmost first. Pressing near an association edge grows a
    /// bend point there.
    pub fn touch(&mut self, at: egui::Pos2, undo: &mut dyn UndoSink) -> Option<Selectable> {
        for element in self.elements.iter_mut().rev() {
            let id = element.id;
            match &mut element.kind {
                ElementKind::Class(class) => {
                    if class.bounds().contains(at) {
                        return Some(Selectable::Class(id));
                    }
                }
                ElementKind::Association(connector) => {
                    if let Some(node) = connector.hit_test(at, undo) {
                        return Some(Selectable::Waypoint {
                            association: id,
                            node,
                        });
                    }
                }
            }
        }
        None
    }

    /// Classes and associations at least partially inside `rect`.
    pub fn items_in_rect(&self, rect: egui::Rect) -> Vec<Selectable> {
        self.elements
            .iter()
            .filter(|e| rect.intersects(e.bounds()))
            .map(|e| match e.kind {
                ElementKind::Class(_) => Selectable::Class(e.id),
                ElementKind::Association(_) => Selectable::Association(e.id),
            })
            .collect()
    }

    pub fn all_items(&self) -> Vec<Selectable> {
        self.items_in_rect(egui::Rect::EVERYTHING)
    }

    pub fn contains_item(&self, item: Selectable) -> bool {
        match item {
            Selectable::Class(id) => self.class(id).is_some(),
            Selectable::Association(id) => self.connector(id).is_some(),
            Selectable::Waypoint { association, node } => self
                .connector(association)
                .is_some_and(|c| c.chain().contains(node)),
        }
    }

    pub fn bounds(&self) -> Option<egui::Rect> {
        self.elements
            .iter()
            .map(|e| e.bounds())
            .reduce(|a, b| a.union(b))
    }

    /// Compacts every association chain carrying more tombstones than nodes.
    /// Outstanding waypoint ids must not be used afterwards.
    pub fn compact_chains(&mut self) -> usize {
        let mut compacted = 0;
        for element in &mut self.elements {
            if let ElementKind::Association(connector) = &mut element.kind {
                if connector.compact() {
                    compacted += 1;
                }
            }
        }
        if compacted > 0 {
            tracing::debug!(compacted, "compacted association chains");
        }
        compacted
    }

    fn move_anchors_of(&mut self, class_id: u64, delta: egui::Vec2) {
        for element in &mut self.elements {
            if let ElementKind::Association(connector) = &mut element.kind {
                for node in connector.anchors_attached_to(class_id) {
                    connector.move_node(node, delta);
                }
            }
        }
    }

    /// Deletes the given items. A selected anchor takes its whole association with it.
    pub fn remove_items(&mut self, items: &[Selectable], undo: &mut dyn UndoSink) -> usize {
        let mut doomed: HashSet<u64> = HashSet::new();
        let mut bends: Vec<(u64, NodeId)> = Vec::new();
        for item in items {
            match *item {
                Selectable::Class(id) | Selectable::Association(id) => {
                    if self.element(id).is_some() {
                        doomed.insert(id);
                    }
                }
                Selectable::Waypoint { association, node } => {
                    match self.connector(association).and_then(|c| c.chain().kind(node)) {
                        Some(NodeKind::Anchor) => {
                            doomed.insert(association);
                        }
                        Some(NodeKind::Intermediate) => bends.push((association, node)),
                        None => {}
                    }
                }
            }
        }
        bends.retain(|(association, _)| !doomed.contains(association));
        if doomed.is_empty() && bends.is_empty() {
            return 0;
        }

        undo.request_checkpoint();
        let mut removed = 0;
        for (association, node) in bends {
            if let Some(connector) = self.connector_mut(association) {
                if connector.delete_node(node, undo) {
                    removed += 1;
                }
            }
        }
        let before = self.elements.len();
        self.elements.retain(|e| !doomed.contains(&e.id));
        removed += before - self.elements.len();
        for element in &mut self.elements {
            if let ElementKind::Association(connector) = &mut element.kind {
                for id in &doomed {
                    connector.detach_class(*id);
                }
            }
        }
        tracing::debug!(removed, "removed diagram items");
        removed
    }

    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        is_selected: &dyn Fn(Selectable) -> bool,
        show_touch_bounds: bool,
    ) {
        let stroke = egui::Stroke::new(1.5, CLASS_STROKE);
        for element in &self.elements {
            let id = element.id;
            match &element.kind {
                ElementKind::Class(class) => class.draw(surface, is_selected(Selectable::Class(id))),
                ElementKind::Association(connector) => {
                    let whole = is_selected(Selectable::Association(id));
                    let stroke = if whole {
                        egui::Stroke::new(2.0, SELECTED_STROKE)
                    } else {
                        stroke
                    };
                    connector.draw(
                        surface,
                        stroke,
                        &|node| whole || is_selected(Selectable::Waypoint { association: id, node }),
                        show_touch_bounds,
                    );
                }
            }
        }
    }

    pub fn to_record(&self) -> DiagramRecord {
        DiagramRecord {
            elements: self
                .elements
                .iter()
                .map(|e| ElementRecord {
                    id: e.id,
                    kind: match &e.kind {
                        ElementKind::Class(class) => ElementKindRecord::Class(class.clone()),
                        ElementKind::Association(connector) => {
                            ElementKindRecord::Association(connector.to_record())
                        }
                    },
                })
                .collect(),
            next_id: Some(self.next_id),
        }
    }

    pub fn from_record(record: DiagramRecord) -> Result<Self, DocumentError> {
        let mut seen = HashSet::new();
        let mut elements = Vec::with_capacity(record.elements.len());
        for e in record.elements {
            if !seen.insert(e.id) {
                return Err(DocumentError::DuplicateId(e.id));
            }
            let kind = match e.kind {
                ElementKindRecord::Class(class) => ElementKind::Class(class),
                ElementKindRecord::Association(r) => ElementKind::Association(
                    Connector::from_record(&r).map_err(|source| {
                        DocumentError::MalformedAssociation { id: e.id, source }
                    })?,
                ),
            };
            elements.push(Element { id: e.id, kind });
        }

        let class_ids: HashSet<u64> = elements
            .iter()
            .filter(|e| matches!(e.kind, ElementKind::Class(_)))
            .map(|e| e.id)
            .collect();
        for element in &mut elements {
            let id = element.id;
            if let ElementKind::Association(connector) = &mut element.kind {
                for end in [AnchorEnd::Start, AnchorEnd::End] {
                    if let Some(class_id) = connector.attachment(end) {
                        if !class_ids.contains(&class_id) {
                            tracing::warn!(association = id, class_id, "dropping dangling attachment");
                            connector.set_attachment(end, None);
                        }
                    }
                }
            }
        }

        let max_id = elements.iter().map(|e| e.id).max().unwrap_or(0);
        let next_id = record.next_id.unwrap_or(0).max(max_id + 1);
        Ok(Self { elements, next_id })
    }

    /// Pretty JSON. Chain records nest once per node, so the stack grows on demand.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::pretty(&mut out);
        self.to_record()
            .serialize(serde_stacker::Serializer::new(&mut ser))?;
        // serde_json only ever writes UTF-8.
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let record = DiagramRecord::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Self::from_record(record)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        tracing::info!(path = %path.display(), elements = self.elements.len(), "diagram saved");
        Ok(())
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let diagram = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), elements = diagram.elements.len(), "diagram loaded");
        Ok(diagram)
    }
}

impl Scene for Diagram {
    type Item = Selectable;

    fn touch(&mut self, at: egui::Pos2, undo: &mut dyn UndoSink) -> Option<Selectable> {
        Diagram::touch(self, at, undo)
    }

    fn is_exclusive(&self, item: Selectable) -> bool {
        matches!(item, Selectable::Waypoint { .. })
    }

    fn grab(&mut self, item: Selectable, undo: &mut dyn UndoSink) {
        if let Selectable::Waypoint { .. } = item {
            undo.request_checkpoint();
        }
    }

    fn try_spawn(
        &mut self,
        item: Selectable,
        at: egui::Pos2,
        undo: &mut dyn UndoSink,
    ) -> Option<Selectable> {
        let Selectable::Association(association) = item else {
            return None;
        };
        let node = self.connector_mut(association)?.create_node_near(at, undo)?;
        Some(Selectable::Waypoint { association, node })
    }

    fn move_items(&mut self, items: &[Selectable], delta: egui::Vec2) {
        let mut classes: HashSet<u64> = HashSet::new();
        let mut whole: HashSet<u64> = HashSet::new();
        for item in items {
            match *item {
                Selectable::Class(id) => {
                    classes.insert(id);
                }
                Selectable::Association(id) => {
                    whole.insert(id);
                }
                Selectable::Waypoint { .. } => {}
            }
        }

        for element in &mut self.elements {
            let id = element.id;
            match &mut element.kind {
                ElementKind::Class(class) => {
                    if classes.contains(&id) {
                        class.translate(delta);
                    }
                }
                ElementKind::Association(connector) => {
                    if whole.contains(&id) {
                        connector.translate(delta);
                        continue;
                    }
                    let mut nodes: Vec<NodeId> = classes
                        .iter()
                        .flat_map(|class_id| connector.anchors_attached_to(*class_id))
                        .collect();
                    nodes.extend(items.iter().filter_map(|item| match *item {
                        Selectable::Waypoint { association, node } if association == id => {
                            Some(node)
                        }
                        _ => None,
                    }));
                    nodes.sort();
                    nodes.dedup();
                    for node in nodes {
                        connector.move_node(node, delta);
                    }
                }
            }
        }
    }

    fn release(&mut self, item: Selectable) {
        match item {
            Selectable::Waypoint { association, node } => {
                let Some(connector) = self.connector(association) else {
                    return;
                };
                match connector.anchor_end(node) {
                    Some(end) => {
                        let target = connector
                            .chain()
                            .position(node)
                            .and_then(|p| self.class_at(p));
                        if let Some(connector) = self.connector_mut(association) {
                            connector.set_attachment(end, target);
                        }
                    }
                    None => {
                        if let Some(connector) = self.connector_mut(association) {
                            connector.release_node(node);
                        }
                    }
                }
            }
            Selectable::Class(id) => {
                let delta = match self.element_mut(id).map(|e| &mut e.kind) {
                    Some(ElementKind::Class(class)) => class.clamp_to_canvas(),
                    _ => return,
                };
                if delta != egui::Vec2::ZERO {
                    self.move_anchors_of(id, delta);
                }
            }
            Selectable::Association(_) => {}
        }
    }

    fn items_in_rect(&self, rect: egui::Rect) -> Vec<Selectable> {
        Diagram::items_in_rect(self, rect)
    }
}
