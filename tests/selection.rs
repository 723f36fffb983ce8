use classlink::connector::AnchorEnd;
use classlink::{Diagram, History, NodeKind, Scene, Selectable, Selection};
use eframe::egui;

fn assert_close(a: egui::Pos2, b: egui::Pos2) {
    assert!(a.distance(b) < 1e-3, "{a:?} != {b:?}");
}

struct Editor {
    diagram: Diagram,
    history: History,
    selection: Selection<Selectable>,
}

impl Editor {
    fn new(diagram: Diagram) -> Self {
        let history = History::new(&diagram, 50);
        Self {
            diagram,
            history,
            selection: Selection::default(),
        }
    }

    /// Mirrors the app: the baseline only advances between gestures.
    fn settle(&mut self) {
        if !self.selection.is_pointer_down() {
            self.history.settle(&self.diagram);
        }
    }

    fn down(&mut self, at: egui::Pos2, multi: bool) {
        self.selection
            .pointer_down(&mut self.diagram, at, multi, &mut self.history);
        self.settle();
    }

    fn drag_to(&mut self, from: egui::Pos2, to: egui::Pos2) {
        self.selection
            .pointer_move(&mut self.diagram, to, to - from, &mut self.history);
        self.settle();
    }

    fn up(&mut self, at: egui::Pos2) {
        self.selection.pointer_up(&mut self.diagram, at);
        self.settle();
    }

    fn gesture(&mut self, from: egui::Pos2, to: egui::Pos2, multi: bool) {
        self.down(from, multi);
        self.drag_to(from, to);
        self.up(to);
    }
}

#[test]
fn rubber_band_selects_enclosed_items_only() {
    let mut diagram = Diagram::default();
    let a = diagram.add_association(egui::pos2(70.0, 50.0));
    let b = diagram.add_association(egui::pos2(70.0, 150.0));
    let far = diagram.add_class(egui::pos2(600.0, 600.0));
    let mut ed = Editor::new(diagram);

    ed.gesture(egui::pos2(0.0, 0.0), egui::pos2(200.0, 200.0), false);

    assert!(ed.selection.is_selected(Selectable::Association(a)));
    assert!(ed.selection.is_selected(Selectable::Association(b)));
    assert!(!ed.selection.is_selected(Selectable::Class(far)));
    assert_eq!(ed.selection.len(), 2);
    assert!(ed.selection.rubber_band().is_none());
    assert!(!ed.history.can_undo());
}

#[test]
fn waypoint_press_is_always_exclusive() {
    let mut diagram = Diagram::default();
    let a = diagram.add_association(egui::pos2(70.0, 50.0));
    let b = diagram.add_association(egui::pos2(70.0, 150.0));
    let mut ed = Editor::new(diagram);
    ed.selection
        .select_only([Selectable::Association(a), Selectable::Association(b)]);

    ed.down(egui::pos2(70.0, 52.0), true);

    assert_eq!(ed.selection.len(), 1);
    assert!(matches!(
        ed.selection.items()[0],
        Selectable::Waypoint { association, .. } if association == a
    ));
}

#[test]
fn dragging_an_edge_bends_it_with_one_checkpoint() {
    let mut diagram = Diagram::default();
    let a = diagram.add_association(egui::pos2(100.0, 100.0));
    let mut ed = Editor::new(diagram);

    ed.down(egui::pos2(100.0, 102.0), false);
    ed.drag_to(egui::pos2(100.0, 102.0), egui::pos2(100.0, 122.0));
    ed.drag_to(egui::pos2(100.0, 122.0), egui::pos2(100.0, 142.0));
    ed.up(egui::pos2(100.0, 142.0));

    let chain = ed.diagram.connector(a).unwrap().chain();
    assert_eq!(chain.node_count(), 3);
    let bend = chain.next(chain.start()).unwrap();
    assert_eq!(chain.kind(bend), Some(NodeKind::Intermediate));
    assert!(chain.position(bend).unwrap().distance(egui::pos2(100.0, 140.0)) < 1e-3);
    assert!(ed.selection.is_empty());

    assert_eq!(ed.history.undo_depth(), 1);
    assert!(ed.history.undo(&mut ed.diagram));
    assert_eq!(ed.diagram.connector(a).unwrap().chain().node_count(), 2);
}

#[test]
fn dragging_bend_onto_neighbour_removes_it() {
    let mut diagram = Diagram::default();
    let a = diagram.add_association(egui::pos2(100.0, 100.0));
    let mut ed = Editor::new(diagram);

    ed.gesture(egui::pos2(100.0, 100.0), egui::pos2(147.0, 100.0), false);

    let chain = ed.diagram.connector(a).unwrap().chain();
    assert_eq!(chain.node_count(), 2);
    assert_eq!(chain.next(chain.start()), Some(chain.end()));
}

#[test]
fn repeated_bend_and_merge_compacts_when_idle() {
    let mut diagram = Diagram::default();
    let a = diagram.add_association(egui::pos2(100.0, 100.0));
    let mut ed = Editor::new(diagram);

    for _ in 0..3 {
        ed.gesture(egui::pos2(100.0, 100.0), egui::pos2(147.0, 100.0), false);
    }
    let chain = ed.diagram.connector(a).unwrap().chain();
    assert_eq!(chain.node_count(), 2);
    assert_eq!(chain.tombstones(), 3);

    assert!(ed.selection.is_empty());
    assert_eq!(ed.diagram.compact_chains(), 1);
    let chain = ed.diagram.connector(a).unwrap().chain();
    assert_eq!(chain.tombstones(), 0);
    assert_eq!(chain.positions(), vec![egui::pos2(50.0, 100.0), egui::pos2(150.0, 100.0)]);
    assert_eq!(ed.diagram.compact_chains(), 0);
}

#[test]
fn lost_release_does_not_merge_the_next_edit_into_the_drag() {
    let mut diagram = Diagram::default();
    let a = diagram.add_association(egui::pos2(100.0, 100.0));
    let c = diagram.add_class(egui::pos2(400.0, 400.0));
    let mut ed = Editor::new(diagram);

    ed.down(egui::pos2(100.0, 102.0), false);
    ed.drag_to(egui::pos2(100.0, 102.0), egui::pos2(100.0, 142.0));
    // The button came up outside the canvas.
    assert!(ed.selection.release_if_button_up(&mut ed.diagram, false));
    ed.settle();

    assert_eq!(ed.diagram.remove_items(&[Selectable::Class(c)], &mut ed.history), 1);
    ed.settle();

    assert!(ed.history.undo(&mut ed.diagram));
    assert!(ed.diagram.class(c).is_some());
    assert_eq!(ed.diagram.connector(a).unwrap().chain().node_count(), 3);
}

#[test]
fn whole_association_spawns_bend_point() {
    let mut diagram = Diagram::default();
    let a = diagram.add_association(egui::pos2(100.0, 100.0));
    let mut history = History::new(&diagram, 10);

    let spawned = diagram
        .try_spawn(Selectable::Association(a), egui::pos2(90.0, 95.0), &mut history)
        .unwrap();
    let Selectable::Waypoint { association, node } = spawned else {
        panic!("expected a waypoint, got {spawned:?}");
    };
    assert_eq!(association, a);
    assert_eq!(diagram.connector(a).unwrap().chain().kind(node), Some(NodeKind::Intermediate));
    assert!(history.can_undo());

    let c = diagram.add_class(egui::pos2(400.0, 400.0));
    assert!(diagram.try_spawn(Selectable::Class(c), egui::pos2(400.0, 400.0), &mut history).is_none());
}

#[test]
fn attached_anchor_follows_its_class() {
    let mut diagram = Diagram::default();
    let class = diagram.add_class(egui::pos2(400.0, 400.0));
    let a = diagram.add_association(egui::pos2(100.0, 100.0));
    let mut ed = Editor::new(diagram);

    ed.gesture(egui::pos2(150.0, 100.0), egui::pos2(400.0, 400.0), false);
    let connector = ed.diagram.connector(a).unwrap();
    assert_eq!(connector.attachment(AnchorEnd::End), Some(class));
    assert_eq!(connector.attachment(AnchorEnd::Start), None);

    ed.gesture(egui::pos2(480.0, 370.0), egui::pos2(490.0, 380.0), false);
    assert_eq!(ed.selection.items(), &[Selectable::Class(class)]);
    let chain = ed.diagram.connector(a).unwrap().chain();
    assert_eq!(chain.position(chain.end()), Some(egui::pos2(410.0, 410.0)));
    assert_eq!(chain.position(chain.start()), Some(egui::pos2(50.0, 100.0)));
}

#[test]
fn anchor_dropped_on_empty_canvas_detaches() {
    let mut diagram = Diagram::default();
    let class = diagram.add_class(egui::pos2(400.0, 400.0));
    let a = diagram.add_association(egui::pos2(100.0, 100.0));
    diagram
        .connector_mut(a)
        .unwrap()
        .set_attachment(AnchorEnd::Start, Some(class));
    let mut ed = Editor::new(diagram);

    ed.gesture(egui::pos2(50.0, 100.0), egui::pos2(20.0, 100.0), false);

    assert_eq!(ed.diagram.connector(a).unwrap().attachment(AnchorEnd::Start), None);
}

#[test]
fn class_dragged_off_canvas_is_pulled_back() {
    let mut diagram = Diagram::default();
    let class = diagram.add_class(egui::pos2(200.0, 200.0));
    let mut ed = Editor::new(diagram);
    let grip = ed.diagram.class(class).unwrap().bounds().center();

    ed.gesture(grip, grip - egui::vec2(500.0, 0.0), false);

    let min = ed.diagram.class(class).unwrap().bounds().min;
    assert_eq!(min.x, 0.0);
    assert!(min.y > 0.0);
}

#[test]
fn multi_select_moves_everything_once() {
    let mut diagram = Diagram::default();
    let left = diagram.add_class(egui::pos2(200.0, 200.0));
    let right = diagram.add_class(egui::pos2(600.0, 200.0));
    let mut ed = Editor::new(diagram);
    let l = ed.diagram.class(left).unwrap().bounds().center();
    let r = ed.diagram.class(right).unwrap().bounds().center();

    ed.down(l, false);
    ed.up(l);
    ed.down(r, true);
    ed.drag_to(r, r + egui::vec2(10.0, 5.0));
    ed.up(r + egui::vec2(10.0, 5.0));

    assert_eq!(ed.selection.len(), 2);
    assert_close(ed.diagram.class(left).unwrap().bounds().center(), l + egui::vec2(10.0, 5.0));
    assert_close(ed.diagram.class(right).unwrap().bounds().center(), r + egui::vec2(10.0, 5.0));
    assert_eq!(ed.history.undo_depth(), 1);
}

#[test]
fn abandoned_gesture_does_not_leak() {
    let mut diagram = Diagram::default();
    let class = diagram.add_class(egui::pos2(200.0, 200.0));
    let mut ed = Editor::new(diagram);
    let grip = ed.diagram.class(class).unwrap().bounds().center();

    ed.down(egui::pos2(600.0, 600.0), false);
    ed.drag_to(egui::pos2(600.0, 600.0), egui::pos2(700.0, 700.0));
    // pointer-up lost
    ed.down(grip, false);
    assert!(ed.selection.rubber_band().is_none());
    ed.drag_to(grip, grip + egui::vec2(5.0, 0.0));
    assert!(ed.selection.is_dragging());
    ed.up(grip + egui::vec2(5.0, 0.0));

    assert_close(ed.diagram.class(class).unwrap().bounds().center(), grip + egui::vec2(5.0, 0.0));
}

#[test]
fn stray_pointer_up_changes_nothing() {
    let mut diagram = Diagram::default();
    let class = diagram.add_class(egui::pos2(200.0, 200.0));
    let before = diagram.clone();
    let mut ed = Editor::new(diagram);
    ed.selection.select_only([Selectable::Class(class)]);

    ed.up(egui::pos2(10.0, 10.0));
    ed.drag_to(egui::pos2(10.0, 10.0), egui::pos2(50.0, 50.0));

    assert_eq!(ed.diagram, before);
    assert_eq!(ed.selection.items(), &[Selectable::Class(class)]);
}

#[test]
fn deleting_a_class_detaches_its_anchors() {
    let mut diagram = Diagram::default();
    let class = diagram.add_class(egui::pos2(400.0, 400.0));
    let a = diagram.add_association(egui::pos2(100.0, 100.0));
    diagram
        .connector_mut(a)
        .unwrap()
        .set_attachment(AnchorEnd::End, Some(class));
    let mut history = History::new(&diagram, 10);

    let removed = diagram.remove_items(&[Selectable::Class(class)], &mut history);

    assert_eq!(removed, 1);
    assert!(diagram.class(class).is_none());
    assert_eq!(diagram.connector(a).unwrap().attachment(AnchorEnd::End), None);
    assert_eq!(history.undo_depth(), 1);
}

#[test]
fn deleting_an_anchor_removes_its_association() {
    let mut diagram = Diagram::default();
    let a = diagram.add_association(egui::pos2(100.0, 100.0));
    let start = diagram.connector(a).unwrap().chain().start();
    let mut history = History::new(&diagram, 10);

    let removed = diagram.remove_items(
        &[Selectable::Waypoint {
            association: a,
            node: start,
        }],
        &mut history,
    );

    assert_eq!(removed, 1);
    assert!(diagram.elements().is_empty());
}

#[test]
fn nothing_to_delete_takes_no_checkpoint() {
    let mut diagram = Diagram::default();
    let mut history = History::new(&diagram, 10);
    assert_eq!(diagram.remove_items(&[Selectable::Class(42)], &mut history), 0);
    assert!(!history.can_undo());
}
