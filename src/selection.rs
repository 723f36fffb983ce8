//! Pointer-driven selection shared by every canvas.

use eframe::egui;

use crate::undo::UndoSink;

/// What a [`Selection`] needs from the thing it selects in.
pub trait Scene {
    type Item: Copy + PartialEq + std::fmt::Debug;

    /// Topmost item under `at`. May create an item (a bend point, say) on the way.
    fn touch(&mut self, at: egui::Pos2, undo: &mut dyn UndoSink) -> Option<Self::Item>;

    /// Exclusive items are only ever selected alone.
    fn is_exclusive(&self, item: Self::Item) -> bool;

    fn grab(&mut self, item: Self::Item, undo: &mut dyn UndoSink);

    /// Offers the single selected item the chance to hand the drag to a new child.
    fn try_spawn(
        &mut self,
        item: Self::Item,
        at: egui::Pos2,
        undo: &mut dyn UndoSink,
    ) -> Option<Self::Item>;

    fn move_items(&mut self, items: &[Self::Item], delta: egui::Vec2);

    fn release(&mut self, item: Self::Item);

    fn items_in_rect(&self, rect: egui::Rect) -> Vec<Self::Item>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum GestureState {
    Idle,
    Pressed { band_origin: Option<egui::Pos2> },
    DraggingItems,
    DraggingBand { origin: egui::Pos2, corner: egui::Pos2 },
}

#[derive(Clone, Debug)]
pub struct Selection<T> {
    items: Vec<T>,
    state: GestureState,
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            state: GestureState::Idle,
        }
    }
}

impl<T: Copy + PartialEq + std::fmt::Debug> Selection<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_selected(&self, item: T) -> bool {
        self.items.contains(&item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn select_only(&mut self, items: impl IntoIterator<Item = T>) {
        self.items.clear();
        for item in items {
            if !self.items.contains(&item) {
                self.items.push(item);
            }
        }
    }

    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }

    /// Normalised rubber band of the gesture in progress.
    pub fn rubber_band(&self) -> Option<egui::Rect> {
        match self.state {
            GestureState::DraggingBand { origin, corner } => {
                Some(egui::Rect::from_two_pos(origin, corner))
            }
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.state == GestureState::DraggingItems
    }

    pub fn is_pointer_down(&self) -> bool {
        self.state != GestureState::Idle
    }

    pub fn pointer_down<S: Scene<Item = T>>(
        &mut self,
        scene: &mut S,
        at: egui::Pos2,
        multi: bool,
        undo: &mut dyn UndoSink,
    ) {
        // A gesture whose pointer-up never arrived is simply forgotten.
        self.state = GestureState::Idle;

        match scene.touch(at, undo) {
            Some(item) if scene.is_exclusive(item) => {
                self.items.clear();
                self.items.push(item);
                self.state = GestureState::Pressed { band_origin: None };
            }
            Some(item) => {
                if !self.is_selected(item) {
                    if multi {
                        self.items.retain(|i| !scene.is_exclusive(*i));
                    } else {
                        self.items.clear();
                    }
                    self.items.push(item);
                }
                self.state = GestureState::Pressed { band_origin: None };
            }
            None => {
                if multi {
                    self.items.retain(|i| !scene.is_exclusive(*i));
                } else {
                    self.items.clear();
                }
                self.state = GestureState::Pressed {
                    band_origin: Some(at),
                };
            }
        }

        for item in self.items.clone() {
            scene.grab(item, undo);
        }
    }

    pub fn pointer_move<S: Scene<Item = T>>(
        &mut self,
        scene: &mut S,
        at: egui::Pos2,
        delta: egui::Vec2,
        undo: &mut dyn UndoSink,
    ) {
        match self.state {
            GestureState::Idle => {}
            GestureState::Pressed {
                band_origin: Some(origin),
            } => {
                self.state = GestureState::DraggingBand { origin, corner: at };
            }
            GestureState::DraggingBand { origin, .. } => {
                self.state = GestureState::DraggingBand { origin, corner: at };
            }
            GestureState::Pressed { band_origin: None } => {
                if !self.items.is_empty() {
                    undo.request_checkpoint();
                }
                if let [only] = self.items[..] {
                    if let Some(spawned) = scene.try_spawn(only, at, undo) {
                        tracing::trace!(?spawned, "drag handed to spawned item");
                        self.items = vec![spawned];
                    }
                }
                self.state = GestureState::DraggingItems;
                scene.move_items(&self.items, delta);
            }
            GestureState::DraggingItems => scene.move_items(&self.items, delta),
        }
    }

    pub fn pointer_up<S: Scene<Item = T>>(&mut self, scene: &mut S, _at: egui::Pos2) {
        self.finish_gesture(scene);
    }

    /// Finishes a gesture whose button is no longer held even though no release arrived.
    pub fn release_if_button_up<S: Scene<Item = T>>(
        &mut self,
        scene: &mut S,
        button_down: bool,
    ) -> bool {
        if button_down || !self.is_pointer_down() {
            return false;
        }
        tracing::debug!("finishing gesture whose release was lost");
        self.finish_gesture(scene);
        true
    }

    fn finish_gesture<S: Scene<Item = T>>(&mut self, scene: &mut S) {
        let state = std::mem::replace(&mut self.state, GestureState::Idle);
        if state == GestureState::Idle {
            return;
        }

        let mut clear = false;
        for item in self.items.clone() {
            if scene.is_exclusive(item) {
                clear = true;
            }
            scene.release(item);
        }
        if clear {
            self.items.clear();
        }

        if let GestureState::DraggingBand { origin, corner } = state {
            let band = egui::Rect::from_two_pos(origin, corner);
            if band.width() > 0.0 && band.height() > 0.0 {
                for item in scene.items_in_rect(band) {
                    if !scene.is_exclusive(item) && !self.is_selected(item) {
                        self.items.push(item);
                    }
                }
            }
        }
    }
}
