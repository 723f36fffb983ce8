use crate::model::Diagram;

/// Receives a request to snapshot the diagram before it is mutated.
pub trait UndoSink {
    fn request_checkpoint(&mut self);
}

/// Undo/redo stacks of whole-diagram snapshots.
///
/// The history keeps a baseline copy of the diagram as it stood after the last handled
/// event. A checkpoint pushes that baseline, so a request made mid-event records the
/// state before any of the event's mutations.
#[derive(Clone, Debug)]
pub struct History {
    baseline: Diagram,
    undo: Vec<Diagram>,
    redo: Vec<Diagram>,
    limit: usize,
}

impl History {
    pub fn new(diagram: &Diagram, limit: usize) -> Self {
        Self {
            baseline: diagram.clone(),
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Records `diagram` as the state future checkpoints will capture.
    pub fn settle(&mut self, diagram: &Diagram) {
        if self.baseline != *diagram {
            self.baseline = diagram.clone();
        }
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        self.trim();
    }

    fn trim(&mut self) {
        if self.undo.len() > self.limit {
            let overflow = self.undo.len() - self.limit;
            self.undo.drain(0..overflow);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn undo(&mut self, current: &mut Diagram) -> bool {
        let Some(prev) = self.undo.pop() else {
            return false;
        };
        let replaced = std::mem::replace(current, prev);
        self.redo.push(replaced);
        self.baseline = current.clone();
        true
    }

    pub fn redo(&mut self, current: &mut Diagram) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        let replaced = std::mem::replace(current, next);
        self.undo.push(replaced);
        self.baseline = current.clone();
        true
    }
}

impl UndoSink for History {
    fn request_checkpoint(&mut self) {
        if self.undo.last() == Some(&self.baseline) {
            return;
        }
        self.undo.push(self.baseline.clone());
        self.redo.clear();
        self.trim();
    }
}
