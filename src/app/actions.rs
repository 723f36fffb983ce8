use eframe::egui;
use std::path::{Path, PathBuf};

use super::EditorApp;
use crate::model::Diagram;
use crate::selection::Scene;
use crate::settings;
use crate::svg;
use crate::undo::UndoSink;

impl EditorApp {
    pub(super) fn undo(&mut self) {
        if self.history.undo(&mut self.diagram) {
            let diagram = &self.diagram;
            self.selection.retain(|item| diagram.contains_item(*item));
            self.set_status("Undo");
        }
    }

    pub(super) fn redo(&mut self) {
        if self.history.redo(&mut self.diagram) {
            let diagram = &self.diagram;
            self.selection.retain(|item| diagram.contains_item(*item));
            self.set_status("Redo");
        }
    }

    pub(super) fn delete_selected(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let items = self.selection.items().to_vec();
        let removed = self.diagram.remove_items(&items, &mut self.history);
        self.selection.clear();
        if removed > 0 {
            self.set_status(format!("Deleted {removed} item(s)"));
        }
    }

    pub(super) fn select_all(&mut self) {
        self.selection.select_only(self.diagram.all_items());
    }

    pub(super) fn place_class(&mut self, at: egui::Pos2) {
        self.history.request_checkpoint();
        let id = self.diagram.add_class(at);
        let item = crate::model::Selectable::Class(id);
        self.diagram.release(item);
        self.selection.select_only([item]);
    }

    pub(super) fn place_association(&mut self, at: egui::Pos2) {
        self.history.request_checkpoint();
        let id = self.diagram.add_association(at);
        self.selection
            .select_only([crate::model::Selectable::Association(id)]);
    }

    pub(super) fn new_diagram(&mut self) {
        self.history.request_checkpoint();
        self.diagram = Diagram::default();
        self.selection.clear();
        self.diagram_name = Self::generate_default_name();
        self.set_status("New diagram");
    }

    pub(super) fn save_to_path(&mut self) {
        let path = PathBuf::from(&self.settings.file_path);
        self.save_json(&path);
    }

    fn save_json(&mut self, path: &Path) {
        match self.diagram.save_to_path(path) {
            Ok(()) => self.set_status(format!("Saved {}", path.display())),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "save failed");
                self.set_status(format!("Save failed: {e}"));
            }
        }
    }

    pub(super) fn save_json_dialog(&mut self) {
        let default_name = format!("{}.json", self.diagram_name);
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(&default_name)
            .add_filter("JSON", &["json"])
            .save_file()
        {
            self.save_json(&path);
            self.settings.file_path = path.display().to_string();
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                self.diagram_name = stem.to_string();
            }
        }
    }

    pub(super) fn save_svg_to_path(&mut self) {
        let path = PathBuf::from(&self.settings.svg_path);
        self.save_svg(&path);
    }

    fn save_svg(&mut self, path: &Path) {
        match svg::export_svg(&self.diagram, path) {
            Ok(()) => self.set_status(format!("Exported {}", path.display())),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "SVG export failed");
                self.set_status(format!("SVG export failed: {e}"));
            }
        }
    }

    pub(super) fn save_svg_dialog(&mut self) {
        let default_name = format!("{}.svg", self.diagram_name);
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(&default_name)
            .add_filter("SVG", &["svg"])
            .save_file()
        {
            self.save_svg(&path);
            self.settings.svg_path = path.display().to_string();
        }
    }

    pub(super) fn open_json_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            self.load_from(&path);
        }
    }

    pub(super) fn load_from_path(&mut self) {
        let path = PathBuf::from(&self.settings.file_path);
        self.load_from(&path);
    }

    /// Replaces the diagram with the file's; on failure the current diagram is kept.
    fn load_from(&mut self, path: &Path) {
        match Diagram::load_from_path(path) {
            Ok(diagram) => {
                self.history.request_checkpoint();
                self.diagram = diagram;
                self.selection.clear();
                self.settings.file_path = path.display().to_string();
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    self.diagram_name = stem.to_string();
                }
                self.set_status(format!("Loaded {}", path.display()));
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "load failed");
                self.set_status(format!("Load failed: {e}"));
            }
        }
    }

    pub(super) fn persist_settings(&mut self) {
        if let Err(e) = settings::save_settings(&self.settings_path, &self.settings) {
            tracing::warn!(error = %e, "settings save failed");
            self.set_status(format!("Settings save failed: {e}"));
        }
    }

    pub(super) fn reload_settings(&mut self) {
        match settings::load_settings(&self.settings_path) {
            Ok(settings) => {
                self.history.set_limit(settings.undo_limit);
                self.settings = settings;
                self.set_status(format!("Reloaded {}", self.settings_path.display()));
            }
            Err(e) => {
                tracing::warn!(path = %self.settings_path.display(), error = %e, "settings reload failed");
                self.set_status(format!("Settings reload failed: {e}"));
            }
        }
    }
}
