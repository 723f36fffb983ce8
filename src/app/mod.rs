use eframe::egui;
use std::path::PathBuf;

use crate::model::{Diagram, Selectable};
use crate::render::View;
use crate::selection::Selection;
use crate::settings::{self, AppSettings};
use crate::undo::History;

mod actions;
mod help;
mod properties;
mod update;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tool {
    Select,
    Class,
    Association,
    Pan,
}

impl Tool {
    fn label(self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Class => "Class",
            Tool::Association => "Association",
            Tool::Pan => "Pan",
        }
    }
}

pub struct EditorApp {
    diagram: Diagram,
    selection: Selection<Selectable>,
    history: History,
    tool: Tool,
    tool_before_pan: Option<Tool>,
    view: View,
    diagram_name: String,
    settings: AppSettings,
    settings_path: PathBuf,
    status: Option<String>,
    show_help: bool,
    show_sanity: bool,
    label_edit_open: bool,
}

impl EditorApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let (settings, settings_path) = settings::load_or_default();
        Self::with_settings(settings, settings_path)
    }

    pub fn with_settings(settings: AppSettings, settings_path: PathBuf) -> Self {
        let diagram = Diagram::default();
        let history = History::new(&diagram, settings.undo_limit);
        Self {
            diagram,
            selection: Selection::default(),
            history,
            tool: Tool::Select,
            tool_before_pan: None,
            view: View::default(),
            diagram_name: Self::generate_default_name(),
            settings,
            settings_path,
            status: None,
            show_help: false,
            show_sanity: false,
            label_edit_open: false,
        }
    }

    fn generate_default_name() -> String {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        format!("diagram-{secs}")
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }
}

fn tool_button(ui: &mut egui::Ui, label: &str, tool: Tool, selected: &mut Tool) {
    if ui.selectable_label(*selected == tool, label).clicked() {
        *selected = tool;
    }
}
