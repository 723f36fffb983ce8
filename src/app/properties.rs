use eframe::egui;

use super::EditorApp;
use crate::connector::AnchorEnd;
use crate::model::Selectable;
use crate::sanity::Diagnostic;
use crate::undo::UndoSink;

impl EditorApp {
    fn selected_association(&self) -> Option<u64> {
        match self.selection.items() {
            [Selectable::Association(id)] | [Selectable::Waypoint { association: id, .. }] => {
                Some(*id)
            }
            _ => None,
        }
    }

    /// Role and multiplicity fields for the single selected association.
    ///
    /// One edit session, from the first change until focus leaves, is one undo step.
    pub(super) fn draw_properties_panel(&mut self, ctx: &egui::Context) {
        let Some(id) = self.selected_association() else {
            self.label_edit_open = false;
            return;
        };
        egui::SidePanel::right("association_properties")
            .resizable(false)
            .show(ctx, |ui| {
                ui.heading(format!("Association #{id}"));
                let mut edited = false;
                let mut finished = false;
                if let Some(connector) = self.diagram.connector_mut(id) {
                    for (end, title) in [(AnchorEnd::Start, "Start"), (AnchorEnd::End, "End")] {
                        ui.separator();
                        ui.strong(title);
                        let label = connector.label_mut(end);
                        egui::Grid::new(("end_label", title))
                            .num_columns(2)
                            .show(ui, |ui| {
                                for (name, text) in [
                                    ("Role", &mut label.role),
                                    ("Multiplicity", &mut label.multiplicity),
                                ] {
                                    ui.label(name);
                                    let response = ui.text_edit_singleline(text);
                                    edited |= response.changed();
                                    finished |= response.lost_focus();
                                    ui.end_row();
                                }
                            });
                    }
                }
                if edited && !self.label_edit_open {
                    self.history.request_checkpoint();
                    self.label_edit_open = true;
                }
                if finished {
                    self.label_edit_open = false;
                }
            });
    }
}

pub(super) fn draw_sanity_window(ctx: &egui::Context, open: &mut bool, diagnostics: &[Diagnostic]) {
    egui::Window::new("Sanity Check")
        .open(open)
        .resizable(true)
        .default_width(480.0)
        .show(ctx, |ui| {
            if diagnostics.is_empty() {
                ui.label("No issues found.");
                return;
            }
            egui::ScrollArea::vertical().show(ui, |ui| {
                for diagnostic in diagnostics {
                    ui.horizontal(|ui| {
                        ui.add_sized(
                            [48.0, 16.0],
                            egui::Label::new(
                                egui::RichText::new(format!("#{}", diagnostic.element)).monospace(),
                            ),
                        );
                        ui.label(diagnostic.to_string());
                    });
                }
            });
        });
}
