use eframe::egui;

pub(super) fn draw_help_window(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("Help")
        .open(open)
        .resizable(true)
        .default_width(480.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Keyboard Shortcuts");
                ui.separator();

                ui.label("General");
                help_row(ui, "⌘S", "Save diagram (JSON)");
                help_row(ui, "⌘O", "Open diagram");
                help_row(ui, "⌘⇧S", "Export as SVG");
                help_row(ui, "⌘Z", "Undo");
                help_row(ui, "⌘⇧Z / ⌘Y", "Redo");
                help_row(ui, "F1", "This window");

                ui.add_space(10.0);
                ui.label("Selection & Editing");
                help_row(ui, "⌘A", "Select every class and association");
                help_row(ui, "Delete / Backspace", "Delete selected");
                help_row(ui, "Escape", "Clear selection / Select tool");
                help_row(ui, "Shift + click", "Add to selection");

                ui.add_space(10.0);
                ui.label("Tools");
                help_row(ui, "V", "Select tool");
                help_row(ui, "C", "Class tool");
                help_row(ui, "A", "Association tool");
                help_row(ui, "Space (hold)", "Pan tool");
                help_row(ui, "Scroll wheel", "Zoom in/out");

                ui.add_space(20.0);
                ui.heading("Associations");
                ui.separator();
                ui.label("• Drag anywhere along an association to bend it there");
                ui.label("• Drag a bend point onto its neighbour to remove it");
                ui.label("• Drop an end point on a class to attach it; attached ends follow the class");
                ui.label("• Drag across empty canvas to select with a rectangle");
                ui.label("• Select one association to edit its end roles and multiplicities");
                ui.label("• View → Sanity Check lists naming and notation issues");
            });
        });
}

fn help_row(ui: &mut egui::Ui, shortcut: &str, description: &str) {
    ui.horizontal(|ui| {
        ui.add_sized(
            [120.0, 16.0],
            egui::Label::new(egui::RichText::new(shortcut).monospace().strong()),
        );
        ui.label(description);
    });
}
